//! Span per observed call.

use std::sync::Arc;

use crate::{
    Context, Descriptor,
    middleware::{Call, CallFuture, Interceptor, Next},
    trace::{SpanExporter, SpanStatus, Tracer, attribute_keys as keys},
};

/// Emits one span per observed call.
///
/// The span is named after the operation, joins the trace of the span
/// already in the context (if any), and is published to inner layers through
/// the context so their output can be correlated with it.
#[derive(Debug, Clone)]
pub struct TracingInterceptor {
    descriptor: Arc<Descriptor>,
    tracer: Tracer,
}

impl TracingInterceptor {
    /// Creates a tracing observer exporting to `exporter`.
    pub fn new(descriptor: Arc<Descriptor>, exporter: Arc<dyn SpanExporter>) -> Self {
        let tracer = Tracer::new(descriptor.system(), exporter);
        Self { descriptor, tracer }
    }
}

impl<C: Call> Interceptor<C> for TracingInterceptor {
    fn intercept<'a>(&'a self, ctx: Context, call: C, next: Next<'a, C>) -> CallFuture<'a, C::Output> {
        let Some(operation) = ctx.operation() else {
            return next.run(ctx, call);
        };

        let mut span = self.tracer.start(operation, ctx.span());
        let inner_ctx = match span.context() {
            Some(span_ctx) => ctx.with_span(span_ctx.clone()),
            None => ctx.clone(),
        };
        let trace_id = inner_ctx.span().map(|s| s.trace_id().to_string()).unwrap_or_default();

        let d = &self.descriptor;
        span.set_attribute(keys::DB_SYSTEM, d.system());
        span.set_attribute(keys::DB_CONNECTION_STRING, d.address());
        if let Some(user) = d.username() {
            span.set_attribute(keys::DB_USER, user);
        }
        span.set_attribute(keys::DB_NAME, d.database());
        span.set_attribute(keys::DB_STATEMENT, call.statement());
        span.set_attribute(keys::DB_OPERATION, operation);
        span.set_attribute(keys::TRACE_ID, trace_id);

        #[cfg(feature = "tracing")]
        let pending: CallFuture<'a, C::Output> = {
            use tracing::Instrument;
            let host_span = tracing::info_span!(
                "db.call",
                otel.name = %operation,
                db.system = %d.system(),
                db.operation = %operation,
                trace_id = tracing::field::Empty,
            );
            if let Some(span_ctx) = inner_ctx.span() {
                host_span.record("trace_id", tracing::field::display(span_ctx.trace_id()));
            }
            Box::pin(next.run(inner_ctx, call).instrument(host_span))
        };
        #[cfg(not(feature = "tracing"))]
        let pending = next.run(inner_ctx, call);

        Box::pin(async move {
            let result = pending.await;
            match C::failure(&result) {
                Some(err) => {
                    span.record_error(err);
                    span.end(SpanStatus::Error(err.to_string()));
                },
                None => span.end(SpanStatus::Ok),
            }
            result
        })
    }
}
