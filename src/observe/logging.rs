//! Structured log line per observed call.

use std::{sync::Arc, time::Instant};

use super::{ClientKind, span_ids};
use crate::{
    Context, Descriptor,
    logging::Logger,
    middleware::{Call, CallFuture, Interceptor, Next},
};

/// Emits exactly one log record per observed call.
///
/// The message is a run of `key=value` pairs, each followed by a tab:
///
/// ```text
/// db.operation=demo	db.system=mysql	db.connection_string=127.0.0.1:3306	db.user=root	db.name=shop	db.statement=SELECT 1	latency=1.2ms
/// ```
///
/// Successful calls log at info with `trace_id` and `span_id`; failures log
/// at error and add `exception_msg` and `exception_type`.
#[derive(Clone)]
pub struct LoggingInterceptor {
    descriptor: Arc<Descriptor>,
    kind: ClientKind,
    logger: Arc<dyn Logger>,
}

impl LoggingInterceptor {
    /// Creates a logging observer.
    pub fn new(descriptor: Arc<Descriptor>, kind: ClientKind, logger: Arc<dyn Logger>) -> Self {
        Self { descriptor, kind, logger }
    }

    fn message(&self, operation: &str, statement: &str, latency: std::time::Duration) -> String {
        let d = &self.descriptor;
        let mut message = String::with_capacity(128 + statement.len());
        message.push_str(&format!("db.operation={operation}\t"));
        message.push_str(&format!("db.system={}\t", d.system()));
        message.push_str(&format!("db.connection_string={}\t", d.address()));
        if self.kind.logs_user() {
            message.push_str(&format!("db.user={}\t", d.username().unwrap_or_default()));
        }
        message.push_str(&format!("db.name={}\t", d.database()));
        message.push_str(&format!("db.statement={statement}\t"));
        message.push_str(&format!("latency={latency:?}\t"));
        message
    }
}

impl<C: Call> Interceptor<C> for LoggingInterceptor {
    fn intercept<'a>(&'a self, ctx: Context, call: C, next: Next<'a, C>) -> CallFuture<'a, C::Output> {
        let Some(operation) = ctx.operation().map(str::to_owned) else {
            return next.run(ctx, call);
        };
        let statement = call.detailed_statement();
        let (trace_id, span_id) = span_ids(&ctx);

        Box::pin(async move {
            let started = Instant::now();
            let result = next.run(ctx, call).await;
            let message = self.message(&operation, &statement, started.elapsed());

            match C::failure(&result) {
                Some(err) => self.logger.error(message, vec![
                    ("trace_id", trace_id),
                    ("span_id", span_id),
                    ("exception_msg", err.to_string()),
                    ("exception_type", C::SOURCE.to_string()),
                ]),
                None => self.logger.info(message, vec![("trace_id", trace_id), ("span_id", span_id)]),
            }
            result
        })
    }
}

impl std::fmt::Debug for LoggingInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingInterceptor")
            .field("descriptor", &self.descriptor)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
