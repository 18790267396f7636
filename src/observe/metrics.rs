//! Request counter and latency histogram per observed call.

use std::time::Instant;

use super::ClientKind;
use crate::{
    Context, Descriptor, Result,
    metrics::{CounterVec, HistogramVec, MetricsConfig, Opts, Registry},
    middleware::{Call, CallFuture, Interceptor, Next},
};

/// Counts and times every observed call.
///
/// Both series are updated whatever the outcome, labelled by
/// `(instance, database, operation)`:
///
/// | Series                            | Type      |
/// |-----------------------------------|-----------|
/// | `{ns}_requests_total`             | counter   |
/// | `{ns}_requests_latency_seconds`   | histogram |
#[derive(Debug, Clone)]
pub struct MetricsInterceptor {
    requests: CounterVec,
    latency: HistogramVec,
    instance: String,
    database: String,
}

impl MetricsInterceptor {
    /// Registers (or reuses) the two families in `registry`.
    pub fn new(descriptor: &Descriptor, kind: ClientKind, registry: &Registry, config: &MetricsConfig) -> Result<Self> {
        let ns = kind.namespace();
        let labels = kind.label_names();

        let requests = registry.counter_vec(
            Opts::new("total", "The total number of db operation")
                .namespace(ns)
                .subsystem("requests")
                .const_labels(config.const_labels.clone()),
            &labels,
        )?;
        let latency = registry.histogram_vec(
            Opts::new("latency_seconds", "The second latency of db operation")
                .namespace(ns)
                .subsystem("requests")
                .const_labels(config.const_labels.clone()),
            &labels,
            config.buckets.clone(),
        )?;

        Ok(Self { requests, latency, instance: descriptor.address(), database: descriptor.database().to_string() })
    }

    /// The invocation counter family.
    pub fn requests(&self) -> &CounterVec {
        &self.requests
    }

    /// The latency histogram family.
    pub fn latency(&self) -> &HistogramVec {
        &self.latency
    }
}

impl<C: Call> Interceptor<C> for MetricsInterceptor {
    fn intercept<'a>(&'a self, ctx: Context, call: C, next: Next<'a, C>) -> CallFuture<'a, C::Output> {
        let Some(operation) = ctx.operation().map(str::to_owned) else {
            return next.run(ctx, call);
        };

        Box::pin(async move {
            let started = Instant::now();
            let result = next.run(ctx, call).await;
            let elapsed = started.elapsed().as_secs_f64();

            let values = [self.instance.as_str(), self.database.as_str(), operation.as_str()];
            if let Ok(counter) = self.requests.with_label_values(&values) {
                counter.inc();
            }
            if let Ok(histogram) = self.latency.with_label_values(&values) {
                histogram.observe(elapsed);
            }
            result
        })
    }
}
