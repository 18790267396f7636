//! Metrics collection.
//!
//! A [`Registry`] owns labelled metric families ([`CounterVec`],
//! [`HistogramVec`]). It is an explicit handle passed to each client through
//! [`Options`](crate::Options), so several instrumented clients can live in
//! one process with independent registries, or share one by cloning it.
//!
//! ## Example
//!
//! ```rust
//! use storebox::metrics::{Opts, Registry};
//!
//! let registry = Registry::new();
//! let requests = registry
//!     .counter_vec(Opts::new("total", "The total number of db operation").namespace("db").subsystem("requests"),
//!         &["db_instance", "db_name", "operation"])
//!     .unwrap();
//!
//! requests.with_label_values(&["127.0.0.1:3306", "shop", "demo"]).unwrap().inc();
//!
//! assert!(registry.encode_text().contains(
//!     r#"db_requests_total{db_instance="127.0.0.1:3306",db_name="shop",operation="demo"} 1"#
//! ));
//! ```

mod counter;
mod desc;
mod histogram;
mod registry;
mod text;

use std::collections::BTreeMap;

pub use counter::{Counter, CounterVec};
pub use desc::Opts;
pub use histogram::{Histogram, HistogramVec};
pub use registry::{HistogramSnapshot, MetricFamily, MetricKind, MetricSample, Registry, SampleValue};

/// Default latency histogram buckets, in seconds.
pub fn default_latency_buckets() -> Vec<f64> {
    vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
}

/// Configuration for the metrics observers.
///
/// ## Example
///
/// ```rust
/// use storebox::metrics::MetricsConfig;
///
/// let config = MetricsConfig::builder()
///     .buckets(vec![0.01, 0.1, 1.0])
///     .build()
///     .with_label("service", "checkout");
///
/// assert_eq!(config.const_labels["service"], "checkout");
/// ```
#[derive(Debug, Clone, PartialEq, bon::Builder)]
pub struct MetricsConfig {
    /// Histogram bucket upper bounds for latency metrics (in seconds).
    #[builder(default = default_latency_buckets())]
    pub buckets: Vec<f64>,
    /// Labels added to every series.
    #[builder(default)]
    pub const_labels: BTreeMap<String, String>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MetricsConfig {
    /// Adds a constant label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.const_labels.insert(key.into(), value.into());
        self
    }
}
