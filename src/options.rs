//! Build options shared by both clients.

use std::{fmt, sync::Arc};

use crate::{
    logging::{JsonLogger, Logger},
    metrics::{MetricsConfig, Registry},
    trace::{NoopExporter, SpanExporter},
};

/// Collaborators injected into a client at build time.
///
/// | Field          | Default                          |
/// |----------------|----------------------------------|
/// | logger         | [`JsonLogger`] writing to stdout |
/// | registry       | a fresh, private [`Registry`]    |
/// | exporter       | [`NoopExporter`]                 |
/// | metrics config | [`MetricsConfig::default()`]     |
///
/// Pass the same [`Registry`] to every client whose metrics should be served
/// from one scrape endpoint.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use storebox::Options;
/// use storebox::logging::JsonLogger;
/// use storebox::metrics::Registry;
/// use storebox::trace::InMemoryExporter;
///
/// let registry = Registry::new();
/// let options = Options::new()
///     .with_logger(Arc::new(JsonLogger::stdout().with_name("orders")))
///     .with_registry(registry.clone())
///     .with_exporter(Arc::new(InMemoryExporter::new()));
/// ```
#[derive(Clone)]
pub struct Options {
    logger: Arc<dyn Logger>,
    registry: Registry,
    exporter: Arc<dyn SpanExporter>,
    metrics: MetricsConfig,
}

impl Options {
    /// Creates options with the defaults listed above.
    pub fn new() -> Self {
        Self {
            logger: Arc::new(JsonLogger::stdout()),
            registry: Registry::new(),
            exporter: Arc::new(NoopExporter),
            metrics: MetricsConfig::default(),
        }
    }

    /// Overrides the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Sets the metrics registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the span exporter.
    #[must_use]
    pub fn with_exporter(mut self, exporter: Arc<dyn SpanExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    /// Sets bucket boundaries and constant labels for the metric families.
    #[must_use]
    pub fn with_metrics_config(mut self, config: MetricsConfig) -> Self {
        self.metrics = config;
        self
    }

    /// Returns the logger.
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger)
    }

    /// Returns the metrics registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the span exporter.
    pub fn exporter(&self) -> Arc<dyn SpanExporter> {
        Arc::clone(&self.exporter)
    }

    /// Returns the metrics configuration.
    pub fn metrics_config(&self) -> &MetricsConfig {
        &self.metrics
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("registry", &self.registry)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
