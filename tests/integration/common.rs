//! Shared fixture wiring the telemetry doubles into `Options`.

use std::sync::Arc;

use serde_json::Value;
use storebox::{
    Options,
    kv::{KvClient, KvConfig},
    logging::JsonLogger,
    metrics::{HistogramSnapshot, Registry},
    sql::{Database, SqlConfig},
    testing::{MemoryKv, MemorySink, MockSqlDriver},
    trace::{FinishedSpan, InMemoryExporter},
};

pub const MYSQL_DSN: &str = "root:secret@tcp(127.0.0.1:3306)/shop?charset=utf8mb4";
pub const MYSQL_INSTANCE: &str = "127.0.0.1:3306";
pub const KV_INSTANCE: &str = "10.0.0.1:6379,10.0.0.2:6379";

/// Collects every telemetry signal emitted by clients built from [`Telemetry::options`].
pub struct Telemetry {
    pub exporter: InMemoryExporter,
    pub sink: MemorySink,
    pub registry: Registry,
}

impl Telemetry {
    pub fn new() -> Self {
        Self { exporter: InMemoryExporter::new(), sink: MemorySink::new(), registry: Registry::new() }
    }

    pub fn options(&self) -> Options {
        Options::new()
            .with_exporter(Arc::new(self.exporter.clone()))
            .with_logger(Arc::new(JsonLogger::new(Arc::new(self.sink.clone())).with_name("storebox")))
            .with_registry(self.registry.clone())
    }

    pub async fn database(&self, mock: &MockSqlDriver) -> Database {
        SqlConfig::new(MYSQL_DSN).build(mock, &self.options()).await.expect("relational client should build")
    }

    pub async fn kv(&self, kv: &MemoryKv) -> KvClient {
        KvConfig::new()
            .with_addr(["10.0.0.1:6379", "10.0.0.2:6379"])
            .with_db(2)
            .build(kv, &self.options())
            .await
            .expect("key-value client should build")
    }

    pub fn spans(&self) -> Vec<FinishedSpan> {
        self.exporter.spans()
    }

    pub fn records(&self) -> Vec<Value> {
        self.sink.records()
    }

    /// Counter value for `(instance, db, operation)`, `None` if never touched.
    pub fn requests(&self, namespace: &str, labels: &[&str]) -> Option<u64> {
        self.registry.family(&format!("{namespace}_requests_total"))?.sample(labels)?.counter()
    }

    /// Latency histogram for `(instance, db, operation)`.
    pub fn latency(&self, namespace: &str, labels: &[&str]) -> Option<HistogramSnapshot> {
        self.registry.family(&format!("{namespace}_requests_latency_seconds"))?.sample(labels)?.histogram().cloned()
    }

    /// Total number of labelled series across both families of `namespace`.
    pub fn series(&self, namespace: &str) -> usize {
        ["requests_total", "requests_latency_seconds"]
            .iter()
            .filter_map(|suffix| self.registry.family(&format!("{namespace}_{suffix}")))
            .map(|family| family.metrics.len())
            .sum()
    }
}
