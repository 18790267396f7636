//! Key-value client: single commands, pipelines and the nil sentinel.

use std::time::Duration;

use storebox::{
    Context, Error, ErrorKind,
    kv::{Command, KvConfig, Reply, is_nil},
    testing::MemoryKv,
    trace::{SpanStatus, attribute_keys},
};
use tokio_test::{assert_err, assert_ok};

use crate::common::{KV_INSTANCE, Telemetry};

#[tokio::test]
async fn test_unobserved_commands_leave_no_trace() {
    let telemetry = Telemetry::new();
    let kv = MemoryKv::new();
    let client = telemetry.kv(&kv).await;
    let ctx = Context::background();

    assert_ok!(client.set(&ctx, "greeting", "hello").await);
    assert_eq!(assert_ok!(client.get(&ctx, "greeting").await).as_deref(), Some("hello"));
    assert_ok!(client.pipelined(&ctx, [Command::get("greeting"), Command::ping()]).await);

    assert!(telemetry.exporter.is_empty());
    assert!(telemetry.sink.lines().is_empty());
    assert_eq!(telemetry.series("redis"), 0);
}

#[tokio::test]
async fn test_observed_command_emits_one_of_each() {
    let telemetry = Telemetry::new();
    let client = telemetry.kv(&MemoryKv::new()).await;

    assert_ok!(client.set(&Context::background().with_operation("demo"), "greeting", "hello").await);

    let spans = telemetry.spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name(), "demo");
    assert_eq!(span.attribute(attribute_keys::DB_SYSTEM).and_then(|v| v.as_str()), Some("redis"));
    assert_eq!(span.attribute(attribute_keys::DB_CONNECTION_STRING).and_then(|v| v.as_str()), Some(KV_INSTANCE));
    assert_eq!(span.attribute(attribute_keys::DB_STATEMENT).and_then(|v| v.as_str()), Some("set greeting hello"));
    assert!(span.attribute(attribute_keys::DB_USER).is_none());

    let records = telemetry.records();
    assert_eq!(records.len(), 1);
    let message = records[0]["message"].as_str().unwrap();
    assert!(message.starts_with("db.operation=demo\t"));
    assert!(message.contains("db.connection_string=10.0.0.1:6379,10.0.0.2:6379\tdb.name=2\t"));
    assert!(!message.contains("db.user="));
    assert_eq!(records[0]["span_id"], span.context().span_id().to_string());

    assert_eq!(telemetry.requests("redis", &[KV_INSTANCE, "2", "demo"]), Some(1));
    let sample = telemetry.registry.family("redis_requests_total").unwrap();
    assert_eq!(sample.metrics[0].label("redis_instance"), Some(KV_INSTANCE));
    assert_eq!(sample.metrics[0].label("db"), Some("2"));
}

#[tokio::test]
async fn test_missing_key_is_a_miss_not_a_failure() {
    let telemetry = Telemetry::new();
    let client = telemetry.kv(&MemoryKv::new()).await;
    let ctx = Context::background().with_operation("read_session");

    let err = assert_err!(client.process(&ctx, Command::get("session:404")).await);
    assert!(is_nil(&err));
    assert_eq!(err.kind(), ErrorKind::Nil);
    assert_eq!(assert_ok!(client.get(&ctx, "session:404").await), None);

    for span in telemetry.spans() {
        assert_eq!(span.status(), &SpanStatus::Ok);
        assert!(span.events().is_empty());
    }
    for record in telemetry.records() {
        assert_eq!(record["level"], "info");
    }
    assert_eq!(telemetry.requests("redis", &[KV_INSTANCE, "2", "read_session"]), Some(2));
}

#[tokio::test]
async fn test_command_error_is_reported_and_returned() {
    let telemetry = Telemetry::new();
    let kv = MemoryKv::new();
    kv.insert("name", "alice");
    let client = telemetry.kv(&kv).await;

    let err = assert_err!(client.process(&Context::background().with_operation("bump"), Command::new("INCR").arg("name")).await);
    assert_eq!(err, Error::query("ERR value is not an integer or out of range"));

    let span = telemetry.exporter.take().remove(0);
    assert!(span.status().is_error());
    let record = &telemetry.records()[0];
    assert_eq!(record["level"], "error");
    assert_eq!(record["exception_msg"], err.to_string());
    assert_eq!(record["exception_type"], "redis");
}

#[tokio::test]
async fn test_pipeline_is_one_unit() {
    let telemetry = Telemetry::new();
    let kv = MemoryKv::new();
    let client = telemetry.kv(&kv).await;
    let ctx = Context::background().with_operation("warm_cache");

    let replies = assert_ok!(
        client
            .pipelined(&ctx, [Command::set("a", 1), Command::set("b", 2), Command::new("incr").arg("a"), Command::get("b")])
            .await
    );
    assert_eq!(replies, vec![
        Ok(Reply::Status("OK".into())),
        Ok(Reply::Status("OK".into())),
        Ok(Reply::Int(2)),
        Ok(Reply::Bulk("2".into())),
    ]);

    assert_eq!(telemetry.exporter.len(), 1);
    assert_eq!(telemetry.sink.lines().len(), 1);
    assert_eq!(telemetry.requests("redis", &[KV_INSTANCE, "2", "warm_cache"]), Some(1));
    assert_eq!(telemetry.latency("redis", &[KV_INSTANCE, "2", "warm_cache"]).unwrap().count, 1);

    let span = telemetry.exporter.take().remove(0);
    assert_eq!(
        span.attribute(attribute_keys::DB_STATEMENT).and_then(|v| v.as_str()),
        Some("set a 1\nset b 2\nincr a\nget b")
    );
    assert_eq!(kv.contexts().len(), 1);
}

#[tokio::test]
async fn test_pipeline_outcome_follows_first_command() {
    let telemetry = Telemetry::new();
    let client = telemetry.kv(&MemoryKv::new()).await;
    let ctx = Context::background().with_operation("batch");

    // A later failure does not mark the batch.
    let replies = assert_ok!(client.pipelined(&ctx, [Command::ping(), Command::new("nope")]).await);
    assert!(replies[1].is_err());

    // A nil first reply does not either.
    assert_ok!(client.pipelined(&ctx, [Command::get("missing"), Command::ping()]).await);

    // A failing first command does.
    assert_ok!(client.pipelined(&ctx, [Command::new("nope"), Command::ping()]).await);

    let statuses: Vec<_> = telemetry.spans().iter().map(|s| s.status().is_error()).collect();
    assert_eq!(statuses, [false, false, true]);
    let levels: Vec<_> = telemetry.records().iter().map(|r| r["level"].as_str().unwrap().to_string()).collect();
    assert_eq!(levels, ["info", "info", "error"]);
}

#[tokio::test]
async fn test_pipeline_transport_failure() {
    let telemetry = Telemetry::new();
    let client = telemetry.kv(&MemoryKv::new().fail_pipeline(Error::connection("broken pipe"))).await;

    let err = assert_err!(client.pipelined(&Context::background().with_operation("batch"), [Command::ping()]).await);
    assert_eq!(err.kind(), ErrorKind::Connection);

    let span = telemetry.exporter.take().remove(0);
    assert_eq!(span.status().error_message(), Some(err.to_string().as_str()));
}

#[tokio::test]
async fn test_pipeline_latency_tracks_driver_time() {
    let telemetry = Telemetry::new();
    let client = telemetry.kv(&MemoryKv::new().with_delay(Duration::from_millis(50))).await;

    assert_ok!(client.pipelined(&Context::background().with_operation("slow"), [Command::ping(), Command::ping()]).await);

    let latency = telemetry.latency("redis", &[KV_INSTANCE, "2", "slow"]).unwrap();
    assert!(latency.sum >= 0.05, "observed {}s for a 50ms batch", latency.sum);
    assert!(latency.sum < 0.5, "observed {}s for a 50ms batch", latency.sum);
}

#[tokio::test]
async fn test_failed_ping_fails_build() {
    let telemetry = Telemetry::new();
    let kv = MemoryKv::new().fail_ping(Error::connection("connection refused"));

    let err = assert_err!(KvConfig::new().with_addr(["10.0.0.1:6379"]).build(&kv, &telemetry.options()).await);
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(telemetry.registry.gather().is_empty());
}

#[tokio::test]
async fn test_io_not_found_from_driver_is_a_failure() {
    let telemetry = Telemetry::new();
    let socket = std::io::Error::new(std::io::ErrorKind::NotFound, "dial unix /var/run/redis.sock: no such file");
    let client = telemetry.kv(&MemoryKv::new().fail_commands(Error::from(socket))).await;
    let ctx = Context::background().with_operation("read_session");

    let err = assert_err!(client.process(&ctx, Command::get("session:1")).await);
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!is_nil(&err));
    // Only the nil sentinel becomes a miss.
    assert_err!(client.get(&ctx, "session:1").await);

    let spans = telemetry.spans();
    assert_eq!(spans.len(), 2);
    for span in &spans {
        assert!(span.status().is_error());
    }
    for record in telemetry.records() {
        assert_eq!(record["level"], "error");
        assert_eq!(record["exception_type"], "redis");
    }
}
