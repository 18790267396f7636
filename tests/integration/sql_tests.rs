//! Relational client: observed calls, pass-through, errors and latency.

use std::time::Duration;

use storebox::{
    Context, Error, ErrorKind,
    sql::{OperationKind, QueryOutput, Row, SqlConfig, Statement, Value, is_record_not_found},
    testing::MockSqlDriver,
    trace::{SpanContext, SpanStatus, attribute_keys},
};
use tokio_test::{assert_err, assert_ok};

use crate::common::{MYSQL_INSTANCE, Telemetry};

fn lookup() -> Statement {
    Statement::new("SELECT * FROM `user` WHERE name = ? LIMIT ?").bind("alice").bind(1)
}

#[tokio::test]
async fn test_unobserved_calls_leave_no_trace() {
    let telemetry = Telemetry::new();
    let mock = MockSqlDriver::new()
        .respond(Ok(QueryOutput::affected(3)))
        .respond(Err(Error::query("Error 1146 (42S02): Table 'shop.nope' doesn't exist")));
    let db = telemetry.database(&mock).await;

    let ctx = Context::background();
    assert_eq!(assert_ok!(db.update(&ctx, "UPDATE cart SET qty = 0").await).rows_affected, 3);
    let err = assert_err!(db.query(&ctx, "SELECT * FROM nope").await);
    assert_eq!(err.message(), "Error 1146 (42S02): Table 'shop.nope' doesn't exist");

    // An empty operation name is the same as none.
    assert_ok!(db.raw(&ctx.with_operation(""), "SELECT 1").await);

    assert!(telemetry.exporter.is_empty());
    assert!(telemetry.sink.lines().is_empty());
    assert_eq!(telemetry.series("db"), 0);
    assert_eq!(mock.call_count(), 3);
    assert!(mock.calls().iter().all(|call| call.span.is_none()));
}

#[tokio::test]
async fn test_observed_call_emits_one_of_each() {
    let telemetry = Telemetry::new();
    let mock = MockSqlDriver::new();
    let db = telemetry.database(&mock).await;

    assert_ok!(db.query(&Context::background().with_operation("demo"), lookup()).await);

    let spans = telemetry.spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name(), "demo");
    assert_eq!(span.status(), &SpanStatus::Ok);
    let attr = |key| span.attribute(key).and_then(|v| v.as_str()).map(str::to_owned);
    assert_eq!(attr(attribute_keys::DB_SYSTEM).as_deref(), Some("mysql"));
    assert_eq!(attr(attribute_keys::DB_CONNECTION_STRING).as_deref(), Some(MYSQL_INSTANCE));
    assert_eq!(attr(attribute_keys::DB_USER).as_deref(), Some("root"));
    assert_eq!(attr(attribute_keys::DB_NAME).as_deref(), Some("shop"));
    assert_eq!(attr(attribute_keys::DB_STATEMENT).as_deref(), Some("SELECT * FROM `user` WHERE name = ? LIMIT ?"));
    assert_eq!(attr(attribute_keys::DB_OPERATION).as_deref(), Some("demo"));

    let records = telemetry.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["level"], "info");
    assert_eq!(record["logger"], "storebox");
    let message = record["message"].as_str().unwrap();
    assert!(message.starts_with("db.operation=demo\tdb.system=mysql\tdb.connection_string=127.0.0.1:3306\t"));
    assert!(message.contains("db.user=root\tdb.name=shop\t"));
    assert!(message.contains("db.statement=SELECT * FROM `user` WHERE name = 'alice' LIMIT 1\t"));
    assert!(message.contains("latency="));
    assert_eq!(record["trace_id"], span.context().trace_id().to_string());
    assert_eq!(record["span_id"], span.context().span_id().to_string());
    assert!(record.get("exception_msg").is_none());

    assert_eq!(telemetry.requests("db", &[MYSQL_INSTANCE, "shop", "demo"]), Some(1));
    assert_eq!(telemetry.latency("db", &[MYSQL_INSTANCE, "shop", "demo"]).unwrap().count, 1);
}

#[tokio::test]
async fn test_error_is_reported_and_returned_unchanged() {
    let telemetry = Telemetry::new();
    let original = Error::not_found("record not found");
    let mock = MockSqlDriver::new().respond(Err(original.clone()));
    let db = telemetry.database(&mock).await;

    let err = assert_err!(db.query(&Context::background().with_operation("find_user"), lookup()).await);
    assert_eq!(err, original);
    assert_eq!(err.to_string(), original.to_string());
    assert!(is_record_not_found(&err));

    let span = telemetry.exporter.take().remove(0);
    assert_eq!(span.status().error_message(), Some(original.to_string().as_str()));
    assert_eq!(span.events().len(), 1);
    assert_eq!(span.events()[0].name, "exception");

    let record = &telemetry.records()[0];
    assert_eq!(record["level"], "error");
    assert_eq!(record["exception_msg"], original.to_string());
    assert_eq!(record["exception_type"], "sql");

    // Failures are counted like successes.
    assert_eq!(telemetry.requests("db", &[MYSQL_INSTANCE, "shop", "find_user"]), Some(1));
}

#[tokio::test]
async fn test_latency_tracks_driver_time() {
    let telemetry = Telemetry::new();
    let mock = MockSqlDriver::new().with_delay(Duration::from_millis(50));
    let db = telemetry.database(&mock).await;

    assert_ok!(db.create(&Context::background().with_operation("slow_insert"), "INSERT INTO t VALUES (1)").await);

    let latency = telemetry.latency("db", &[MYSQL_INSTANCE, "shop", "slow_insert"]).unwrap();
    assert_eq!(latency.count, 1);
    assert!(latency.sum >= 0.05, "observed {}s for a 50ms call", latency.sum);
    assert!(latency.sum < 0.5, "observed {}s for a 50ms call", latency.sum);

    let span = telemetry.exporter.take().remove(0);
    assert!(span.duration() >= Duration::from_millis(50));
}

#[tokio::test]
async fn test_span_joins_incoming_trace() {
    let telemetry = Telemetry::new();
    let mock = MockSqlDriver::new();
    let db = telemetry.database(&mock).await;

    let upstream = SpanContext::from_traceparent("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01").unwrap();
    let ctx = Context::background().with_span(upstream.clone()).with_operation("checkout");
    assert_ok!(db.delete(&ctx, "DELETE FROM cart WHERE id = ?").await);

    let span = telemetry.exporter.take().remove(0);
    assert_eq!(span.context().trace_id(), upstream.trace_id());
    assert_eq!(span.context().parent_span_id(), Some(upstream.span_id()));

    // The driver sees the new span, the caller's context is untouched.
    assert_eq!(mock.calls()[0].span.as_ref(), Some(span.context()));
    assert_eq!(ctx.span(), Some(&upstream));
}

#[tokio::test]
async fn test_each_kind_counts_under_its_operation() {
    let telemetry = Telemetry::new();
    let row = Row::from([("id".to_string(), Value::Int(7))]);
    let mock = MockSqlDriver::new().respond(Ok(QueryOutput::rows(vec![row.clone()])));
    let db = telemetry.database(&mock).await;

    let ctx = Context::background().with_operation("orders");
    let out = assert_ok!(db.exec(&ctx, OperationKind::Query, "SELECT id FROM orders").await);
    assert_eq!(out.rows, vec![row]);
    for kind in [OperationKind::Create, OperationKind::Update, OperationKind::Delete, OperationKind::Raw] {
        assert_ok!(db.exec(&ctx, kind, "SELECT 1").await);
    }

    assert_eq!(telemetry.requests("db", &[MYSQL_INSTANCE, "shop", "orders"]), Some(5));
    assert_eq!(telemetry.exporter.spans_named("orders").len(), 5);
    assert_eq!(telemetry.sink.lines().len(), 5);
}

#[tokio::test]
async fn test_clients_share_a_registry() {
    let telemetry = Telemetry::new();
    let primary = telemetry.database(&MockSqlDriver::new()).await;
    let replica = SqlConfig::new("reader@tcp(10.1.0.9:3306)/shop")
        .build(&MockSqlDriver::new(), &telemetry.options())
        .await
        .unwrap();

    let ctx = Context::background().with_operation("list");
    assert_ok!(primary.query(&ctx, "SELECT 1").await);
    assert_ok!(replica.query(&ctx, "SELECT 1").await);

    assert_eq!(telemetry.requests("db", &[MYSQL_INSTANCE, "shop", "list"]), Some(1));
    assert_eq!(telemetry.requests("db", &["10.1.0.9:3306", "shop", "list"]), Some(1));
    assert!(telemetry.registry.encode_text().contains("db_requests_total{db_instance=\"10.1.0.9:3306\""));
}

#[tokio::test]
async fn test_bad_dsn_installs_nothing() {
    let telemetry = Telemetry::new();
    let mock = MockSqlDriver::new();

    let err = assert_err!(SqlConfig::new("root@tcp(127.0.0.1:3306").build(&mock, &telemetry.options()).await);
    assert_eq!(err.kind(), ErrorKind::InvalidDsn);
    assert!(mock.opened().is_empty());
    assert!(telemetry.registry.gather().is_empty());
}
