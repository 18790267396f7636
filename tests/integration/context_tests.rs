//! Operation-name round trips and chain ordering across clients.

use proptest::prelude::*;
use storebox::{
    Context, operation_from,
    testing::{MemoryKv, MockSqlDriver},
    trace::SpanContext,
    with_operation,
};
use tokio_test::assert_ok;

use crate::common::Telemetry;

fn base_context() -> impl Strategy<Value = Context> {
    (proptest::option::of("[a-z_]{0,12}"), any::<bool>()).prop_map(|(prior, with_span)| {
        let mut ctx = Context::background();
        if let Some(prior) = prior {
            ctx = ctx.with_operation(prior);
        }
        if with_span {
            ctx = ctx.with_span(SpanContext::new_root());
        }
        ctx
    })
}

proptest! {
    #[test]
    fn operation_name_round_trips(base in base_context(), name in "\\PC{1,32}") {
        let ctx = with_operation(&base, &name);
        prop_assert_eq!(operation_from(&ctx), Some(name.as_str()));
        prop_assert_eq!(ctx.span(), base.span());
    }
}

#[test]
fn test_latest_name_wins_and_parent_is_untouched() {
    let parent = with_operation(&Context::background(), "outer");
    let child = with_operation(&parent, "inner");

    assert_eq!(operation_from(&parent), Some("outer"));
    assert_eq!(operation_from(&child), Some("inner"));
    assert_eq!(operation_from(&with_operation(&child, "")), None);
}

#[tokio::test]
async fn test_log_lines_correlate_with_spans_on_both_clients() {
    let telemetry = Telemetry::new();
    let db = telemetry.database(&MockSqlDriver::new()).await;
    let kv = telemetry.kv(&MemoryKv::new()).await;

    assert_ok!(db.query(&Context::background().with_operation("sql_op"), "SELECT 1").await);
    assert_ok!(kv.set(&Context::background().with_operation("kv_op"), "k", "v").await);
    assert_ok!(kv.pipelined(&Context::background().with_operation("kv_batch"), [storebox::kv::Command::ping()]).await);

    let spans = telemetry.spans();
    let records = telemetry.records();
    assert_eq!(spans.len(), 3);
    assert_eq!(records.len(), 3);

    // Logging runs inside the span, so every line carries its span's ids.
    for (span, record) in spans.iter().zip(&records) {
        assert_eq!(record["trace_id"], span.context().trace_id().to_string());
        assert_eq!(record["span_id"], span.context().span_id().to_string());
        let operation = format!("db.operation={}\t", span.name());
        assert!(record["message"].as_str().unwrap().starts_with(&operation));
    }
}
