//! Overlapping observed calls on one shared client.

use std::{collections::BTreeSet, time::Duration};

use futures::future::join_all;
use storebox::{
    Context,
    kv::Command,
    sql::Statement,
    testing::{MemoryKv, MockSqlDriver},
};
use tokio_test::assert_ok;

use crate::common::{KV_INSTANCE, MYSQL_INSTANCE, Telemetry};

const CALLS: usize = 64;

fn span_ids_of_records(telemetry: &Telemetry) -> BTreeSet<String> {
    telemetry.records().iter().map(|record| record["span_id"].as_str().unwrap().to_string()).collect()
}

fn span_ids_of_spans(telemetry: &Telemetry) -> BTreeSet<String> {
    telemetry.spans().iter().map(|span| span.context().span_id().to_string()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_queries_each_get_their_own_telemetry() {
    let telemetry = Telemetry::new();
    let mock = MockSqlDriver::new().with_delay(Duration::from_millis(10));
    let db = telemetry.database(&mock).await;

    let tasks = (0..CALLS).map(|i| {
        let db = db.clone();
        tokio::spawn(async move {
            let ctx = Context::background().with_operation("fan_out");
            db.query(&ctx, Statement::new("SELECT * FROM cart WHERE id = ?").bind(i as u64)).await
        })
    });
    for joined in join_all(tasks).await {
        assert_ok!(joined.unwrap());
    }

    let spans = telemetry.spans();
    assert_eq!(spans.len(), CALLS);
    assert_eq!(telemetry.records().len(), CALLS);
    assert_eq!(telemetry.requests("db", &[MYSQL_INSTANCE, "shop", "fan_out"]), Some(CALLS as u64));
    assert_eq!(telemetry.latency("db", &[MYSQL_INSTANCE, "shop", "fan_out"]).unwrap().count, CALLS as u64);

    // Every log line and every driver call belongs to exactly one exported span.
    let exported = span_ids_of_spans(&telemetry);
    assert_eq!(exported.len(), CALLS);
    assert_eq!(span_ids_of_records(&telemetry), exported);

    let seen_by_driver: BTreeSet<String> =
        mock.calls().iter().map(|call| call.span.as_ref().unwrap().span_id().to_string()).collect();
    assert_eq!(seen_by_driver, exported);

    let traces: BTreeSet<String> = spans.iter().map(|span| span.context().trace_id().to_string()).collect();
    assert_eq!(traces.len(), CALLS);
}

#[tokio::test]
async fn test_interleaved_commands_each_get_their_own_telemetry() {
    let telemetry = Telemetry::new();
    let kv = MemoryKv::new().with_delay(Duration::from_millis(10));
    let client = telemetry.kv(&kv).await;

    let calls = (0..CALLS).map(|i| {
        let client = &client;
        async move {
            let ctx = Context::background().with_operation("warm_cache");
            client.process(&ctx, Command::set(format!("key:{i}"), i)).await
        }
    });
    for outcome in join_all(calls).await {
        assert_ok!(outcome);
    }

    assert_eq!(kv.len(), CALLS);
    assert_eq!(telemetry.spans().len(), CALLS);
    assert_eq!(telemetry.records().len(), CALLS);
    assert_eq!(telemetry.requests("redis", &[KV_INSTANCE, "2", "warm_cache"]), Some(CALLS as u64));

    let exported = span_ids_of_spans(&telemetry);
    assert_eq!(exported.len(), CALLS);
    assert_eq!(span_ids_of_records(&telemetry), exported);

    // Log lines are not shuffled between calls: each names its own key.
    for i in 0..CALLS {
        let needle = format!("db.statement=set key:{i} {i}\t");
        let matching = telemetry.records().iter().filter(|r| r["message"].as_str().unwrap().contains(&needle)).count();
        assert_eq!(matching, 1, "expected one log line for key:{i}");
    }
}
