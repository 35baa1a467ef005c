//! End-to-end dispatch behavior over the memory store.

#![allow(clippy::expect_used)]

mod support;

use std::{sync::Arc, time::Duration};

use herald_common::{CampaignRecord, CampaignStatus};
use herald_engine::RunOutcome;
use herald_store::CampaignStore;
use pretty_assertions::assert_eq;

use support::{ScriptedTransport, engine, memory_store, pending_campaign};

async fn pause(store: &Arc<dyn CampaignStore>, id: &herald_store::CampaignId) {
    store
        .update(
            id,
            Box::new(|record| record.status = CampaignStatus::Paused),
        )
        .await
        .expect("pause write");
}

#[tokio::test]
async fn test_clean_run_completes_with_conserved_counters() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1", "u2", "u3", "u4"]))
        .await
        .expect("create");

    let outcome = engine.run(&id).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.status, CampaignStatus::Completed);
    assert_eq!(record.success_count, 4);
    assert_eq!(record.failure_count, 0);
    assert_eq!(record.current_index, 4);
    assert_eq!(
        record.success_count + record.failure_count,
        record.current_index as u64
    );
    assert_eq!(transport.total_attempts(), 4);
}

#[tokio::test]
async fn test_mixed_outcomes_end_state() {
    // u1 delivers, u2 fails permanently, u3 delivers
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("u2", &[400]);
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1", "u2", "u3"]))
        .await
        .expect("create");

    let outcome = engine.run(&id).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.status, CampaignStatus::Completed);
    assert_eq!(record.success_count, 2);
    assert_eq!(record.failure_count, 1);
    assert_eq!(record.current_index, 3);
    assert_eq!(record.last_recipient.as_deref(), Some("u3"));
    // The final delivery succeeded, so the diagnostic error is cleared
    assert_eq!(record.last_error, None);
}

#[tokio::test]
async fn test_transient_failures_count_one_success() {
    // Three server errors then a 200: one delivery, no failure recorded
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("u1", &[500, 500, 500, 200]);
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1"]))
        .await
        .expect("create");

    let outcome = engine.run(&id).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.success_count, 1);
    assert_eq!(record.failure_count, 0);
    assert_eq!(transport.attempts_for("u1"), 4);
}

#[tokio::test]
async fn test_retry_exhaustion_counts_one_failure() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    transport.respond("u1", &[503, 503, 503, 503, 503]);
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1", "u2"]))
        .await
        .expect("create");

    let outcome = engine.run(&id).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.success_count, 1);
    assert_eq!(record.failure_count, 1);
    assert_eq!(record.current_index, 2);
    assert_eq!(record.last_recipient.as_deref(), Some("u2"));
    assert_eq!(transport.attempts_for("u1"), 5);
    assert_eq!(transport.attempts_for("u2"), 1);
}

#[tokio::test]
async fn test_non_pending_campaign_is_a_no_op() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine(store.clone(), transport.clone());

    for status in [
        CampaignStatus::InProgress,
        CampaignStatus::Completed,
        CampaignStatus::Stopped,
        CampaignStatus::Failed,
    ] {
        let mut record = pending_campaign(&["u1"]);
        record.status = status;
        let id = store.create(&record).await.expect("create");

        let outcome = engine.run(&id).await;
        assert_eq!(outcome, RunOutcome::NoOp, "status {status} must not run");

        let after = store.get(&id).await.expect("get");
        assert_eq!(after.status, status);
        assert_eq!(after.success_count, 0);
        assert_eq!(after.current_index, 0);
    }

    assert_eq!(transport.total_attempts(), 0);
}

#[tokio::test]
async fn test_invalid_campaign_fails_before_any_send() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine(store.clone(), transport.clone());

    let mut record = pending_campaign(&["u1", "u2"]);
    record.message = None;
    record.image_url = None;
    let id = store.create(&record).await.expect("create");

    let outcome = engine.run(&id).await;
    assert_eq!(outcome, RunOutcome::Failed);

    let after = store.get(&id).await.expect("get");
    assert_eq!(after.status, CampaignStatus::Failed);
    assert!(after.last_error.is_some());
    assert_eq!(after.current_index, 0);
    assert_eq!(transport.total_attempts(), 0);
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_send() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine(store.clone(), transport.clone());

    let mut record = pending_campaign(&["u1"]);
    record.access_token = String::new();
    let id = store.create(&record).await.expect("create");

    assert_eq!(engine.run(&id).await, RunOutcome::Failed);
    assert_eq!(transport.total_attempts(), 0);
}

#[tokio::test]
async fn test_pause_and_resume_without_re_send() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::with_latency(Duration::from_millis(40)));
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1", "u2", "u3"]))
        .await
        .expect("create");

    let run = {
        let engine = engine.clone();
        let id = id.clone();
        tokio::spawn(async move { engine.run(&id).await })
    };

    // Pause while the first send is in flight; the signal takes effect
    // before the next recipient
    tokio::time::sleep(Duration::from_millis(20)).await;
    pause(&store, &id).await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    let paused = store.get(&id).await.expect("get");
    assert_eq!(paused.status, CampaignStatus::Paused);
    let progress_while_paused = paused.current_index;

    // No sends happen while paused
    let attempts_while_paused = transport.total_attempts();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(transport.total_attempts(), attempts_while_paused);

    store
        .update(
            &id,
            Box::new(|record| record.status = CampaignStatus::InProgress),
        )
        .await
        .expect("resume write");

    let outcome = run.await.expect("join");
    assert_eq!(outcome, RunOutcome::Completed);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.status, CampaignStatus::Completed);
    assert_eq!(record.success_count, 3);
    assert!(record.current_index >= progress_while_paused);

    // Resumption continues from the checkpoint: exactly one delivery each
    for recipient in ["u1", "u2", "u3"] {
        assert_eq!(
            transport.attempts_for(recipient),
            1,
            "{recipient} must be sent exactly once across the pause"
        );
    }
}

#[tokio::test]
async fn test_stop_is_never_overwritten_by_completion() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::with_latency(Duration::from_millis(60)));
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1"]))
        .await
        .expect("create");

    let run = {
        let engine = engine.clone();
        let id = id.clone();
        tokio::spawn(async move { engine.run(&id).await })
    };

    // Stop while the only recipient's send is in flight: the checkpoint
    // still lands, but finalisation must not flip the record to completed
    tokio::time::sleep(Duration::from_millis(20)).await;
    store
        .update(
            &id,
            Box::new(|record| record.status = CampaignStatus::Stopped),
        )
        .await
        .expect("stop write");

    let outcome = run.await.expect("join");
    assert_eq!(outcome, RunOutcome::Stopped);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.status, CampaignStatus::Stopped);
    assert_eq!(record.success_count, 1);
    assert_eq!(record.current_index, 1);
}

#[tokio::test]
async fn test_stop_before_next_recipient_ends_the_run() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::with_latency(Duration::from_millis(60)));
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1", "u2", "u3"]))
        .await
        .expect("create");

    let run = {
        let engine = engine.clone();
        let id = id.clone();
        tokio::spawn(async move { engine.run(&id).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    store
        .update(
            &id,
            Box::new(|record| record.status = CampaignStatus::Stopped),
        )
        .await
        .expect("stop write");

    let outcome = run.await.expect("join");
    assert_eq!(outcome, RunOutcome::Stopped);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.status, CampaignStatus::Stopped);
    // The in-flight recipient was checkpointed; nothing after it ran
    assert_eq!(record.current_index, 1);
    assert_eq!(transport.attempts_for("u2"), 0);
    assert_eq!(transport.attempts_for("u3"), 0);
}

#[tokio::test]
async fn test_externally_injected_failed_ends_the_run() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::with_latency(Duration::from_millis(60)));
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&["u1", "u2"]))
        .await
        .expect("create");

    let run = {
        let engine = engine.clone();
        let id = id.clone();
        tokio::spawn(async move { engine.run(&id).await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    store
        .update(
            &id,
            Box::new(|record| record.status = CampaignStatus::Failed),
        )
        .await
        .expect("failed write");

    let outcome = run.await.expect("join");
    assert_eq!(outcome, RunOutcome::Failed);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.status, CampaignStatus::Failed);
    assert_eq!(transport.attempts_for("u2"), 0);
}

#[tokio::test]
async fn test_resume_from_persisted_cursor() {
    // A crashed run left the cursor at 2: only the tail is dispatched
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine(store.clone(), transport.clone());

    let mut record = pending_campaign(&["u1", "u2", "u3", "u4"]);
    record.current_index = 2;
    record.success_count = 1;
    record.failure_count = 1;
    let id = store.create(&record).await.expect("create");

    let outcome = engine.run(&id).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let record = store.get(&id).await.expect("get");
    assert_eq!(record.success_count, 3);
    assert_eq!(record.failure_count, 1);
    assert_eq!(record.current_index, 4);
    assert_eq!(transport.attempts_for("u1"), 0);
    assert_eq!(transport.attempts_for("u2"), 0);
    assert_eq!(transport.attempts_for("u3"), 1);
    assert_eq!(transport.attempts_for("u4"), 1);
}

#[tokio::test]
async fn test_cursor_past_audience_end_completes_without_sends() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine(store.clone(), transport.clone());

    let mut record = pending_campaign(&["u1", "u2"]);
    record.current_index = 99;
    record.success_count = 2;
    let id = store.create(&record).await.expect("create");

    let outcome = engine.run(&id).await;
    assert_eq!(outcome, RunOutcome::Completed);

    let after = store.get(&id).await.expect("get");
    assert_eq!(after.status, CampaignStatus::Completed);
    assert_eq!(after.current_index, 2);
    assert_eq!(transport.total_attempts(), 0);
}

#[tokio::test]
async fn test_empty_audience_completes_immediately() {
    let store = memory_store();
    let transport = Arc::new(ScriptedTransport::new());
    let engine = engine(store.clone(), transport.clone());

    let id = store
        .create(&pending_campaign(&[]))
        .await
        .expect("create");

    assert_eq!(engine.run(&id).await, RunOutcome::Completed);
    let record: CampaignRecord = store.get(&id).await.expect("get");
    assert_eq!(record.status, CampaignStatus::Completed);
    assert_eq!(transport.total_attempts(), 0);
}
