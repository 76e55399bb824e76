use std::sync::Arc;

use tokio::task::JoinSet;
use vote_pipeline::{Clock, SubmissionStatus};

use crate::utils::data_types::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_identical_concurrent_submissions_accept_one() {
    let ctx = TestContext::new(vec![]);
    let ledger = ctx.service.ledger().clone();
    let req = request("voter-1", ctx.clock.now());

    let mut set = JoinSet::new();
    for _ in 0..5 {
        let ledger = ledger.clone();
        let req = req.clone();
        set.spawn(async move { ledger.submit(req).await });
    }

    let mut successes = 0;
    let mut duplicates = 0;
    while let Some(joined) = set.join_next().await {
        match joined.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => {
                assert_eq!(
                    e.to_string(),
                    "A vote for this election is already pending or confirmed"
                );
                duplicates += 1;
            }
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(duplicates, 4);
    assert_eq!(ctx.transport.calls(), 1);

    let stats = ledger.get_statistics();
    assert_eq!(stats.confirmed, 1);
    assert_eq!(stats.total, 1);

    let metrics = ledger.metrics();
    assert_eq!(outcome_count(&metrics, "confirmed"), 1);
    assert_eq!(outcome_count(&metrics, "duplicate"), 4);
    assert_eq!(metrics["submit_count"], 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_voters_do_not_block_each_other() {
    let ctx = TestContext::new(vec![]);
    let ledger = ctx.service.ledger().clone();
    let now = ctx.clock.now();

    let mut set = JoinSet::new();
    for i in 0..10 {
        let ledger = ledger.clone();
        set.spawn(async move { ledger.submit(request(&format!("voter-{}", i), now)).await });
    }

    let mut vote_ids = Vec::new();
    while let Some(joined) = set.join_next().await {
        vote_ids.push(joined.unwrap().unwrap().vote_id);
    }
    vote_ids.sort();
    vote_ids.dedup();
    assert_eq!(vote_ids.len(), 10);

    for vote_id in &vote_ids {
        let record = ledger.get_submission_status(vote_id).unwrap();
        assert_eq!(record.status, SubmissionStatus::Confirmed);
    }
    assert_eq!(ledger.get_statistics().confirmed, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_devices_same_voter_confirm_once() {
    let ctx = Arc::new(TestContext::new(vec![]));

    let mut set = JoinSet::new();
    for _ in 0..2 {
        let ctx = ctx.clone();
        set.spawn(async move {
            let (machine, code) = ctx.prepared("voter-1").await;
            ctx.service
                .cast_vote(&ctx.election, "cand-a", &machine, &code)
                .await
        });
    }

    let mut successes = 0;
    while let Some(joined) = set.join_next().await {
        let result = joined.unwrap();
        if result.success {
            successes += 1;
        } else {
            // Depending on timing the loser trips the ledger or the cooldown
            let error = result.error.unwrap();
            assert!(
                error == "A vote for this election is already pending or confirmed"
                    || error == "Please wait before voting again",
                "unexpected error: {}",
                error
            );
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(ctx.service.ledger().get_statistics().confirmed, 1);
    assert!(ctx.service.get_voting_progress(&ctx.election).user_voted);
}
