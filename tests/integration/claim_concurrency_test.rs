// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{create_test_ledger, seed_task};
use futures::future::join_all;
use sea_orm::{EntityTrait, QuerySelect, TransactionTrait};
use std::collections::HashSet;
use std::time::Duration;
use task_ledger::domain::models::task::DraftStatus;
use task_ledger::domain::repositories::task_repository::TaskRepository;
use task_ledger::infrastructure::database::entities::todolist;
use task_ledger::queue::task_ledger::TaskLedger;
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires docker"]
async fn test_concurrent_claims_never_overlap() {
    let app = create_test_ledger().await;
    for start in 0..60 {
        seed_task(&app.repo, &format!("proc-{}", start % 7), start).await;
    }

    let claimers = (0..8).map(|n| {
        let ledger = app.ledger.clone();
        tokio::spawn(async move {
            let consumer = format!("worker-{}", n);
            let mut mine = Vec::new();
            loop {
                let batch = ledger.claim(3, &consumer).await.unwrap();
                if batch.is_empty() {
                    break;
                }
                for task in batch {
                    assert_eq!(task.consumer.as_deref(), Some(consumer.as_str()));
                    mine.push(task.id);
                }
            }
            mine
        })
    });

    let results = join_all(claimers).await;
    let all: Vec<Uuid> = results
        .into_iter()
        .flat_map(|r| r.expect("claimer panicked"))
        .collect();
    let unique: HashSet<Uuid> = all.iter().copied().collect();

    assert_eq!(all.len(), 60, "every task claimed exactly once");
    assert_eq!(unique.len(), 60);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_claim_skips_row_locked_by_another_transaction() {
    let app = create_test_ledger().await;
    let t1 = seed_task(&app.repo, "proc-1", 10).await;
    let t2 = seed_task(&app.repo, "proc-1", 20).await;

    // worker-A holds t1's row lock mid-claim
    let txn = app.db.begin().await.unwrap();
    todolist::Entity::find_by_id(t1.id)
        .lock_exclusive()
        .one(&txn)
        .await
        .unwrap()
        .expect("t1 exists");

    let claimed = tokio::time::timeout(Duration::from_secs(5), app.ledger.claim(1, "worker-B"))
        .await
        .expect("claim must not wait on a locked row")
        .unwrap();

    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, t2.id);
    assert_eq!(claimed[0].consumer.as_deref(), Some("worker-B"));

    txn.commit().await.unwrap();

    let stored = app.repo.find_by_id(t1.id).await.unwrap().unwrap();
    assert_eq!(stored.draft_status, None);

    let claimed = app.ledger.claim(1, "worker-A").await.unwrap();
    assert_eq!(claimed[0].id, t1.id);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_claim_order_is_oldest_first() {
    let app = create_test_ledger().await;
    let t3 = seed_task(&app.repo, "proc-1", 30).await;
    let t1 = seed_task(&app.repo, "proc-2", 10).await;
    let t2 = seed_task(&app.repo, "proc-3", 20).await;

    let claimed = app.ledger.claim(2, "worker-A").await.unwrap();
    let ids: Vec<Uuid> = claimed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![t1.id, t2.id]);
    assert!(claimed
        .iter()
        .all(|t| t.draft_status == Some(DraftStatus::Started)));

    let claimed = app.ledger.claim(2, "worker-B").await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].id, t3.id);
}
