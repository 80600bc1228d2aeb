// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::{create_test_ledger, seed_task};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use task_ledger::domain::models::task::{DraftStatus, TaskStatus};
use task_ledger::domain::repositories::task_repository::TaskRepository;
use task_ledger::workers::claim_worker::{ClaimWorker, TaskOutcome};
use task_ledger::workers::handler::{HandlerError, TaskContext, TaskHandler};
use uuid::Uuid;

/// 记录每个任务被处理的次数
#[derive(Default)]
struct CountingHandler {
    calls: Mutex<HashMap<Uuid, usize>>,
}

#[async_trait]
impl TaskHandler for CountingHandler {
    async fn handle(&self, ctx: TaskContext) -> Result<Value, HandlerError> {
        *self.calls.lock().unwrap().entry(ctx.task.id).or_default() += 1;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        Ok(json!({ "activity": ctx.task.activity_name }))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires docker"]
async fn test_parallel_workers_process_each_task_once() {
    let app = create_test_ledger().await;
    let mut ids = Vec::new();
    for start in 0..24 {
        ids.push(seed_task(&app.repo, &format!("proc-{}", start % 4), start).await.id);
    }

    let handler = Arc::new(CountingHandler::default());
    let workers: Vec<_> = (0..4)
        .map(|n| {
            Arc::new(
                ClaimWorker::new(app.ledger.clone(), handler.clone(), format!("host-{}", n))
                    .with_batch_size(2),
            )
        })
        .collect();

    let runs = workers.iter().cloned().map(|worker| {
        tokio::spawn(async move {
            let mut outcomes = Vec::new();
            loop {
                let batch = worker.run_once().await.unwrap();
                if batch.is_empty() {
                    break;
                }
                outcomes.extend(batch);
            }
            outcomes
        })
    });

    let outcomes: Vec<TaskOutcome> = join_all(runs)
        .await
        .into_iter()
        .flat_map(|r| r.expect("worker panicked"))
        .collect();

    assert_eq!(outcomes.len(), 24);
    assert!(outcomes.iter().all(|o| *o == TaskOutcome::Completed));

    let calls = handler.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 24);
    assert!(calls.values().all(|&n| n == 1));

    for id in ids {
        let stored = app.repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::Submitted);
        assert_eq!(stored.draft_status, Some(DraftStatus::Completed));
        assert_eq!(stored.consumer, None);
        assert!(stored.output.is_some());
    }
}
