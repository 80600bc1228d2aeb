// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::task::{DraftStatus, Task};
use crate::domain::repositories::task_repository::RepositoryError;
use crate::queue::task_ledger::{LedgerError, TaskLedger};
use crate::utils::errors::WorkerError;
use crate::utils::retry_policy::RetryPolicy;
use crate::workers::handler::{TaskContext, TaskHandler};
use crate::workers::worker::Worker;

/// 单个任务的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// 结果已写入
    Completed,
    /// 处理器失败，任务已标记为 FAILED
    Failed,
    /// 处理期间认领状态被外部改为 CANCELLED / FB_REQUESTED，或任务已被删除
    Aborted(Option<DraftStatus>),
    /// 处理结束时任务已不再由本消费者持有，结果或失败状态都不写入
    Lost,
}

/// 取消状态检查的最小间隔
const MIN_WATCH_INTERVAL: Duration = Duration::from_millis(10);

/// 认领工作器
///
/// 循环认领一批任务，为每个任务准备前序输出后交给处理器执行，
/// 并根据结果完成或标记失败。
pub struct ClaimWorker<L, H>
where
    L: TaskLedger + 'static,
    H: TaskHandler + 'static,
{
    ledger: Arc<L>,
    handler: Arc<H>,
    consumer_id: String,
    batch_size: u64,
    poll_interval: Duration,
    cancel_watch_interval: Duration,
    retry_policy: RetryPolicy,
}

impl<L, H> ClaimWorker<L, H>
where
    L: TaskLedger + 'static,
    H: TaskHandler + 'static,
{
    /// 创建新的认领工作器实例
    pub fn new(ledger: Arc<L>, handler: Arc<H>, consumer_id: impl Into<String>) -> Self {
        Self {
            ledger,
            handler,
            consumer_id: consumer_id.into(),
            batch_size: 1,
            poll_interval: Duration::from_secs(7),
            cancel_watch_interval: Duration::from_secs(5),
            retry_policy: RetryPolicy::standard(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_cancel_watch_interval(mut self, interval: Duration) -> Self {
        self.cancel_watch_interval = interval.max(MIN_WATCH_INTERVAL);
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    /// 认领并处理一批任务
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<TaskOutcome>)` - 每个已认领任务的处理结果，为空表示没有可认领的任务
    /// * `Err(WorkerError)` - 认领在重试后仍然失败
    pub async fn run_once(&self) -> Result<Vec<TaskOutcome>, WorkerError> {
        let tasks = self.claim_with_retry().await?;

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let task_id = task.id;
            match self.process_task(task).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    // 任务保持 STARTED，由回收工作器在租约过期后释放
                    error!(%task_id, "Task left claimed after storage error: {}", e);
                }
            }
        }

        Ok(outcomes)
    }

    async fn claim_with_retry(&self) -> Result<Vec<Task>, WorkerError> {
        let mut attempt = 0;
        loop {
            match self.ledger.claim(self.batch_size, &self.consumer_id).await {
                Ok(tasks) => return Ok(tasks),
                Err(e) => {
                    attempt += 1;
                    if !self.retry_policy.should_retry(attempt) {
                        return Err(e.into());
                    }
                    let delay = self.retry_policy.calculate_backoff(attempt);
                    warn!(
                        attempt,
                        max = self.retry_policy.max_retries,
                        "Claim failed, retrying in {:?}: {}",
                        delay,
                        e
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn build_context(&self, task: Task) -> Result<TaskContext, LedgerError> {
        let previous_output = self
            .ledger
            .read_previous_output(&task.proc_inst_id, task.start_date)
            .await?;
        let done_outputs = self.ledger.read_done_map(&task.proc_inst_id).await?;

        Ok(TaskContext {
            task,
            previous_output,
            done_outputs,
        })
    }

    #[instrument(
        skip(self, task),
        fields(task_id = %task.id, proc_inst_id = %task.proc_inst_id, activity = %task.activity_name)
    )]
    async fn process_task(&self, task: Task) -> Result<TaskOutcome, WorkerError> {
        info!("Processing task");
        let task_id = task.id;

        let ctx = self.build_context(task).await?;

        let result = tokio::select! {
            result = self.handler.handle(ctx) => result,
            status = self.watch_cancellation(task_id) => {
                info!(?status, "Task withdrawn while processing, dropping handler");
                return Ok(TaskOutcome::Aborted(status));
            }
        };

        match result {
            Ok(payload) => {
                let affected = self
                    .ledger
                    .complete_owned(task_id, &self.consumer_id, payload)
                    .await?;
                if affected == 0 {
                    warn!("Task no longer owned by this consumer, result discarded");
                    return Ok(TaskOutcome::Lost);
                }
                info!("Task completed");
                Ok(TaskOutcome::Completed)
            }
            Err(e) => {
                error!("Task handler failed: {}", e);
                let affected = self.ledger.fail_owned(task_id, &self.consumer_id).await?;
                if affected == 0 {
                    warn!("Task no longer owned by this consumer, failure not recorded");
                    return Ok(TaskOutcome::Lost);
                }
                Ok(TaskOutcome::Failed)
            }
        }
    }

    /// 周期性检查认领状态，直到任务被外部撤回
    ///
    /// 返回 `None` 表示任务记录已不存在。
    /// 读取失败只记录警告，下一个间隔继续检查，不会因此放弃任务。
    async fn watch_cancellation(&self, task_id: Uuid) -> Option<DraftStatus> {
        loop {
            sleep(self.cancel_watch_interval).await;

            match self.ledger.draft_status(task_id).await {
                Ok(Some(status)) if status.aborts_processing() => return Some(status),
                Ok(_) => {}
                Err(LedgerError::Repository(RepositoryError::NotFound)) => return None,
                Err(e) => warn!(%task_id, "Failed to check draft status: {}", e),
            }
        }
    }
}

#[async_trait]
impl<L, H> Worker for ClaimWorker<L, H>
where
    L: TaskLedger + 'static,
    H: TaskHandler + 'static,
{
    async fn run(&self) -> Result<(), WorkerError> {
        info!(consumer = %self.consumer_id, batch = self.batch_size, "Claim worker started");

        loop {
            match self.run_once().await {
                Ok(outcomes) => {
                    if outcomes.is_empty() {
                        sleep(self.poll_interval).await;
                    }
                }
                Err(e) => {
                    error!("Error claiming tasks: {}", e);
                    sleep(self.poll_interval).await;
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.consumer_id
    }
}

#[cfg(test)]
#[path = "claim_worker_test.rs"]
mod tests;
