// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::eligibility::Eligibility;
use crate::domain::models::task::{DoneOutput, DraftStatus, Task};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use metrics::counter;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// 账本错误类型
#[derive(Error, Debug)]
pub enum LedgerError {
    /// 仓库错误，原样透传给调用方
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
    /// 消费者标识为空
    #[error("Consumer id must not be empty")]
    EmptyConsumer,
}

/// 任务账本特质
///
/// 认领、链式读取、完成集合读取与完成四个核心操作，
/// 以及工作器需要的辅助操作。所有操作都是单个原子事务，不做内部重试。
#[async_trait]
pub trait TaskLedger: Send + Sync {
    /// 认领至多 `limit` 个符合资格的任务
    async fn claim(&self, limit: u64, consumer: &str) -> Result<Vec<Task>, LedgerError>;

    /// 读取同一流程实例中早于 `before` 的最近一步的输出
    async fn read_previous_output(
        &self,
        proc_inst_id: &str,
        before: DateTime<FixedOffset>,
    ) -> Result<Option<Value>, LedgerError>;

    /// 读取流程实例的完成集合，最近的在前
    async fn read_done_set(&self, proc_inst_id: &str) -> Result<Vec<DoneOutput>, LedgerError>;

    /// 写入结果并释放所有权，返回受影响行数
    async fn complete(&self, task_id: Uuid, payload: Value) -> Result<u64, LedgerError>;

    /// 仅当 `consumer` 仍持有任务时写入结果
    async fn complete_owned(
        &self,
        task_id: Uuid,
        consumer: &str,
        payload: Value,
    ) -> Result<u64, LedgerError>;

    /// 标记任务失败
    async fn fail(&self, task_id: Uuid) -> Result<u64, LedgerError>;

    /// 仅当 `consumer` 仍持有任务时标记失败
    async fn fail_owned(&self, task_id: Uuid, consumer: &str) -> Result<u64, LedgerError>;

    /// 读取认领状态
    async fn draft_status(&self, task_id: Uuid) -> Result<Option<DraftStatus>, LedgerError>;

    /// 释放超过租约的认领
    async fn release_stale_claims(&self, lease: chrono::Duration) -> Result<u64, LedgerError>;

    /// 以步骤名为键读取完成集合
    ///
    /// 同名步骤以最近一次的输出为准。
    async fn read_done_map(&self, proc_inst_id: &str) -> Result<Map<String, Value>, LedgerError> {
        let done = self.read_done_set(proc_inst_id).await?;
        let mut map = Map::new();
        for entry in done {
            map.entry(entry.activity_name).or_insert(entry.output);
        }
        Ok(map)
    }
}

/// 基于关系数据库的任务账本
///
/// 持有固定的认领资格谓词，不同资格集合需要不同的实例。
pub struct SqlTaskLedger<R: TaskRepository> {
    /// 任务仓库
    repository: Arc<R>,
    /// 认领资格
    eligibility: Eligibility,
}

impl<R: TaskRepository> SqlTaskLedger<R> {
    /// 创建新的任务账本实例
    ///
    /// # 参数
    ///
    /// * `repository` - 任务仓库
    /// * `eligibility` - 本实例固定的认领资格
    pub fn new(repository: Arc<R>, eligibility: Eligibility) -> Self {
        Self {
            repository,
            eligibility,
        }
    }

    pub fn eligibility(&self) -> &Eligibility {
        &self.eligibility
    }
}

#[async_trait]
impl<R: TaskRepository> TaskLedger for SqlTaskLedger<R> {
    /// 认领任务
    ///
    /// # 参数
    ///
    /// * `limit` - 本次最多认领的任务数，为0时直接返回空
    /// * `consumer` - 消费者标识
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<Task>)` - 已认领的任务，按 `start_date` 升序；可能少于 `limit`
    /// * `Err(LedgerError)` - 存储错误，或消费者标识为空
    async fn claim(&self, limit: u64, consumer: &str) -> Result<Vec<Task>, LedgerError> {
        if consumer.trim().is_empty() {
            return Err(LedgerError::EmptyConsumer);
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let tasks = self
            .repository
            .claim_batch(&self.eligibility, limit, consumer)
            .await?;

        debug!(consumer, limit, claimed = tasks.len(), "claim finished");
        counter!("ledger_tasks_claimed_total").increment(tasks.len() as u64);
        Ok(tasks)
    }

    async fn read_previous_output(
        &self,
        proc_inst_id: &str,
        before: DateTime<FixedOffset>,
    ) -> Result<Option<Value>, LedgerError> {
        let output = self
            .repository
            .find_previous_output(proc_inst_id, before)
            .await?;
        Ok(output)
    }

    async fn read_done_set(&self, proc_inst_id: &str) -> Result<Vec<DoneOutput>, LedgerError> {
        let done = self.repository.find_done_outputs(proc_inst_id).await?;
        Ok(done)
    }

    /// 完成任务
    ///
    /// 不校验调用方是否为当前持有者；未知ID返回0而不是错误。
    async fn complete(&self, task_id: Uuid, payload: Value) -> Result<u64, LedgerError> {
        let affected = self.repository.mark_completed(task_id, payload).await?;

        debug!(%task_id, affected, "task completed");
        counter!("ledger_tasks_completed_total").increment(affected);
        Ok(affected)
    }

    async fn complete_owned(
        &self,
        task_id: Uuid,
        consumer: &str,
        payload: Value,
    ) -> Result<u64, LedgerError> {
        let affected = self
            .repository
            .mark_completed_by(task_id, consumer, payload)
            .await?;

        debug!(%task_id, consumer, affected, "owned task completed");
        counter!("ledger_tasks_completed_total").increment(affected);
        Ok(affected)
    }

    async fn fail(&self, task_id: Uuid) -> Result<u64, LedgerError> {
        let affected = self.repository.mark_failed(task_id).await?;

        debug!(%task_id, affected, "task failed");
        counter!("ledger_tasks_failed_total").increment(affected);
        Ok(affected)
    }

    async fn fail_owned(&self, task_id: Uuid, consumer: &str) -> Result<u64, LedgerError> {
        let affected = self.repository.mark_failed_by(task_id, consumer).await?;

        debug!(%task_id, consumer, affected, "owned task failed");
        counter!("ledger_tasks_failed_total").increment(affected);
        Ok(affected)
    }

    async fn draft_status(&self, task_id: Uuid) -> Result<Option<DraftStatus>, LedgerError> {
        let status = self.repository.find_draft_status(task_id).await?;
        Ok(status)
    }

    async fn release_stale_claims(&self, lease: chrono::Duration) -> Result<u64, LedgerError> {
        let released = self.repository.release_stale_claims(lease).await?;

        counter!("ledger_claims_released_total").increment(released);
        Ok(released)
    }
}

#[async_trait]
impl<T: TaskLedger + ?Sized> TaskLedger for Arc<T> {
    async fn claim(&self, limit: u64, consumer: &str) -> Result<Vec<Task>, LedgerError> {
        (**self).claim(limit, consumer).await
    }

    async fn read_previous_output(
        &self,
        proc_inst_id: &str,
        before: DateTime<FixedOffset>,
    ) -> Result<Option<Value>, LedgerError> {
        (**self).read_previous_output(proc_inst_id, before).await
    }

    async fn read_done_set(&self, proc_inst_id: &str) -> Result<Vec<DoneOutput>, LedgerError> {
        (**self).read_done_set(proc_inst_id).await
    }

    async fn complete(&self, task_id: Uuid, payload: Value) -> Result<u64, LedgerError> {
        (**self).complete(task_id, payload).await
    }

    async fn complete_owned(
        &self,
        task_id: Uuid,
        consumer: &str,
        payload: Value,
    ) -> Result<u64, LedgerError> {
        (**self).complete_owned(task_id, consumer, payload).await
    }

    async fn fail(&self, task_id: Uuid) -> Result<u64, LedgerError> {
        (**self).fail(task_id).await
    }

    async fn fail_owned(&self, task_id: Uuid, consumer: &str) -> Result<u64, LedgerError> {
        (**self).fail_owned(task_id, consumer).await
    }

    async fn draft_status(&self, task_id: Uuid) -> Result<Option<DraftStatus>, LedgerError> {
        (**self).draft_status(task_id).await
    }

    async fn release_stale_claims(&self, lease: chrono::Duration) -> Result<u64, LedgerError> {
        (**self).release_stale_claims(lease).await
    }
}

#[cfg(test)]
#[path = "task_ledger_test.rs"]
mod tests;
