// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::eligibility::Eligibility;
use crate::domain::models::task::{DoneOutput, DraftStatus, Task};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 任务仓库特质
///
/// 定义待办表的数据访问接口。每个方法都是一条原子语句或一个事务，
/// 不做重试。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError>;
    /// 以跳过已锁定行的方式认领一批符合资格的任务
    async fn claim_batch(
        &self,
        eligibility: &Eligibility,
        limit: u64,
        consumer: &str,
    ) -> Result<Vec<Task>, RepositoryError>;
    /// 查找同一流程实例中早于 `before` 的最近一个任务的输出
    async fn find_previous_output(
        &self,
        proc_inst_id: &str,
        before: DateTime<FixedOffset>,
    ) -> Result<Option<serde_json::Value>, RepositoryError>;
    /// 查找流程实例中所有已完成且有输出的任务，按 `start_date` 降序
    async fn find_done_outputs(
        &self,
        proc_inst_id: &str,
    ) -> Result<Vec<DoneOutput>, RepositoryError>;
    /// 写入结果并释放所有权，返回受影响行数
    async fn mark_completed(
        &self,
        id: Uuid,
        payload: serde_json::Value,
    ) -> Result<u64, RepositoryError>;
    /// 仅当任务仍由 `consumer` 持有时写入结果
    async fn mark_completed_by(
        &self,
        id: Uuid,
        consumer: &str,
        payload: serde_json::Value,
    ) -> Result<u64, RepositoryError>;
    /// 标记任务处理失败并释放所有权
    async fn mark_failed(&self, id: Uuid) -> Result<u64, RepositoryError>;
    /// 仅当任务仍由 `consumer` 持有时标记失败
    async fn mark_failed_by(&self, id: Uuid, consumer: &str) -> Result<u64, RepositoryError>;
    /// 读取认领状态
    async fn find_draft_status(&self, id: Uuid) -> Result<Option<DraftStatus>, RepositoryError>;
    /// 释放超过租约时长仍处于 Started 的认领
    async fn release_stale_claims(
        &self,
        lease: chrono::Duration,
    ) -> Result<u64, RepositoryError>;
}
