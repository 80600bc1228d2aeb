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

use crate::domain::models::eligibility::Eligibility;
use crate::domain::models::task::{DoneOutput, DraftStatus, Task, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::infrastructure::database::entities::todolist;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, LockBehavior, LockType},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的待办表数据访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<todolist::Model> for Task {
    fn from(model: todolist::Model) -> Self {
        Self {
            id: model.id,
            proc_inst_id: model.proc_inst_id,
            activity_name: model.activity_name,
            start_date: model.start_date,
            status: model.status.parse().unwrap_or_default(),
            draft_status: model.draft_status.and_then(|s| s.parse().ok()),
            consumer: model.consumer,
            agent_mode: model.agent_mode,
            agent_orch: model.agent_orch,
            output: model.output,
            claimed_at: model.claimed_at,
        }
    }
}

impl From<Task> for todolist::ActiveModel {
    fn from(task: Task) -> Self {
        Self {
            id: Set(task.id),
            proc_inst_id: Set(task.proc_inst_id),
            activity_name: Set(task.activity_name),
            start_date: Set(task.start_date),
            status: Set(task.status.to_string()),
            draft_status: Set(task.draft_status.map(|s| s.to_string())),
            consumer: Set(task.consumer),
            agent_mode: Set(task.agent_mode),
            agent_orch: Set(task.agent_orch),
            output: Set(task.output),
            claimed_at: Set(task.claimed_at),
        }
    }
}

/// 空输出（JSON null、空对象、空数组）不计入完成集合
fn has_content(output: &serde_json::Value) -> bool {
    match output {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, task: &Task) -> Result<Task, RepositoryError> {
        let model: todolist::ActiveModel = task.clone().into();

        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        let model = todolist::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.map(Into::into))
    }

    async fn claim_batch(
        &self,
        eligibility: &Eligibility,
        limit: u64,
        consumer: &str,
    ) -> Result<Vec<Task>, RepositoryError> {
        if limit == 0 || eligibility.agent_modes.is_empty() {
            return Ok(Vec::new());
        }

        let txn = self.db.begin().await?;

        // FOR UPDATE SKIP LOCKED: rows held by a concurrent claim are skipped, never awaited
        let ids: Vec<Uuid> = todolist::Entity::find()
            .select_only()
            .column(todolist::Column::Id)
            .filter(todolist::Column::Status.eq(TaskStatus::InProgress.to_string()))
            .filter(todolist::Column::DraftStatus.is_null())
            .filter(todolist::Column::AgentMode.is_in(eligibility.agent_modes.clone()))
            .filter(todolist::Column::AgentOrch.eq(eligibility.agent_orch.as_str()))
            .order_by_asc(todolist::Column::StartDate)
            .order_by_asc(todolist::Column::Id)
            .limit(limit)
            .lock_with_behavior(LockType::Update, LockBehavior::SkipLocked)
            .into_tuple()
            .all(&txn)
            .await?;

        if ids.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let claimed_at: DateTime<FixedOffset> = Utc::now().into();
        todolist::Entity::update_many()
            .col_expr(
                todolist::Column::DraftStatus,
                Expr::value(DraftStatus::Started.to_string()),
            )
            .col_expr(todolist::Column::Consumer, Expr::value(consumer.to_string()))
            .col_expr(todolist::Column::ClaimedAt, Expr::value(claimed_at))
            .filter(todolist::Column::Id.is_in(ids.clone()))
            .exec(&txn)
            .await?;

        let models = todolist::Entity::find()
            .filter(todolist::Column::Id.is_in(ids))
            .order_by_asc(todolist::Column::StartDate)
            .order_by_asc(todolist::Column::Id)
            .all(&txn)
            .await?;

        txn.commit().await?;

        Ok(models.into_iter().map(Task::from).collect())
    }

    async fn find_previous_output(
        &self,
        proc_inst_id: &str,
        before: DateTime<FixedOffset>,
    ) -> Result<Option<serde_json::Value>, RepositoryError> {
        let model = todolist::Entity::find()
            .filter(todolist::Column::ProcInstId.eq(proc_inst_id))
            .filter(todolist::Column::StartDate.lt(before))
            .order_by_desc(todolist::Column::StartDate)
            .order_by_desc(todolist::Column::Id)
            .one(self.db.as_ref())
            .await?;

        Ok(model.and_then(|m| m.output))
    }

    async fn find_done_outputs(
        &self,
        proc_inst_id: &str,
    ) -> Result<Vec<DoneOutput>, RepositoryError> {
        let models = todolist::Entity::find()
            .filter(todolist::Column::ProcInstId.eq(proc_inst_id))
            .filter(todolist::Column::Status.eq(TaskStatus::Done.to_string()))
            .filter(todolist::Column::Output.is_not_null())
            .order_by_desc(todolist::Column::StartDate)
            .order_by_desc(todolist::Column::Id)
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .filter_map(|m| {
                let output = m.output.filter(has_content)?;
                Some(DoneOutput {
                    activity_name: m.activity_name,
                    output,
                })
            })
            .collect())
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        payload: serde_json::Value,
    ) -> Result<u64, RepositoryError> {
        let result = todolist::Entity::update_many()
            .col_expr(todolist::Column::Output, Expr::value(payload))
            .col_expr(
                todolist::Column::Status,
                Expr::value(TaskStatus::Submitted.to_string()),
            )
            .col_expr(
                todolist::Column::DraftStatus,
                Expr::value(DraftStatus::Completed.to_string()),
            )
            .col_expr(todolist::Column::Consumer, Expr::value(Option::<String>::None))
            .filter(todolist::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn mark_completed_by(
        &self,
        id: Uuid,
        consumer: &str,
        payload: serde_json::Value,
    ) -> Result<u64, RepositoryError> {
        let result = todolist::Entity::update_many()
            .col_expr(todolist::Column::Output, Expr::value(payload))
            .col_expr(
                todolist::Column::Status,
                Expr::value(TaskStatus::Submitted.to_string()),
            )
            .col_expr(
                todolist::Column::DraftStatus,
                Expr::value(DraftStatus::Completed.to_string()),
            )
            .col_expr(todolist::Column::Consumer, Expr::value(Option::<String>::None))
            .filter(todolist::Column::Id.eq(id))
            .filter(todolist::Column::Consumer.eq(consumer))
            .filter(todolist::Column::DraftStatus.eq(DraftStatus::Started.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn mark_failed(&self, id: Uuid) -> Result<u64, RepositoryError> {
        let result = todolist::Entity::update_many()
            .col_expr(
                todolist::Column::DraftStatus,
                Expr::value(DraftStatus::Failed.to_string()),
            )
            .col_expr(todolist::Column::Consumer, Expr::value(Option::<String>::None))
            .filter(todolist::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn mark_failed_by(&self, id: Uuid, consumer: &str) -> Result<u64, RepositoryError> {
        let result = todolist::Entity::update_many()
            .col_expr(
                todolist::Column::DraftStatus,
                Expr::value(DraftStatus::Failed.to_string()),
            )
            .col_expr(todolist::Column::Consumer, Expr::value(Option::<String>::None))
            .filter(todolist::Column::Id.eq(id))
            .filter(todolist::Column::Consumer.eq(consumer))
            .filter(todolist::Column::DraftStatus.eq(DraftStatus::Started.to_string()))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    async fn find_draft_status(&self, id: Uuid) -> Result<Option<DraftStatus>, RepositoryError> {
        let draft_status: Option<String> = todolist::Entity::find_by_id(id)
            .select_only()
            .column(todolist::Column::DraftStatus)
            .into_tuple::<Option<String>>()
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(draft_status.and_then(|s| s.parse().ok()))
    }

    async fn release_stale_claims(
        &self,
        lease: chrono::Duration,
    ) -> Result<u64, RepositoryError> {
        let threshold: DateTime<FixedOffset> = (Utc::now() - lease).into();

        let result = todolist::Entity::update_many()
            .col_expr(
                todolist::Column::DraftStatus,
                Expr::value(Option::<String>::None),
            )
            .col_expr(todolist::Column::Consumer, Expr::value(Option::<String>::None))
            .col_expr(
                todolist::Column::ClaimedAt,
                Expr::value(Option::<DateTime<FixedOffset>>::None),
            )
            .filter(todolist::Column::DraftStatus.eq(DraftStatus::Started.to_string()))
            .filter(
                Condition::any()
                    .add(todolist::Column::ClaimedAt.lte(threshold))
                    .add(todolist::Column::ClaimedAt.is_null()),
            )
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[path = "task_repo_impl_test.rs"]
mod tests;
