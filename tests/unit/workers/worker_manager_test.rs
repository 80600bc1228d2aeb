// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器管理器测试模块
///
/// 验证按配置启动的工作器数量与关闭行为
#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;
    use serde_json::Value;
    use std::sync::Arc;
    use task_ledger::config::settings::{ReclaimSettings, WorkerSettings};
    use task_ledger::domain::models::eligibility::Eligibility;
    use task_ledger::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
    use task_ledger::queue::task_ledger::SqlTaskLedger;
    use task_ledger::workers::handler::{HandlerError, TaskContext, TaskHandler};
    use task_ledger::workers::manager::WorkerManager;

    struct EchoHandler;

    #[async_trait]
    impl TaskHandler for EchoHandler {
        async fn handle(&self, ctx: TaskContext) -> Result<Value, HandlerError> {
            Ok(ctx.previous_output.unwrap_or(Value::Null))
        }
    }

    async fn manager() -> WorkerManager<SqlTaskLedger<TaskRepositoryImpl>> {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let repo = Arc::new(TaskRepositoryImpl::new(Arc::new(db)));
        WorkerManager::new(Arc::new(SqlTaskLedger::new(repo, Eligibility::default())))
    }

    fn worker_settings(count: usize) -> WorkerSettings {
        WorkerSettings {
            consumer_id: Some("test-host".to_string()),
            batch_size: 1,
            poll_interval: 60,
            count,
            cancel_watch_interval: 5,
        }
    }

    #[tokio::test]
    async fn test_starts_configured_number_of_workers() {
        let mut manager = manager().await;

        manager.start_claim_workers(Arc::new(EchoHandler), &worker_settings(3));
        assert_eq!(manager.worker_count(), 3);

        manager.start_reclaim_worker(&ReclaimSettings {
            enabled: true,
            lease_timeout: 1800,
            interval: 60,
        });
        assert_eq!(manager.worker_count(), 4);

        manager.shutdown();
        assert_eq!(manager.worker_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_reclaim_worker_is_not_started() {
        let mut manager = manager().await;

        manager.start_reclaim_worker(&ReclaimSettings {
            enabled: false,
            lease_timeout: 1800,
            interval: 60,
        });
        assert_eq!(manager.worker_count(), 0);
    }
}
