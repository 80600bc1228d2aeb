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
use task_ledger::config::settings::Settings;
use task_ledger::infrastructure::database::connection;
use task_ledger::infrastructure::metrics;
use task_ledger::infrastructure::repositories::task_repo_impl::TaskRepositoryImpl;
use task_ledger::queue::task_ledger::SqlTaskLedger;
use task_ledger::utils::telemetry;
use task_ledger::workers::manager::WorkerManager;
use tracing::info;

/// 主函数
///
/// 账本维护进程：应用迁移并运行过期认领回收。
/// 任务执行由嵌入 `ClaimWorker` 的调用方进程负责。
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting task-ledger...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Connect to database and run migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);

    // 4. Initialize ledger
    let task_repo = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let ledger = Arc::new(SqlTaskLedger::new(task_repo, settings.ledger.eligibility()));
    info!(
        agent_modes = ?ledger.eligibility().agent_modes,
        agent_orch = %ledger.eligibility().agent_orch,
        "Ledger eligibility"
    );

    // 5. Start workers
    let mut worker_manager = WorkerManager::new(ledger);
    worker_manager.start_reclaim_worker(&settings.reclaim);
    info!("{} worker(s) running", worker_manager.worker_count());

    worker_manager.wait_for_shutdown().await;

    Ok(())
}
