// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::queue::task_ledger::TaskLedger;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// 过期认领回收工作器
///
/// 认领后崩溃的消费者会让任务永久停留在 STARTED。
/// 此工作器定期把超过租约时长的认领退回未认领状态。
pub struct ReclaimWorker<L>
where
    L: TaskLedger + 'static,
{
    ledger: Arc<L>,
    lease: chrono::Duration,
    interval: Duration,
}

impl<L> ReclaimWorker<L>
where
    L: TaskLedger + 'static,
{
    pub fn new(ledger: Arc<L>, lease: chrono::Duration, interval: Duration) -> Self {
        Self {
            ledger,
            lease,
            interval,
        }
    }

    /// 执行一次回收，返回释放的认领数
    pub async fn release_once(&self) -> Result<u64, WorkerError> {
        let released = self.ledger.release_stale_claims(self.lease).await?;
        Ok(released)
    }
}

#[async_trait]
impl<L> Worker for ReclaimWorker<L>
where
    L: TaskLedger + 'static,
{
    async fn run(&self) -> Result<(), WorkerError> {
        info!(
            lease_secs = self.lease.num_seconds(),
            "Stale claim reclaim worker started"
        );

        // tokio 的 interval 不接受零周期
        let mut interval = tokio::time::interval(self.interval.max(Duration::from_millis(1)));

        loop {
            interval.tick().await;

            match self.release_once().await {
                Ok(count) => {
                    if count > 0 {
                        info!("Released {} stale claims", count);
                    }
                }
                Err(e) => {
                    error!("Failed to release stale claims: {}", e);
                }
            }
        }
    }

    fn name(&self) -> &str {
        "reclaim"
    }
}

#[cfg(test)]
#[path = "reclaim_worker_test.rs"]
mod tests;
