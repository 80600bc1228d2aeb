// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 后台工作器特质
///
/// 认领工作器与回收工作器都实现此特质，由 `WorkerManager` 统一启动
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// 运行工作器，正常情况下不会返回
    async fn run(&self) -> Result<(), WorkerError>;

    /// 获取工作器名称
    fn name(&self) -> &str;

    /// 在独立任务中运行，退出时记录原因
    fn spawn(self: Arc<Self>) -> JoinHandle<()>
    where
        Self: Sized,
    {
        tokio::spawn(async move {
            match self.run().await {
                Ok(()) => info!(worker = self.name(), "Worker stopped"),
                Err(e) => error!(worker = self.name(), "Worker exited with error: {}", e),
            }
        })
    }
}
