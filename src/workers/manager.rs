// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{ReclaimSettings, WorkerSettings};
use crate::queue::task_ledger::TaskLedger;
use crate::workers::claim_worker::ClaimWorker;
use crate::workers::handler::TaskHandler;
use crate::workers::reclaim_worker::ReclaimWorker;
use crate::workers::worker::Worker;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 启动认领工作器与回收工作器，并在收到关闭信号时终止它们
pub struct WorkerManager<L>
where
    L: TaskLedger + 'static,
{
    ledger: Arc<L>,
    handles: Vec<JoinHandle<()>>,
}

impl<L> WorkerManager<L>
where
    L: TaskLedger + 'static,
{
    pub fn new(ledger: Arc<L>) -> Self {
        Self {
            ledger,
            handles: Vec::new(),
        }
    }

    /// 启动任意工作器
    pub fn spawn<W: Worker>(&mut self, worker: Arc<W>) {
        info!(worker = worker.name(), "Starting worker");
        self.handles.push(worker.spawn());
    }

    /// 启动认领工作器
    ///
    /// 多于一个工作器时，消费者标识追加序号以区分各自的认领
    ///
    /// # 参数
    ///
    /// * `handler` - 任务处理器
    /// * `settings` - 工作器配置
    pub fn start_claim_workers<H>(&mut self, handler: Arc<H>, settings: &WorkerSettings)
    where
        H: TaskHandler + 'static,
    {
        let base_id = settings.resolve_consumer_id();
        for index in 0..settings.count {
            let consumer_id = if settings.count > 1 {
                format!("{}-{}", base_id, index)
            } else {
                base_id.clone()
            };
            let worker = ClaimWorker::new(self.ledger.clone(), handler.clone(), consumer_id)
                .with_batch_size(settings.batch_size)
                .with_poll_interval(settings.poll_interval())
                .with_cancel_watch_interval(settings.cancel_watch_interval());
            self.spawn(Arc::new(worker));
        }
    }

    /// 按配置启动回收工作器
    pub fn start_reclaim_worker(&mut self, settings: &ReclaimSettings) {
        if !settings.enabled {
            info!("Stale claim reclaim disabled");
            return;
        }
        let worker = ReclaimWorker::new(self.ledger.clone(), settings.lease(), settings.interval());
        self.spawn(Arc::new(worker));
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// 终止所有工作器
    pub fn shutdown(&mut self) {
        info!("Shutting down workers...");
        for handle in self.handles.drain(..) {
            handle.abort();
        }
        info!("Workers shut down successfully");
    }

    /// 等待关闭信号并关闭工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        self.shutdown();
    }
}
