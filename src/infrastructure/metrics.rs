// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 未启用时计数器调用为空操作
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", settings.listen_addr, e);
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_counter!("ledger_tasks_claimed_total", "Total number of tasks claimed");
    describe_counter!(
        "ledger_tasks_completed_total",
        "Total number of tasks completed"
    );
    describe_counter!("ledger_tasks_failed_total", "Total number of tasks failed");
    describe_counter!(
        "ledger_claims_released_total",
        "Total number of stale claims released"
    );

    info!("Metrics exporter listening on {}", addr);
}
