// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含任务记录、认领资格与仓库接口
pub mod domain;

/// 基础设施模块
///
/// 提供数据库连接、实体映射、仓库实现与指标导出
pub mod infrastructure;

/// 队列模块
///
/// 实现任务账本的认领、链式读取与完成操作
pub mod queue;

/// 工具模块
///
/// 提供错误类型、重试策略与日志初始化
pub mod utils;

/// 工作器模块
///
/// 实现认领工作器、过期认领回收与工作器管理
pub mod workers;
