// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供认领-执行-汇报循环、过期认领回收与工作器管理
pub mod claim_worker;
pub mod handler;
pub mod manager;
pub mod reclaim_worker;
pub mod worker;

pub use worker::Worker;
