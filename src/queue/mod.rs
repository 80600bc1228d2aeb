// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供任务账本：基于待办表的认领、链式读取与完成操作
pub mod task_ledger;
