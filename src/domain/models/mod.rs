// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 认领资格（eligibility）：账本实例固定的认领过滤条件
/// - 任务（task）：待办表中的单个工作单元及其认领状态
pub mod eligibility;
pub mod task;
