// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::Task;
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// 任务处理器错误
#[derive(Error, Debug)]
pub enum HandlerError {
    /// 任务负载无法被处理器理解
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// 执行失败
    #[error("Execution failed: {0}")]
    Execution(String),
}

/// 任务执行上下文
///
/// 包含已认领的任务以及同一流程实例中前序步骤的输出
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// 已认领的任务
    pub task: Task,
    /// 紧邻的前一步输出
    pub previous_output: Option<Value>,
    /// 以步骤名为键的已完成输出
    pub done_outputs: Map<String, Value>,
}

/// 任务处理器特质
///
/// 将任务转换为可执行的工作单元不属于账本的职责，由调用方实现。
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// 执行任务并返回要写入的结果
    async fn handle(&self, ctx: TaskContext) -> Result<Value, HandlerError>;
}
