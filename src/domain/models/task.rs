// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 任务记录
///
/// 表示待办表中的一行：一个工作单元及其认领与结果状态。
/// 同一 `proc_inst_id` 下的任务按 `start_date` 组成有序链。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 所属流程实例ID，共享此ID的任务构成一条执行链
    pub proc_inst_id: String,
    /// 流程实例中的步骤名称
    pub activity_name: String,
    /// 链排序键，同时也是认领优先级（越早越优先）
    pub start_date: DateTime<FixedOffset>,
    /// 粗粒度生命周期状态
    pub status: TaskStatus,
    /// 认领生命周期状态，`None` 表示未认领
    pub draft_status: Option<DraftStatus>,
    /// 当前持有该任务的消费者标识
    pub consumer: Option<String>,
    /// 处理模式标签
    pub agent_mode: String,
    /// 编排管线标签
    pub agent_orch: String,
    /// 完成时写入的结果
    pub output: Option<serde_json::Value>,
    /// 最近一次认领时间
    pub claimed_at: Option<DateTime<FixedOffset>>,
}

/// 任务状态枚举
///
/// 由外部编排方设置，`Submitted` 由完成操作写入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// 待办
    #[default]
    Todo,
    /// 进行中，只有此状态的任务可被认领
    InProgress,
    /// 等待中
    Pending,
    /// 已完成，出现在完成集合中
    Done,
    /// 已提交，完成操作写入的终态
    Submitted,
    /// 已取消
    Cancelled,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "TODO"),
            TaskStatus::InProgress => write!(f, "IN_PROGRESS"),
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::Done => write!(f, "DONE"),
            TaskStatus::Submitted => write!(f, "SUBMITTED"),
            TaskStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TODO" => Ok(TaskStatus::Todo),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "PENDING" => Ok(TaskStatus::Pending),
            "DONE" => Ok(TaskStatus::Done),
            "SUBMITTED" => Ok(TaskStatus::Submitted),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// 认领状态枚举
///
/// 状态转换遵循以下流程：
/// (未认领) → Started → Completed/Failed
///
/// `Cancelled` 与 `FbRequested` 由外部写入，处理中的工作器检测到后会放弃当前任务。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    /// 已认领，处理中
    Started,
    /// 结果已写入
    Completed,
    /// 处理失败
    Failed,
    /// 已被外部取消
    Cancelled,
    /// 外部请求反馈，当前结果作废
    FbRequested,
}

impl DraftStatus {
    /// 是否要求正在处理的工作器中止
    pub fn aborts_processing(&self) -> bool {
        matches!(self, DraftStatus::Cancelled | DraftStatus::FbRequested)
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DraftStatus::Started => write!(f, "STARTED"),
            DraftStatus::Completed => write!(f, "COMPLETED"),
            DraftStatus::Failed => write!(f, "FAILED"),
            DraftStatus::Cancelled => write!(f, "CANCELLED"),
            DraftStatus::FbRequested => write!(f, "FB_REQUESTED"),
        }
    }
}

impl FromStr for DraftStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTED" => Ok(DraftStatus::Started),
            "COMPLETED" => Ok(DraftStatus::Completed),
            "FAILED" => Ok(DraftStatus::Failed),
            "CANCELLED" => Ok(DraftStatus::Cancelled),
            "FB_REQUESTED" => Ok(DraftStatus::FbRequested),
            _ => Err(()),
        }
    }
}

/// 已完成步骤的输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoneOutput {
    /// 步骤名称
    pub activity_name: String,
    /// 步骤输出
    pub output: serde_json::Value,
}

impl Task {
    /// 创建一个新的可认领任务
    ///
    /// # 参数
    ///
    /// * `proc_inst_id` - 流程实例ID
    /// * `activity_name` - 步骤名称
    /// * `agent_mode` - 处理模式标签
    /// * `agent_orch` - 编排管线标签
    ///
    /// # 返回值
    ///
    /// 返回状态为 `InProgress`、未认领的任务实例
    pub fn new(
        proc_inst_id: impl Into<String>,
        activity_name: impl Into<String>,
        agent_mode: impl Into<String>,
        agent_orch: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            proc_inst_id: proc_inst_id.into(),
            activity_name: activity_name.into(),
            start_date: Utc::now().into(),
            status: TaskStatus::InProgress,
            draft_status: None,
            consumer: None,
            agent_mode: agent_mode.into(),
            agent_orch: agent_orch.into(),
            output: None,
            claimed_at: None,
        }
    }

    /// 设置链排序时间
    pub fn with_start_date(mut self, start_date: DateTime<FixedOffset>) -> Self {
        self.start_date = start_date;
        self
    }
}
