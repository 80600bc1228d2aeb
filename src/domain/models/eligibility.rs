// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Deserialize;

/// 认领资格谓词
///
/// 除 `status = IN_PROGRESS` 与 `draft_status IS NULL` 外，
/// 任务还必须匹配此处的模式与编排标签才能被认领。
/// 每个账本实例持有一份固定的谓词，需要不同资格集合时应创建新的账本实例。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Eligibility {
    /// 允许的 `agent_mode` 取值
    pub agent_modes: Vec<String>,
    /// 要求的 `agent_orch` 取值
    pub agent_orch: String,
}

impl Eligibility {
    pub fn new<I, S>(agent_modes: I, agent_orch: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            agent_modes: agent_modes.into_iter().map(Into::into).collect(),
            agent_orch: agent_orch.into(),
        }
    }
}

impl Default for Eligibility {
    fn default() -> Self {
        Self::new(["DRAFT", "COMPLETE"], "crewai-action")
    }
}
