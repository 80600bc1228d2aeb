// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{FixedOffset, TimeZone};
use task_ledger::domain::models::task::{DraftStatus, Task, TaskStatus};

#[test]
fn test_new_task_is_unclaimed() {
    // Given: 新创建的任务
    let task = Task::new("proc-1", "draft", "COMPLETE", "crewai-action");

    // Then: 处于可认领状态
    assert_eq!(task.status, TaskStatus::InProgress);
    assert_eq!(task.draft_status, None);
    assert_eq!(task.consumer, None);
    assert_eq!(task.claimed_at, None);
    assert_eq!(task.output, None);
}

#[test]
fn test_with_start_date_overrides_chain_position() {
    let start = FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 5, 1, 9, 30, 0)
        .unwrap();
    let task = Task::new("proc-1", "draft", "COMPLETE", "crewai-action").with_start_date(start);
    assert_eq!(task.start_date, start);
}

#[test]
fn test_status_string_forms() {
    assert_eq!(TaskStatus::InProgress.to_string(), "IN_PROGRESS");
    assert_eq!("SUBMITTED".parse::<TaskStatus>(), Ok(TaskStatus::Submitted));
    assert!("in_progress".parse::<TaskStatus>().is_err());

    assert_eq!(DraftStatus::FbRequested.to_string(), "FB_REQUESTED");
    assert_eq!("STARTED".parse::<DraftStatus>(), Ok(DraftStatus::Started));
}

#[test]
fn test_only_withdrawal_statuses_abort_processing() {
    assert!(DraftStatus::Cancelled.aborts_processing());
    assert!(DraftStatus::FbRequested.aborts_processing());
    assert!(!DraftStatus::Started.aborts_processing());
    assert!(!DraftStatus::Completed.aborts_processing());
    assert!(!DraftStatus::Failed.aborts_processing());
}
