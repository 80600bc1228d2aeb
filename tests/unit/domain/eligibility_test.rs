// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use task_ledger::domain::models::eligibility::Eligibility;

#[test]
fn test_default_eligibility() {
    let eligibility = Eligibility::default();
    assert_eq!(eligibility.agent_modes, vec!["DRAFT", "COMPLETE"]);
    assert_eq!(eligibility.agent_orch, "crewai-action");
}

#[test]
fn test_new_collects_modes_in_order() {
    let modes = vec!["REVIEW".to_string(), "DRAFT".to_string()];
    let eligibility = Eligibility::new(modes, "langgraph");
    assert_eq!(eligibility.agent_modes, vec!["REVIEW", "DRAFT"]);
    assert_eq!(eligibility.agent_orch, "langgraph");
}
