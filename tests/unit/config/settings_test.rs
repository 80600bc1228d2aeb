// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置加载测试
///
/// 验证文件与环境变量的分层覆盖
#[cfg(test)]
mod tests {
    use task_ledger::config::settings::Settings;

    #[test]
    fn test_settings_load_with_env_overrides() {
        let settings = Settings::new().unwrap();
        assert!(!settings.database.url.is_empty(), "Database URL must be configured");
        assert!(settings.worker.batch_size >= 1);
        assert!(!settings.ledger.agent_modes.is_empty());

        std::env::set_var("TASK_LEDGER__WORKER__BATCH_SIZE", "4");
        std::env::set_var("TASK_LEDGER__LEDGER__AGENT_MODES", "DRAFT,REVIEW");
        std::env::set_var("TASK_LEDGER__RECLAIM__ENABLED", "false");

        let settings = Settings::new();

        std::env::remove_var("TASK_LEDGER__WORKER__BATCH_SIZE");
        std::env::remove_var("TASK_LEDGER__LEDGER__AGENT_MODES");
        std::env::remove_var("TASK_LEDGER__RECLAIM__ENABLED");

        let settings = settings.unwrap();
        assert_eq!(settings.worker.batch_size, 4);
        assert_eq!(settings.ledger.agent_modes, vec!["DRAFT", "REVIEW"]);
        assert!(!settings.reclaim.enabled);
    }
}
