//! 可观测性与配置集成测试

mod metrics_tests {
    use memolucky_shared::observability::metrics::{
        get_handle, record_badge_evaluation, record_badge_grant, record_dispatch_deferred,
        record_dispatch_dropped,
    };

    #[test]
    fn test_record_without_recorder() {
        record_badge_evaluation("success", 0.004);
        record_badge_evaluation("failure", 0.2);
        record_badge_grant("night_owl");
        record_dispatch_dropped("closed");
        record_dispatch_deferred();

        // 未调用 init 时没有全局 handle
        assert!(get_handle().is_none());
    }
}

mod guard_tests {
    use memolucky_shared::observability::{ObservabilityConfig, ObservabilityGuard};

    #[test]
    fn test_empty_guard_drops_cleanly() {
        let guard = ObservabilityGuard::empty();
        drop(guard);
    }

    #[test]
    fn test_service_name_injection() {
        let config = ObservabilityConfig::default().with_service_name("achievement-service");
        assert_eq!(config.service_name, "achievement-service");
    }
}

mod config_tests {
    use memolucky_shared::config::{AppConfig, DispatchMode};

    #[test]
    fn test_load_without_files_uses_defaults() {
        // 不存在的目录：所有文件源都是可选的
        // SAFETY: 测试进程内只有此处修改该变量
        unsafe {
            std::env::set_var("CONFIG_DIR", "/nonexistent/memolucky-config");
        }
        let config = AppConfig::load("achievement-service").unwrap();

        assert_eq!(config.service_name, "achievement-service");
        assert_eq!(config.achievement.dispatch_mode, DispatchMode::Background);
        assert_eq!(config.achievement.workers, 4);
    }
}
