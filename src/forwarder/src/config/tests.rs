#[cfg(test)]
mod tests {
    use crate::config::{Config, ConfigError, ConfigLoader, Protocol};
    use rstest::rstest;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_KEYS: &[&str] = &[
        "INSIGHTS_ACCOUNT_ID",
        "INSIGHTS_INSERT_KEY",
        "INSIGHTS_BATCH_MAX_EVENTS",
        "INSIGHTS_TAGS",
        "INSIGHTS_EVENT_TYPE",
        "INSIGHTS_BATCH_ENABLED",
        "INSIGHTS_BATCH_TIMEOUT_SECONDS",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::new("284929", "insert-key");

        assert!(config.validate().is_ok());
        assert_eq!(config.event_type, "logstashEvent");
        assert_eq!(config.protocol, Protocol::Https);
        assert!(config.batch_enabled);
        assert_eq!(config.batch_max_events, 10);
        assert_eq!(config.batch_timeout_seconds, 5.0);
        assert!(!config.accept_invalid_certs);
        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://insights-collector.newrelic.com/v1/accounts/284929/events"
        );
    }

    #[test]
    #[serial]
    fn test_load_from_file_applies_defaults() {
        clear_env();
        let file = write_config(
            r#"
            account_id = "284929"
            insert_key = "BYh7sByiVrkfqcDa2eqVMhjxafkdyuX0"
            protocol = "http"
            batch_max_events = 25
            "#,
        );

        let config = ConfigLoader::load(Some(file.path())).unwrap();

        assert_eq!(config.account_id, "284929");
        assert_eq!(config.insert_key.expose(), "BYh7sByiVrkfqcDa2eqVMhjxafkdyuX0");
        assert_eq!(config.protocol, Protocol::Http);
        assert_eq!(config.batch_max_events, 25);
        assert_eq!(config.event_type, "logstashEvent");
        assert_eq!(config.batch_timeout_seconds, 5.0);
        assert!(config.tags.is_empty());
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        clear_env();
        let file = write_config(
            r#"
            account_id = "1"
            insert_key = "file-key"
            batch_max_events = 25
            "#,
        );
        std::env::set_var("INSIGHTS_ACCOUNT_ID", "284929");
        std::env::set_var("INSIGHTS_BATCH_MAX_EVENTS", "50");
        std::env::set_var("INSIGHTS_TAGS", "prod,web");

        let config = ConfigLoader::load(Some(file.path()));
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.account_id, "284929");
        assert_eq!(config.insert_key.expose(), "file-key");
        assert_eq!(config.batch_max_events, 50);
        assert_eq!(config.tags, vec!["prod".to_string(), "web".to_string()]);
    }

    #[test]
    #[serial]
    fn test_environment_strings_are_kept_verbatim() {
        clear_env();
        std::env::set_var("INSIGHTS_ACCOUNT_ID", "0042");
        std::env::set_var("INSIGHTS_INSERT_KEY", "1e5");
        std::env::set_var("INSIGHTS_EVENT_TYPE", "true");
        std::env::set_var("INSIGHTS_BATCH_ENABLED", "false");
        std::env::set_var("INSIGHTS_BATCH_TIMEOUT_SECONDS", "2.5");

        let config = ConfigLoader::load(None);
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.account_id, "0042");
        assert_eq!(config.insert_key.expose(), "1e5");
        assert_eq!(config.event_type, "true");
        assert!(!config.batch_enabled);
        assert_eq!(config.batch_timeout_seconds, 2.5);
    }

    #[test]
    #[serial]
    fn test_load_rejects_oversized_batch() {
        clear_env();
        let file = write_config(
            r#"
            account_id = "284929"
            insert_key = "key"
            batch_max_events = 1001
            "#,
        );

        let err = ConfigLoader::load(Some(file.path())).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::BatchTooLarge { requested: 1001 })
        );
    }

    #[test]
    #[serial]
    fn test_load_requires_account_id() {
        clear_env();
        let file = write_config(r#"insert_key = "key""#);

        assert!(ConfigLoader::load(Some(file.path())).is_err());
    }

    #[rstest]
    #[case::ceiling_is_allowed(1000, None)]
    #[case::above_ceiling(1001, Some(ConfigError::BatchTooLarge { requested: 1001 }))]
    #[case::zero(0, Some(ConfigError::EmptyBatch))]
    fn test_batch_size_validation(#[case] size: usize, #[case] expected: Option<ConfigError>) {
        let config = Config {
            batch_max_events: size,
            ..Config::new("284929", "key")
        };

        assert_eq!(config.validate().err(), expected);
    }

    #[test]
    fn test_oversized_batch_rejected_even_when_batching_disabled() {
        let config = Config {
            batch_enabled: false,
            batch_max_events: 5000,
            ..Config::new("284929", "key")
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::BatchTooLarge { requested: 5000 })
        ));
    }

    #[rstest]
    #[case::blank_account(Config::new("  ", "key"), ConfigError::MissingField("account_id"))]
    #[case::blank_key(Config::new("284929", ""), ConfigError::MissingField("insert_key"))]
    #[case::zero_timeout(
        Config { batch_timeout_seconds: 0.0, ..Config::new("284929", "key") },
        ConfigError::InvalidDuration { field: "batch_timeout_seconds", value: 0.0 }
    )]
    #[case::timeout_beyond_duration(
        Config { batch_timeout_seconds: 1e20, ..Config::new("284929", "key") },
        ConfigError::InvalidDuration { field: "batch_timeout_seconds", value: 1e20 }
    )]
    #[case::request_timeout_beyond_duration(
        Config { request_timeout_seconds: 1e20, ..Config::new("284929", "key") },
        ConfigError::InvalidDuration { field: "request_timeout_seconds", value: 1e20 }
    )]
    #[case::nan_timeout(
        Config { request_timeout_seconds: f64::INFINITY, ..Config::new("284929", "key") },
        ConfigError::InvalidDuration { field: "request_timeout_seconds", value: f64::INFINITY }
    )]
    #[case::proxy_port_without_host(
        Config { proxy_port: Some(3128), ..Config::new("284929", "key") },
        ConfigError::IncompleteProxy
    )]
    fn test_invalid_configs(#[case] config: Config, #[case] expected: ConfigError) {
        assert_eq!(config.validate(), Err(expected));
    }

    #[rstest]
    #[case::host_and_port(Some("proxy.local"), Some(3128), Some("http://proxy.local:3128/"))]
    #[case::host_only(Some("proxy.local"), None, Some("http://proxy.local/"))]
    #[case::explicit_scheme(Some("https://proxy.local"), Some(8443), Some("https://proxy.local:8443/"))]
    #[case::no_proxy(None, None, None)]
    fn test_proxy_url(
        #[case] host: Option<&str>,
        #[case] port: Option<u16>,
        #[case] expected: Option<&str>,
    ) {
        let config = Config {
            proxy_host: host.map(str::to_string),
            proxy_port: port,
            ..Config::new("284929", "key")
        };

        let url = config.proxy_url().unwrap();
        assert_eq!(url.as_ref().map(|u| u.as_str()), expected);
    }

    #[test]
    fn test_custom_collector_host() {
        let config = Config {
            protocol: Protocol::Http,
            collector_host: "127.0.0.1:8080".to_string(),
            ..Config::new("42", "key")
        };

        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "http://127.0.0.1:8080/v1/accounts/42/events"
        );
    }

    #[test]
    fn test_safe_json_redacts_secrets() {
        let config = Config {
            proxy_host: Some("proxy.local".into()),
            proxy_password: Some("hunter2".into()),
            ..Config::new("284929", "BYh7sByiVrkfqcDa2eqVMhjxafkdyuX0")
        };

        let rendered = config.to_safe_json().to_string();

        assert!(rendered.contains("284929"));
        assert!(!rendered.contains("BYh7sByiVrkfqcDa2eqVMhjxafkdyuX0"));
        assert!(!rendered.contains("hunter2"));
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
