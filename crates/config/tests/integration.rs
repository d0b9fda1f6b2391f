//! Integration tests for config

#[cfg(test)]
mod tests {
    use rigup_config::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[network]
timeout = 60
retries = 5

[build]
command_timeout = 7200

[paths]
download_dir = "/var/tmp/rigup"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.network.timeout, 60);
        assert_eq!(config.network.retries, 5);
        assert_eq!(config.build.command_timeout, Some(7200));
        assert_eq!(
            config.download_dir(),
            std::path::PathBuf::from("/var/tmp/rigup")
        );
    }

    #[tokio::test]
    async fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[network]
retries = 1
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.network.retries, 1);
        assert_eq!(config.network.timeout, 300);
        assert_eq!(config.network.connect_timeout, 30);
        assert_eq!(config.build.command_timeout, None);
        assert_eq!(config.plan_path(), std::path::PathBuf::from("plan.toml"));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        // Clean up any existing env vars first
        std::env::remove_var("RIGUP_OUTPUT");
        std::env::remove_var("RIGUP_COLOR");
        std::env::remove_var("RIGUP_NETWORK_TIMEOUT");

        std::env::set_var("RIGUP_OUTPUT", "json");
        std::env::set_var("RIGUP_COLOR", "always");
        std::env::set_var("RIGUP_NETWORK_TIMEOUT", "42");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);
        assert_eq!(config.network.timeout, 42);

        // Clean up
        std::env::remove_var("RIGUP_OUTPUT");
        std::env::remove_var("RIGUP_COLOR");
        std::env::remove_var("RIGUP_NETWORK_TIMEOUT");
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();

        // Clean up any existing env vars first
        std::env::remove_var("RIGUP_OUTPUT");
        std::env::remove_var("RIGUP_COLOR");

        std::env::set_var("RIGUP_OUTPUT", "invalid");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        // Clean up
        std::env::remove_var("RIGUP_OUTPUT");
    }
}
