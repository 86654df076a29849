#[cfg(test)]
mod tests {
    use orbita::error::Error;
    use orbita::libs::clock::{offset_from_minutes, Clock, DEFAULT_UTC_OFFSET_MINUTES};
    use orbita::libs::config::{Config, ProviderConfig, DEFAULT_BIND};
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        _temp_dir: TempDir,
        path: PathBuf,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join("config.json");
            ConfigTestContext { _temp_dir: temp_dir, path }
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.default_user.is_none());
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.streak.utc_offset_minutes, DEFAULT_UTC_OFFSET_MINUTES);
        assert!(config.identity.trust_user_header);
        assert!(config.identity.providers.is_empty());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_reads_defaults(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read(ctx: &mut ConfigTestContext) {
        let mut config = Config::default();
        config.default_user = Some("ana".to_string());
        config.server.bind = "0.0.0.0:9000".to_string();
        config.streak.utc_offset_minutes = 60;
        config.identity.trust_user_header = false;
        config.identity.providers.push(ProviderConfig {
            name: "supabase".to_string(),
            user_url: "https://project.supabase.co/auth/v1/user".to_string(),
            api_key: Some("anon".to_string()),
            user_id_field: "id".to_string(),
        });

        config.save_to(&ctx.path).unwrap();
        let loaded = Config::read_from(&ctx.path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_fills_defaults(ctx: &mut ConfigTestContext) {
        std::fs::write(
            &ctx.path,
            r#"{"default_user": "ana", "identity": {"trust_user_header": false, "providers": [{"name": "auth", "user_url": "http://localhost/user"}]}}"#,
        )
        .unwrap();

        let config = Config::read_from(&ctx.path).unwrap();
        assert_eq!(config.default_user.as_deref(), Some("ana"));
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert!(!config.identity.trust_user_header);
        assert_eq!(config.identity.providers[0].user_id_field, "id");
        assert!(config.identity.providers[0].api_key.is_none());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_invalid_file_is_an_error(ctx: &mut ConfigTestContext) {
        std::fs::write(&ctx.path, "{ not json").unwrap();
        assert!(matches!(Config::read_from(&ctx.path), Err(Error::Json(_))));
    }

    #[test]
    fn test_header_trust_exposed_off_loopback() {
        let mut config = Config::default();
        let loopback: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let public: SocketAddr = "0.0.0.0:8080".parse().unwrap();

        assert!(!config.identity.header_trust_exposed(&loopback));
        assert!(config.identity.header_trust_exposed(&public));

        config.identity.trust_user_header = false;
        assert!(!config.identity.header_trust_exposed(&public));
    }

    #[test]
    fn test_absurd_offset_falls_back_to_utc() {
        let mut config = Config::default();
        config.streak.utc_offset_minutes = i32::MAX;
        assert_eq!(config.clock().now().offset().local_minus_utc(), 0);

        assert_eq!(offset_from_minutes(-180).local_minus_utc(), -180 * 60);
        assert_eq!(offset_from_minutes(24 * 60).local_minus_utc(), 0);
    }

    #[test]
    fn test_clock_uses_configured_offset() {
        let mut config = Config::default();
        config.streak.utc_offset_minutes = 330;

        let now = config.clock().now();
        assert_eq!(now.offset().local_minus_utc(), 330 * 60);
    }
}
