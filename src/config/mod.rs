//! # 配置管理模块
//!
//! 处理应用配置加载、环境变量覆盖和验证

mod app_config;
mod manager;

pub use app_config::{
    AppConfig, AuthConfig, DEFAULT_PENDING_TTL_SECS, DEFAULT_TOKEN_TTL_SECS, HttpConfig,
    MIN_SIGNING_KEY_LEN, ServerConfig,
};
pub use manager::{CONFIG_PATH_ENV, ConfigManager, DEFAULT_CONFIG_PATH, apply_env_overrides};

use crate::error::ConfigError;

/// 验证配置有效性
///
/// 提供方条目的结构校验由 `ProviderIndex::build` 负责。
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::invalid_value("server.port", "must be non-zero"));
    }

    let key_len = config.auth.token_signing_key.len();
    if key_len < MIN_SIGNING_KEY_LEN {
        return Err(ConfigError::invalid_value(
            "auth.token_signing_key",
            format!("must be at least {MIN_SIGNING_KEY_LEN} bytes, got {key_len}"),
        ));
    }

    if config.auth.token_ttl_secs == 0 {
        return Err(ConfigError::invalid_value("auth.token_ttl_secs", "must be non-zero"));
    }
    if config.auth.pending_ttl_secs == 0 {
        return Err(ConfigError::invalid_value("auth.pending_ttl_secs", "must be non-zero"));
    }

    let base = &config.auth.base_cookie_name;
    if base.is_empty()
        || !base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::invalid_value(
            "auth.base_cookie_name",
            "must be non-empty and contain only ASCII letters, digits, '-' or '_'",
        ));
    }

    if config.http.timeout_secs == 0 {
        return Err(ConfigError::invalid_value("http.timeout_secs", "must be non-zero"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            auth: AuthConfig::new("k".repeat(MIN_SIGNING_KEY_LEN)),
            http: HttpConfig::default(),
            providers: Vec::new(),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&base_config()).is_ok());
        assert_eq!(base_config().auth.token_ttl_secs, 259_200);
    }

    #[rstest]
    #[case::short_key("auth.token_signing_key", |c: &mut AppConfig| c.auth.token_signing_key = "too-short".to_string())]
    #[case::zero_token_ttl("auth.token_ttl_secs", |c: &mut AppConfig| c.auth.token_ttl_secs = 0)]
    #[case::zero_pending_ttl("auth.pending_ttl_secs", |c: &mut AppConfig| c.auth.pending_ttl_secs = 0)]
    #[case::cookie_charset("auth.base_cookie_name", |c: &mut AppConfig| c.auth.base_cookie_name = "bad name;".to_string())]
    #[case::zero_port("server.port", |c: &mut AppConfig| c.server.port = 0)]
    #[case::zero_timeout("http.timeout_secs", |c: &mut AppConfig| c.http.timeout_secs = 0)]
    fn test_invalid_values_rejected(#[case] field: &str, #[case] mutate: fn(&mut AppConfig)) {
        let mut config = base_config();
        mutate(&mut config);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains(field), "{err}");
    }

    #[test]
    fn test_auth_debug_hides_key() {
        let config = base_config();
        let rendered = format!("{:?}", config.auth);
        assert!(!rendered.contains(&config.auth.token_signing_key));
    }
}
