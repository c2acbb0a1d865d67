//! # 配置管理器
//!
//! 从 TOML 文件加载配置，应用环境变量覆盖后校验

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::{AppConfig, validate_config};
use crate::error::ConfigError;
use crate::linfo;
use crate::logging::{LogComponent, LogStage};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "GOCIAL_CONFIG_PATH";
/// 未指定时的默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config/gocial.toml";

const ENV_PREFIX: &str = "GOCIAL_";

/// 配置管理器
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Arc<AppConfig>,
}

impl ConfigManager {
    /// 创建配置管理器
    ///
    /// 路径优先级：参数 > `GOCIAL_CONFIG_PATH` > `config/gocial.toml`
    pub fn new(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit_path.map_or_else(
            || {
                env::var(CONFIG_PATH_ENV)
                    .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
            },
            Path::to_path_buf,
        );

        Self::from_file(path)
    }

    /// 从指定文件创建配置管理器，使用进程环境变量覆盖
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with_env(path, |key| env::var(key).ok())
    }

    /// 从指定文件创建配置管理器，环境变量通过 `lookup` 读取
    pub fn from_file_with_env(
        path: impl AsRef<Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: AppConfig = toml::from_str(&content).map_err(|source| {
            ConfigError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?;

        let applied = apply_env_overrides(&mut config, lookup)?;
        validate_config(&config)?;

        linfo!(
            "system",
            LogStage::Configuration,
            LogComponent::Config,
            "config_loaded",
            "configuration loaded",
            path = %path.display(),
            providers = config.providers.len(),
            env_overrides = applied
        );

        Ok(Self {
            path: path.to_path_buf(),
            config: Arc::new(config),
        })
    }

    /// 获取当前配置
    pub fn get_config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// 配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 应用环境变量覆盖，返回生效的覆盖数量
///
/// 支持 `GOCIAL_TOKEN_SIGNING_KEY`、`GOCIAL_SERVER_HOST`、`GOCIAL_SERVER_PORT`
/// 以及每个提供方的 `GOCIAL_<NAME>_CLIENT_ID` / `GOCIAL_<NAME>_CLIENT_SECRET`，
/// 其中 `<NAME>` 为大写且 `-` 替换为 `_` 的提供方名称。
pub fn apply_env_overrides(
    config: &mut AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<usize, ConfigError> {
    let mut applied = 0;

    if let Some(key) = lookup(&format!("{ENV_PREFIX}TOKEN_SIGNING_KEY")) {
        debug!("应用环境变量覆盖: auth.token_signing_key = ***");
        config.auth.token_signing_key = key;
        applied += 1;
    }

    if let Some(host) = lookup(&format!("{ENV_PREFIX}SERVER_HOST")) {
        debug!("应用环境变量覆盖: server.host = {}", host);
        config.server.host = host;
        applied += 1;
    }

    if let Some(port) = lookup(&format!("{ENV_PREFIX}SERVER_PORT")) {
        config.server.port = port.parse().map_err(|_| {
            ConfigError::invalid_value(format!("{ENV_PREFIX}SERVER_PORT"), format!("`{port}` is not a port number"))
        })?;
        debug!("应用环境变量覆盖: server.port = {}", config.server.port);
        applied += 1;
    }

    for provider in &mut config.providers {
        let env_name = provider.name.to_uppercase().replace('-', "_");

        if let Some(client_id) = lookup(&format!("{ENV_PREFIX}{env_name}_CLIENT_ID")) {
            debug!("应用环境变量覆盖: providers.{}.client_id", provider.name);
            provider.client_id = client_id;
            applied += 1;
        }

        if let Some(secret) = lookup(&format!("{ENV_PREFIX}{env_name}_CLIENT_SECRET")) {
            debug!("应用环境变量覆盖: providers.{}.client_secret = ***", provider.name);
            provider.client_secret = secret;
            applied += 1;
        }

        if provider.client_secret.is_empty() {
            warn!(provider = %provider.name, "provider has an empty client secret");
        }
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;
    use crate::provider::AuthScheme;

    const SAMPLE: &str = r#"
[server]
port = 8080

[auth]
token_signing_key = "0123456789abcdef0123456789abcdef"

[[providers]]
name = "linkedin"
client_id = "li-id"
client_secret = "li-secret"
scopes = ["r_liteprofile", "w_member_social"]
callback_url = "https://app.example.com/auth/callback/linkedin"
auth_scheme = "bearer_token"

[[providers]]
name = "twitter"
client_id = "tw-key"
client_secret = "tw-secret"
callback_url = "https://app.example.com/auth/callback/twitter"
auth_scheme = "request_signed"
"#;

    fn write_sample() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_from_file() {
        let file = write_sample();
        let manager = ConfigManager::from_file_with_env(file.path(), |_| None).unwrap();
        let config = manager.get_config();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_secs, 259_200);
        assert_eq!(config.auth.base_cookie_name, "gocial");
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[1].auth_scheme, AuthScheme::RequestSigned);
    }

    #[test]
    fn test_env_overrides() {
        let file = write_sample();
        let env: HashMap<&str, &str> = HashMap::from([
            ("GOCIAL_SERVER_PORT", "9090"),
            ("GOCIAL_LINKEDIN_CLIENT_SECRET", "from-env"),
        ]);
        let manager = ConfigManager::from_file_with_env(file.path(), |key| {
            env.get(key).map(ToString::to_string)
        })
        .unwrap();
        let config = manager.get_config();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.providers[0].client_secret, "from-env");
        assert_eq!(config.providers[1].client_secret, "tw-secret");
    }

    #[test]
    fn test_bad_port_override() {
        let file = write_sample();
        let err = ConfigManager::from_file_with_env(file.path(), |key| {
            (key == "GOCIAL_SERVER_PORT").then(|| "eighty".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigManager::from_file_with_env("/nonexistent/gocial.toml", |_| None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[auth\n").unwrap();
        let err = ConfigManager::from_file_with_env(file.path(), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
