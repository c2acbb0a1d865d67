//! Errors raised while loading configuration or building the provider index.
//!
//! All of these are fatal at startup.

use thiserror::Error;

/// Configuration and provider registration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 提供方名称为空
    #[error("provider name must not be empty")]
    EmptyProviderName,

    /// 名称含有不能用于路由段或 cookie 名的字符，或与 pending cookie 冲突
    #[error("provider name `{name}` is invalid: {reason}")]
    InvalidProviderName {
        /// 原始名称
        name: String,
        /// 失败原因
        reason: &'static str,
    },

    /// 回调地址无法解析或 scheme 不受支持
    #[error("provider `{provider}` has a malformed callback URL `{url}`: {reason}")]
    InvalidCallbackUrl {
        /// 提供方名称
        provider: String,
        /// 原始地址
        url: String,
        /// 失败原因
        reason: String,
    },

    /// 端点地址无法解析
    #[error("provider `{provider}` has a malformed {field} `{url}`: {reason}")]
    InvalidEndpoint {
        /// 提供方名称
        provider: String,
        /// 端点字段名
        field: &'static str,
        /// 原始地址
        url: String,
        /// 失败原因
        reason: String,
    },

    /// 既没有内置端点也没有配置端点
    #[error("provider `{0}` has no built-in endpoints and none were configured")]
    MissingEndpoints(String),

    /// 认证方案所需的端点缺失
    #[error("provider `{provider}` requires the `{field}` endpoint for its auth scheme")]
    MissingEndpoint {
        /// 提供方名称
        provider: String,
        /// 缺失的端点字段名
        field: &'static str,
    },

    /// 配置值不合法
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// 配置项路径
        field: String,
        /// 失败原因
        reason: String,
    },

    /// 配置文件读取失败
    #[error("failed to read config file `{path}`")]
    Read {
        /// 文件路径
        path: String,
        /// IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 配置文件不是合法的 TOML
    #[error("failed to parse config file `{path}`")]
    Parse {
        /// 文件路径
        path: String,
        /// 解析错误
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    /// 创建配置值错误
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
