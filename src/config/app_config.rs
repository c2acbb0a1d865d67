//! # 应用配置结构定义

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::provider::ProviderConfig;

/// 默认凭证有效期：72 小时
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 72 * 60 * 60;
/// 默认握手中间状态有效期：10 分钟
pub const DEFAULT_PENDING_TTL_SECS: u64 = 10 * 60;
/// 签名密钥最短长度（字节）
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// 应用主配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 令牌与 cookie 配置
    pub auth: AuthConfig,
    /// 出站 HTTP 配置
    #[serde(default)]
    pub http: HttpConfig,
    /// 启用的身份提供方，TOML 中写作 `[[providers]]`
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 回调成功后的跳转地址
    pub post_login_redirect: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            post_login_redirect: "/auth/info".to_string(),
        }
    }
}

impl ServerConfig {
    /// `host:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 凭证令牌与 Cookie 配置
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 签名密钥，至少 32 字节
    pub token_signing_key: String,
    /// 提供方未给出过期时间时使用的有效期（秒）
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// 握手状态（pending cookie）的有效期（秒）
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_secs: u64,
    /// Cookie 名前缀，实际名称为 `<base>-<provider>`
    #[serde(default = "default_base_cookie_name")]
    pub base_cookie_name: String,
}

const fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

const fn default_pending_ttl() -> u64 {
    DEFAULT_PENDING_TTL_SECS
}

fn default_base_cookie_name() -> String {
    "gocial".to_string()
}

impl AuthConfig {
    /// 使用默认有效期和 cookie 前缀
    pub fn new(token_signing_key: impl Into<String>) -> Self {
        Self {
            token_signing_key: token_signing_key.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            pending_ttl_secs: DEFAULT_PENDING_TTL_SECS,
            base_cookie_name: default_base_cookie_name(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_signing_key", &"***")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("pending_ttl_secs", &self.pending_ttl_secs)
            .field("base_cookie_name", &self.base_cookie_name)
            .finish()
    }
}

/// 出站 HTTP 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// User-Agent
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("gocial/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
