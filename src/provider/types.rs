use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 提供方使用的认证方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// OAuth 1.0a：每个请求都用 consumer secret + token secret 做 HMAC-SHA1 签名
    RequestSigned,
    /// OAuth 2.0：授权码换取不透明的 bearer token
    BearerToken,
}

impl AuthScheme {
    /// 配置和日志中使用的名称
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequestSigned => "request_signed",
            Self::BearerToken => "bearer_token",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提供方的 HTTP 端点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
    /// 用户授权页
    pub authorize_url: String,
    /// 授权码换 token（bearer）或 request token 换 access token（signed）
    pub token_url: String,
    /// 仅 request-signed 方案使用
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_token_url: Option<String>,
    /// 用户资料接口
    pub profile_url: String,
    /// 发布接口
    pub publish_url: String,
}

impl ProviderEndpoints {
    /// 内置端点预设
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "linkedin" => Some(Self {
                authorize_url: "https://www.linkedin.com/oauth/v2/authorization".to_string(),
                token_url: "https://www.linkedin.com/oauth/v2/accessToken".to_string(),
                request_token_url: None,
                profile_url: "https://api.linkedin.com/v2/me".to_string(),
                publish_url: "https://api.linkedin.com/v2/ugcPosts".to_string(),
            }),
            "twitter" => Some(Self {
                authorize_url: "https://api.twitter.com/oauth/authorize".to_string(),
                token_url: "https://api.twitter.com/oauth/access_token".to_string(),
                request_token_url: Some("https://api.twitter.com/oauth/request_token".to_string()),
                profile_url: "https://api.twitter.com/1.1/account/verify_credentials.json"
                    .to_string(),
                publish_url: "https://api.twitter.com/1.1/statuses/update.json".to_string(),
            }),
            _ => None,
        }
    }
}

/// 单个提供方的 OAuth 配置，加载后不可变
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// 提供方名称，同时用作路由段和 cookie 名后缀
    pub name: String,
    /// 展示名称，缺省时由名称推导
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// OAuth client id（OAuth1 中为 consumer key）
    pub client_id: String,
    /// OAuth client secret（OAuth1 中为 consumer secret）
    pub client_secret: String,
    /// 申请的权限范围
    #[serde(default)]
    pub scopes: BTreeSet<String>,
    /// 回调地址
    pub callback_url: String,
    /// 认证方案
    pub auth_scheme: AuthScheme,
    /// 覆盖内置预设；非内置提供方必须提供
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<ProviderEndpoints>,
}

impl ProviderConfig {
    /// 创建不带端点覆盖和权限范围的配置
    pub fn new(
        name: impl Into<String>,
        auth_scheme: AuthScheme,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scopes: BTreeSet::new(),
            callback_url: callback_url.into(),
            auth_scheme,
            endpoints: None,
        }
    }

    /// 设置权限范围
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// 覆盖端点
    #[must_use]
    pub fn with_endpoints(mut self, endpoints: ProviderEndpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// 设置展示名称
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("display_name", &self.display_name)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("scopes", &self.scopes)
            .field("callback_url", &self.callback_url)
            .field("auth_scheme", &self.auth_scheme)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_serde_names() {
        let scheme: AuthScheme = serde_json::from_str("\"request_signed\"").unwrap();
        assert_eq!(scheme, AuthScheme::RequestSigned);
        assert_eq!(
            serde_json::to_string(&AuthScheme::BearerToken).unwrap(),
            "\"bearer_token\""
        );
    }

    #[test]
    fn presets_exist_for_builtin_providers() {
        let twitter = ProviderEndpoints::preset("twitter").unwrap();
        assert!(twitter.request_token_url.is_some());
        let linkedin = ProviderEndpoints::preset("linkedin").unwrap();
        assert!(linkedin.publish_url.ends_with("/v2/ugcPosts"));
        assert!(ProviderEndpoints::preset("myspace").is_none());
    }

    #[test]
    fn debug_redacts_client_secret() {
        let config = ProviderConfig::new(
            "linkedin",
            AuthScheme::BearerToken,
            "id",
            "super-secret",
            "https://app.example.com/auth/callback/linkedin",
        );
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
