use std::collections::BTreeMap;

use url::Url;

use super::types::{AuthScheme, ProviderConfig, ProviderEndpoints};
use crate::error::ConfigError;
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};

/// 已启用的提供方：配置 + 解析后的端点
#[derive(Debug, Clone)]
pub struct RegisteredProvider {
    /// 原始配置
    pub config: ProviderConfig,
    /// 合并预设与覆盖后的端点
    pub endpoints: ProviderEndpoints,
    /// 展示名称
    pub display_name: String,
}

impl RegisteredProvider {
    /// 提供方名称
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// 认证方案
    #[must_use]
    pub const fn scheme(&self) -> AuthScheme {
        self.config.auth_scheme
    }
}

/// 启动时构建一次的提供方索引，之后只读，通过 `Arc` 共享。
///
/// 名称始终按字典序枚举。
#[derive(Debug, Clone, Default)]
pub struct ProviderIndex {
    providers: BTreeMap<String, RegisteredProvider>,
}

impl ProviderIndex {
    /// 构建索引：按名称去重（后写覆盖前写）并校验结构
    pub fn build<I>(configs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ProviderConfig>,
    {
        let mut providers = BTreeMap::new();

        for config in configs {
            let registered = register(config)?;
            if let Some(previous) =
                providers.insert(registered.config.name.clone(), registered)
            {
                ldebug!(
                    "system",
                    LogStage::Configuration,
                    LogComponent::Registry,
                    "duplicate_provider",
                    &format!("provider `{}` configured twice, keeping the later entry", previous.config.name)
                );
            }
        }

        Ok(Self { providers })
    }

    /// 已排序的提供方名称
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// 已排序的 (名称, 展示名)
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.providers
            .values()
            .map(|p| (p.config.name.as_str(), p.display_name.as_str()))
    }

    /// 按名称查找
    pub fn get(&self, name: &str) -> Option<&RegisteredProvider> {
        self.providers.get(name)
    }

    /// 是否已注册
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// 展示名称
    pub fn display_name(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.display_name.as_str())
    }

    /// 认证方案
    pub fn scheme_of(&self, name: &str) -> Option<AuthScheme> {
        self.get(name).map(RegisteredProvider::scheme)
    }

    /// 提供方数量
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// 是否没有任何提供方
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// pending cookie 名为 `<base>-pending-<provider>`，提供方名称不能占用这个前缀
const PENDING_PREFIX: &str = "pending-";

fn register(config: ProviderConfig) -> Result<RegisteredProvider, ConfigError> {
    check_provider_name(&config.name)?;

    if let Err(reason) = check_absolute_http_url(&config.callback_url) {
        return Err(ConfigError::InvalidCallbackUrl {
            provider: config.name.clone(),
            url: config.callback_url.clone(),
            reason,
        });
    }

    let endpoints = match config.endpoints.clone() {
        Some(endpoints) => endpoints,
        None => ProviderEndpoints::preset(&config.name)
            .ok_or_else(|| ConfigError::MissingEndpoints(config.name.clone()))?,
    };

    let mut urls = vec![
        ("authorize_url", &endpoints.authorize_url),
        ("token_url", &endpoints.token_url),
        ("profile_url", &endpoints.profile_url),
        ("publish_url", &endpoints.publish_url),
    ];
    match (&endpoints.request_token_url, config.auth_scheme) {
        (Some(url), _) => urls.push(("request_token_url", url)),
        (None, AuthScheme::RequestSigned) => {
            return Err(ConfigError::MissingEndpoint {
                provider: config.name.clone(),
                field: "request_token_url",
            });
        }
        (None, AuthScheme::BearerToken) => {}
    }

    for (field, url) in urls {
        if let Err(reason) = check_absolute_http_url(url) {
            return Err(ConfigError::InvalidEndpoint {
                provider: config.name.clone(),
                field,
                url: url.clone(),
                reason,
            });
        }
    }

    let display_name = config
        .display_name
        .clone()
        .unwrap_or_else(|| default_display_name(&config.name));

    Ok(RegisteredProvider {
        config,
        endpoints,
        display_name,
    })
}

fn check_provider_name(name: &str) -> Result<(), ConfigError> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyProviderName);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::InvalidProviderName {
            name: name.to_string(),
            reason: "only ASCII letters, digits, '-' or '_' are allowed",
        });
    }
    if name.starts_with(PENDING_PREFIX) {
        return Err(ConfigError::InvalidProviderName {
            name: name.to_string(),
            reason: "the `pending-` prefix is reserved for handshake cookies",
        });
    }
    Ok(())
}

fn check_absolute_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}

fn default_display_name(name: &str) -> String {
    match name {
        "linkedin" => "LinkedIn".to_string(),
        "twitter" => "Twitter".to_string(),
        other => {
            let mut chars = other.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn linkedin() -> ProviderConfig {
        ProviderConfig::new(
            "linkedin",
            AuthScheme::BearerToken,
            "li-id",
            "li-secret",
            "https://app.example.com/auth/callback/linkedin",
        )
    }

    fn twitter() -> ProviderConfig {
        ProviderConfig::new(
            "twitter",
            AuthScheme::RequestSigned,
            "tw-key",
            "tw-secret",
            "https://app.example.com/auth/callback/twitter",
        )
    }

    #[test]
    fn names_are_sorted_regardless_of_input_order() {
        let index = ProviderIndex::build(vec![twitter(), linkedin()]).unwrap();
        assert_eq!(index.names().collect::<Vec<_>>(), vec!["linkedin", "twitter"]);
        assert_eq!(
            index.entries().collect::<Vec<_>>(),
            vec![("linkedin", "LinkedIn"), ("twitter", "Twitter")]
        );
    }

    #[test]
    fn duplicate_names_last_write_wins() {
        let mut second = linkedin();
        second.client_id = "replacement".to_string();
        let index = ProviderIndex::build(vec![linkedin(), second]).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("linkedin").unwrap().config.client_id, "replacement");
    }

    #[test]
    fn empty_input_builds_empty_index() {
        let index = ProviderIndex::build(Vec::new()).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.names().count(), 0);
    }

    #[test]
    fn empty_name_rejected() {
        let mut config = linkedin();
        config.name = "  ".to_string();
        assert!(matches!(
            ProviderIndex::build(vec![config]),
            Err(ConfigError::EmptyProviderName)
        ));
    }

    #[rstest]
    #[case::space("linked in")]
    #[case::cookie_separator("linkedin;")]
    #[case::path_segment("linkedin/v2")]
    #[case::non_ascii("linkedín")]
    #[case::pending_prefix("pending-linkedin")]
    fn invalid_names_rejected(#[case] name: &str) {
        let mut config = linkedin();
        config.name = name.to_string();
        match ProviderIndex::build(vec![config]) {
            Err(ConfigError::InvalidProviderName { name: rejected, .. }) => {
                assert_eq!(rejected, name);
            }
            other => panic!("{name} should be rejected, got {other:?}"),
        }
    }

    #[test]
    fn dashes_and_underscores_allowed() {
        let mut config = linkedin();
        config.name = "linkedin_eu-2".to_string();
        config.endpoints = ProviderEndpoints::preset("linkedin");
        let index = ProviderIndex::build(vec![config]).unwrap();
        assert!(index.contains("linkedin_eu-2"));
    }

    #[test]
    fn malformed_callback_rejected() {
        for bad in ["not a url", "/relative/path", "ftp://example.com/cb"] {
            let mut config = linkedin();
            config.callback_url = bad.to_string();
            assert!(
                matches!(
                    ProviderIndex::build(vec![config]),
                    Err(ConfigError::InvalidCallbackUrl { .. })
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_provider_needs_endpoints() {
        let config = ProviderConfig::new(
            "mastodon",
            AuthScheme::BearerToken,
            "id",
            "secret",
            "https://app.example.com/auth/callback/mastodon",
        );
        assert!(matches!(
            ProviderIndex::build(vec![config.clone()]),
            Err(ConfigError::MissingEndpoints(_))
        ));

        let with_endpoints = config.with_endpoints(ProviderEndpoints {
            authorize_url: "https://social.example/oauth/authorize".to_string(),
            token_url: "https://social.example/oauth/token".to_string(),
            request_token_url: None,
            profile_url: "https://social.example/api/v1/accounts/verify_credentials".to_string(),
            publish_url: "https://social.example/api/v1/statuses".to_string(),
        });
        let index = ProviderIndex::build(vec![with_endpoints]).unwrap();
        assert_eq!(index.display_name("mastodon"), Some("Mastodon"));
        assert_eq!(index.scheme_of("mastodon"), Some(AuthScheme::BearerToken));
    }

    #[test]
    fn signed_scheme_requires_request_token_endpoint() {
        let mut endpoints = ProviderEndpoints::preset("twitter").unwrap();
        endpoints.request_token_url = None;
        let config = twitter().with_endpoints(endpoints);
        assert!(matches!(
            ProviderIndex::build(vec![config]),
            Err(ConfigError::MissingEndpoint { field: "request_token_url", .. })
        ));
    }
}
