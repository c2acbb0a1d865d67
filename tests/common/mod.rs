//! 集成测试公共工具
#![allow(dead_code)]

use std::sync::Arc;

use gocial::config::{AppConfig, AuthConfig, HttpConfig, ServerConfig};
use gocial::provider::{AuthScheme, ProviderConfig, ProviderEndpoints, ProviderIndex};
use gocial::types::Identity;
use wiremock::MockServer;

pub const SIGNING_KEY: &str = "integration-test-signing-key-0123456789";

/// 端点全部指向 mock 服务器的 bearer-token 提供方
pub fn bearer_provider(server: &MockServer) -> ProviderConfig {
    ProviderConfig::new(
        "linkedin",
        AuthScheme::BearerToken,
        "li-id",
        "li-secret",
        "https://app.example.com/auth/callback/linkedin",
    )
    .with_scopes(["r_liteprofile", "w_member_social"])
    .with_endpoints(ProviderEndpoints {
        authorize_url: format!("{}/oauth/v2/authorization", server.uri()),
        token_url: format!("{}/oauth/v2/accessToken", server.uri()),
        request_token_url: None,
        profile_url: format!("{}/v2/me", server.uri()),
        publish_url: format!("{}/v2/ugcPosts", server.uri()),
    })
}

/// 端点全部指向 mock 服务器的 request-signed 提供方
pub fn signed_provider(server: &MockServer) -> ProviderConfig {
    ProviderConfig::new(
        "twitter",
        AuthScheme::RequestSigned,
        "tw-key",
        "tw-secret",
        "https://app.example.com/auth/callback/twitter",
    )
    .with_endpoints(ProviderEndpoints {
        authorize_url: format!("{}/oauth/authenticate", server.uri()),
        token_url: format!("{}/oauth/access_token", server.uri()),
        request_token_url: Some(format!("{}/oauth/request_token", server.uri())),
        profile_url: format!("{}/1.1/account/verify_credentials.json", server.uri()),
        publish_url: format!("{}/1.1/statuses/update.json", server.uri()),
    })
}

pub fn index(server: &MockServer) -> Arc<ProviderIndex> {
    Arc::new(ProviderIndex::build(vec![bearer_provider(server), signed_provider(server)]).unwrap())
}

pub fn app_config(server: &MockServer) -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        auth: AuthConfig::new(SIGNING_KEY),
        http: HttpConfig::default(),
        providers: vec![bearer_provider(server), signed_provider(server)],
    }
}

pub fn bearer_identity() -> Identity {
    Identity {
        provider: "linkedin".to_string(),
        user_id: "GJ74B4A98G".to_string(),
        user_name: "Ada Lovelace".to_string(),
        user_description: Some("Analyst".to_string()),
        user_avatar_url: None,
        access_token: "li-access".to_string(),
        access_token_secret: None,
        refresh_token: None,
        expires_at: None,
    }
}

pub fn signed_identity() -> Identity {
    Identity {
        provider: "twitter".to_string(),
        user_id: "783214".to_string(),
        user_name: "Twitter".to_string(),
        user_description: None,
        user_avatar_url: Some("https://pbs.twimg.com/a.png".to_string()),
        access_token: "tw-access".to_string(),
        access_token_secret: Some("tw-access-secret".to_string()),
        refresh_token: None,
        expires_at: None,
    }
}
