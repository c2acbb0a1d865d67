//! # Bearer token 认证流程
//!
//! OAuth 2.0 授权码模式：授权码换取不透明 access token，再用它拉取用户资料。

use async_trait::async_trait;
use chrono::{Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope};
use reqwest::header::ACCEPT;
use serde::Deserialize;

use super::traits::{AuthFlow, AuthRedirect, CallbackParams};
use crate::auth::pending::PendingState;
use crate::error::AuthError;
use crate::logging::{LogComponent, LogStage};
use crate::provider::RegisteredProvider;
use crate::types::Identity;
use crate::utils::truncate_body;
use crate::{ldebug, linfo, lwarn};

/// 令牌响应（LinkedIn 不返回 `token_type`）
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiteProfile {
    id: String,
    #[serde(default)]
    localized_first_name: String,
    #[serde(default)]
    localized_last_name: String,
    localized_headline: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenIdProfile {
    sub: String,
    #[serde(default)]
    name: String,
    picture: Option<String>,
}

/// 支持 `/v2/me` 精简资料和 OpenID userinfo 两种格式
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Profile {
    Lite(LiteProfile),
    OpenId(OpenIdProfile),
}

struct ProfileFields {
    user_id: String,
    user_name: String,
    user_description: Option<String>,
    user_avatar_url: Option<String>,
}

impl From<Profile> for ProfileFields {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Lite(p) => Self {
                user_id: p.id,
                user_name: format!("{} {}", p.localized_first_name, p.localized_last_name)
                    .trim()
                    .to_string(),
                user_description: p.localized_headline.filter(|h| !h.is_empty()),
                user_avatar_url: None,
            },
            Profile::OpenId(p) => Self {
                user_id: p.sub,
                user_name: p.name,
                user_description: None,
                user_avatar_url: p.picture.filter(|u| !u.is_empty()),
            },
        }
    }
}

/// OAuth 2.0 授权码流程
#[derive(Debug, Clone)]
pub struct BearerTokenFlow {
    http_client: reqwest::Client,
}

impl BearerTokenFlow {
    /// 创建流程
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn exchange_code(
        &self,
        provider: &RegisteredProvider,
        code: &str,
    ) -> Result<TokenResponse, AuthError> {
        let name = provider.name();
        let config = &provider.config;
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.callback_url.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", config.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&provider.endpoints.token_url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::exchange(name, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::exchange(name, e))?;

        if !status.is_success() {
            return Err(AuthError::exchange(
                name,
                format!("HTTP {status}: {}", truncate_body(&body)),
            ));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::exchange(name, format!("unreadable token response: {e}")))?;

        if let Some(error) = &token.error {
            return Err(AuthError::exchange(
                name,
                format!(
                    "{error}: {}",
                    token.error_description.as_deref().unwrap_or_default()
                ),
            ));
        }
        if token.access_token.is_empty() {
            return Err(AuthError::exchange(name, "token response carried no access_token"));
        }

        Ok(token)
    }

    async fn fetch_profile(
        &self,
        provider: &RegisteredProvider,
        access_token: &str,
    ) -> Result<ProfileFields, AuthError> {
        let name = provider.name();
        let response = self
            .http_client
            .get(&provider.endpoints.profile_url)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AuthError::profile(name, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::profile(name, e))?;

        if !status.is_success() {
            return Err(AuthError::profile(
                name,
                format!("HTTP {status}: {}", truncate_body(&body)),
            ));
        }

        let profile: Profile = serde_json::from_str(&body)
            .map_err(|e| AuthError::profile(name, format!("unreadable profile: {e}")))?;
        Ok(profile.into())
    }
}

#[async_trait]
impl AuthFlow for BearerTokenFlow {
    async fn begin(&self, provider: &RegisteredProvider) -> Result<AuthRedirect, AuthError> {
        let config = &provider.config;
        let auth_url = AuthUrl::new(provider.endpoints.authorize_url.clone())
            .map_err(|e| AuthError::exchange(provider.name(), format!("invalid authorize url: {e}")))?;
        let redirect_url = RedirectUrl::new(config.callback_url.clone())
            .map_err(|e| AuthError::exchange(provider.name(), format!("invalid callback url: {e}")))?;

        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_redirect_uri(redirect_url);

        let (authorize_url, csrf_state) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(config.scopes.iter().cloned().map(Scope::new))
            .url();

        ldebug!(
            "system",
            LogStage::Authentication,
            LogComponent::OAuth,
            "build_auth_url",
            &format!("authorization URL built for provider `{}`", provider.name())
        );

        Ok(AuthRedirect {
            authorize_url: authorize_url.to_string(),
            state: PendingState::Bearer {
                state: csrf_state.secret().clone(),
            },
        })
    }

    async fn complete(
        &self,
        provider: &RegisteredProvider,
        pending: &PendingState,
        params: &CallbackParams,
    ) -> Result<Identity, AuthError> {
        let name = provider.name();

        let PendingState::Bearer { state: expected } = pending else {
            return Err(AuthError::csrf(name));
        };
        if params.state.as_deref() != Some(expected.as_str()) {
            lwarn!(
                "system",
                LogStage::Callback,
                LogComponent::OAuth,
                "state_mismatch",
                &format!("callback state does not match pending flow for `{name}`")
            );
            return Err(AuthError::csrf(name));
        }

        if let Some(error) = &params.error {
            return Err(AuthError::exchange(
                name,
                format!(
                    "provider returned `{error}`: {}",
                    params.error_description.as_deref().unwrap_or_default()
                ),
            ));
        }
        let code = params
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuthError::exchange(name, "callback carried no authorization code"))?;

        let token = self.exchange_code(provider, code).await?;
        let profile = self.fetch_profile(provider, &token.access_token).await?;

        linfo!(
            "system",
            LogStage::Callback,
            LogComponent::OAuth,
            "bearer_auth_complete",
            &format!("authenticated `{}` with provider `{name}`", profile.user_id)
        );

        Ok(Identity {
            provider: name.to_string(),
            user_id: profile.user_id,
            user_name: profile.user_name,
            user_description: profile.user_description,
            user_avatar_url: profile.user_avatar_url,
            access_token: token.access_token,
            access_token_secret: None,
            refresh_token: token.refresh_token.filter(|t| !t.is_empty()),
            expires_at: token
                .expires_in
                .filter(|secs| *secs > 0)
                .and_then(Duration::try_seconds)
                .and_then(|ttl| Utc::now().checked_add_signed(ttl)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lite_profile_maps_to_identity_fields() {
        let profile: Profile = serde_json::from_str(
            r#"{"id":"abc","localizedFirstName":"Ada","localizedLastName":"Lovelace","localizedHeadline":"Analyst"}"#,
        )
        .unwrap();
        let fields = ProfileFields::from(profile);
        assert_eq!(fields.user_id, "abc");
        assert_eq!(fields.user_name, "Ada Lovelace");
        assert_eq!(fields.user_description.as_deref(), Some("Analyst"));
    }

    #[test]
    fn openid_profile_maps_to_identity_fields() {
        let profile: Profile = serde_json::from_str(
            r#"{"sub":"xyz","name":"Grace Hopper","picture":"https://img.example/g.png"}"#,
        )
        .unwrap();
        let fields = ProfileFields::from(profile);
        assert_eq!(fields.user_id, "xyz");
        assert_eq!(fields.user_avatar_url.as_deref(), Some("https://img.example/g.png"));
    }

    #[test]
    fn token_response_without_token_type_parses() {
        let token: TokenResponse =
            serde_json::from_str(r#"{"access_token":"AQX","expires_in":5184000}"#).unwrap();
        assert_eq!(token.access_token, "AQX");
        assert_eq!(token.expires_in, Some(5_184_000));
    }
}
