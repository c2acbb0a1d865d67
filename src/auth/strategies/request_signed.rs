//! # Request-signed 认证流程
//!
//! OAuth 1.0a 三段式：request token → 用户授权 → access token，
//! 所有请求都用 HMAC-SHA1 签名。

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use url::Url;

use super::traits::{AuthFlow, AuthRedirect, CallbackParams};
use crate::auth::oauth1::{OAuth1Signer, parse_form_response};
use crate::auth::pending::PendingState;
use crate::error::AuthError;
use crate::logging::{LogComponent, LogStage};
use crate::provider::RegisteredProvider;
use crate::types::Identity;
use crate::utils::truncate_body;
use crate::{linfo, lwarn};

/// `verify_credentials` 响应中用到的字段
#[derive(Debug, Deserialize)]
struct Credentials {
    id_str: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    screen_name: String,
    description: Option<String>,
    profile_image_url_https: Option<String>,
}

/// OAuth 1.0a 三步握手（request token、用户授权、access token）
#[derive(Debug, Clone)]
pub struct RequestSignedFlow {
    http_client: reqwest::Client,
}

impl RequestSignedFlow {
    /// 创建流程
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    fn consumer(provider: &RegisteredProvider) -> OAuth1Signer {
        OAuth1Signer::new(
            provider.config.client_id.clone(),
            provider.config.client_secret.clone(),
        )
    }

    /// 发送签名 POST，返回成功响应体
    async fn signed_post(
        &self,
        signer: &OAuth1Signer,
        url: &str,
        oauth_extra: &[(&str, &str)],
    ) -> Result<String, String> {
        let header = signer
            .authorization_header("POST", url, oauth_extra, &[])
            .map_err(|e| format!("invalid url `{url}`: {e}"))?;

        let response = self
            .http_client
            .post(url)
            .header(AUTHORIZATION, header)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("HTTP {status}: {}", truncate_body(&body)));
        }
        Ok(body)
    }

    async fn verify_credentials(
        &self,
        provider: &RegisteredProvider,
        token: &str,
        token_secret: &str,
    ) -> Result<Credentials, AuthError> {
        let name = provider.name();
        let url = &provider.endpoints.profile_url;
        let header = Self::consumer(provider)
            .with_token(token, token_secret)
            .authorization_header("GET", url, &[], &[])
            .map_err(|e| AuthError::profile(name, e))?;

        let response = self
            .http_client
            .get(url)
            .header(AUTHORIZATION, header)
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

        serde_json::from_str(&body)
            .map_err(|e| AuthError::profile(name, format!("unreadable profile: {e}")))
    }
}

#[async_trait]
impl AuthFlow for RequestSignedFlow {
    async fn begin(&self, provider: &RegisteredProvider) -> Result<AuthRedirect, AuthError> {
        let name = provider.name();
        let request_token_url = provider
            .endpoints
            .request_token_url
            .as_deref()
            .ok_or_else(|| AuthError::request_token(name, "no request token endpoint"))?;

        let body = self
            .signed_post(
                &Self::consumer(provider),
                request_token_url,
                &[("oauth_callback", provider.config.callback_url.as_str())],
            )
            .await
            .map_err(|reason| AuthError::request_token(name, reason))?;

        let mut fields = parse_form_response(&body);
        if fields
            .get("oauth_callback_confirmed")
            .is_some_and(|confirmed| confirmed != "true")
        {
            return Err(AuthError::request_token(name, "callback not confirmed"));
        }
        let (Some(request_token), Some(request_token_secret)) = (
            fields.remove("oauth_token").filter(|t| !t.is_empty()),
            fields.remove("oauth_token_secret"),
        ) else {
            return Err(AuthError::request_token(
                name,
                "response carried no oauth_token/oauth_token_secret",
            ));
        };

        let mut authorize_url = Url::parse(&provider.endpoints.authorize_url)
            .map_err(|e| AuthError::request_token(name, format!("invalid authorize url: {e}")))?;
        authorize_url
            .query_pairs_mut()
            .append_pair("oauth_token", &request_token);

        Ok(AuthRedirect {
            authorize_url: authorize_url.to_string(),
            state: PendingState::Signed {
                request_token,
                request_token_secret,
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

        let PendingState::Signed {
            request_token,
            request_token_secret,
        } = pending
        else {
            return Err(AuthError::csrf(name));
        };

        // 用户拒绝授权时回调只带 `denied=<request token>`
        if let Some(denied) = &params.denied {
            if denied != request_token {
                return Err(AuthError::csrf(name));
            }
            return Err(AuthError::exchange(name, "user denied authorization"));
        }
        if params.oauth_token.as_deref() != Some(request_token.as_str()) {
            lwarn!(
                "system",
                LogStage::Callback,
                LogComponent::OAuth1,
                "request_token_mismatch",
                &format!("callback oauth_token does not match pending flow for `{name}`")
            );
            return Err(AuthError::csrf(name));
        }

        let verifier = params
            .oauth_verifier
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AuthError::exchange(name, "callback carried no oauth_verifier"))?;

        let signer = Self::consumer(provider).with_token(request_token, request_token_secret);
        let body = self
            .signed_post(
                &signer,
                &provider.endpoints.token_url,
                &[("oauth_verifier", verifier)],
            )
            .await
            .map_err(|reason| AuthError::exchange(name, reason))?;

        let mut fields = parse_form_response(&body);
        let (Some(access_token), Some(access_token_secret)) = (
            fields.remove("oauth_token").filter(|t| !t.is_empty()),
            fields.remove("oauth_token_secret"),
        ) else {
            return Err(AuthError::exchange(
                name,
                "response carried no oauth_token/oauth_token_secret",
            ));
        };

        let credentials = self
            .verify_credentials(provider, &access_token, &access_token_secret)
            .await?;

        linfo!(
            "system",
            LogStage::Callback,
            LogComponent::OAuth1,
            "signed_auth_complete",
            &format!("authenticated `{}` with provider `{name}`", credentials.id_str)
        );

        let user_name = if credentials.name.is_empty() {
            credentials.screen_name
        } else {
            credentials.name
        };

        Ok(Identity {
            provider: name.to_string(),
            user_id: credentials.id_str,
            user_name,
            user_description: credentials.description.filter(|d| !d.is_empty()),
            user_avatar_url: credentials.profile_image_url_https.filter(|u| !u.is_empty()),
            access_token,
            access_token_secret: Some(access_token_secret),
            refresh_token: None,
            expires_at: None,
        })
    }
}
