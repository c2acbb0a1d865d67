//! Request-signed 发布适配器（状态更新）

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use super::ShareAdapter;
use crate::auth::OAuth1Signer;
use crate::error::PublishError;
use crate::logging::{LogComponent, LogStage};
use crate::provider::AuthScheme;
use crate::types::ArticleShare;
use crate::utils::truncate_body;
use crate::ldebug;

/// 状态文本的最大字符数
pub const MAX_STATUS_LENGTH: usize = 280;

/// request-signed 方案的发布适配器（Twitter 状态更新）
#[derive(Debug, Clone)]
pub struct RequestSignedAdapter {
    provider: String,
    publish_url: String,
    signer: OAuth1Signer,
    http_client: reqwest::Client,
}

impl RequestSignedAdapter {
    /// 创建适配器，`signer` 必须已带上用户的 token
    pub fn new(
        provider: impl Into<String>,
        publish_url: impl Into<String>,
        signer: OAuth1Signer,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            provider: provider.into(),
            publish_url: publish_url.into(),
            signer,
            http_client,
        }
    }

    /// `comment + " " + url`
    pub fn status_text(article: &ArticleShare) -> String {
        format!("{} {}", article.comment, article.url)
    }
}

#[async_trait]
impl ShareAdapter for RequestSignedAdapter {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn scheme(&self) -> AuthScheme {
        AuthScheme::RequestSigned
    }

    async fn publish(&self, article: &ArticleShare) -> Result<(), PublishError> {
        let status = Self::status_text(article);
        let length = status.chars().count();
        if length > MAX_STATUS_LENGTH {
            return Err(PublishError::LengthExceeded {
                length,
                max: MAX_STATUS_LENGTH,
            });
        }

        let form = [("status", status.as_str())];
        let header = self
            .signer
            .authorization_header("POST", &self.publish_url, &[], &form)
            .map_err(|e| PublishError::HttpFailure {
                status: None,
                body: format!("invalid publish url: {e}"),
            })?;

        let response = self
            .http_client
            .post(&self.publish_url)
            .header(AUTHORIZATION, header)
            .form(&form)
            .send()
            .await
            .map_err(|e| PublishError::transport(&e))?;

        let code = response.status();
        if !code.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::HttpFailure {
                status: Some(code.as_u16()),
                body: truncate_body(&body),
            });
        }

        ldebug!(
            "system",
            LogStage::ExternalApi,
            LogComponent::ShareAdapter,
            "status_published",
            &format!("status published to `{}` ({length} chars)", self.provider)
        );
        Ok(())
    }
}
