//! Bearer token 发布适配器（UGC 文章分享）

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;

use super::ShareAdapter;
use crate::error::PublishError;
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};
use crate::provider::AuthScheme;
use crate::types::ArticleShare;
use crate::utils::truncate_body;

const RESTLI_PROTOCOL_HEADER: &str = "X-Restli-Protocol-Version";
const RESTLI_PROTOCOL_VERSION: &str = "2.0.0";

#[derive(Debug, Serialize)]
struct Text<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareMedia<'a> {
    status: &'static str,
    description: Text<'a>,
    original_url: &'a str,
    title: Text<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareContent<'a> {
    share_commentary: Text<'a>,
    share_media_category: &'static str,
    media: Vec<ShareMedia<'a>>,
}

#[derive(Debug, Serialize)]
struct SpecificContent<'a> {
    #[serde(rename = "com.linkedin.ugc.ShareContent")]
    share_content: ShareContent<'a>,
}

#[derive(Debug, Serialize)]
struct Visibility {
    #[serde(rename = "com.linkedin.ugc.MemberNetworkVisibility")]
    member_network_visibility: &'static str,
}

/// UGC 文章帖子
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UgcPost<'a> {
    author: String,
    lifecycle_state: &'static str,
    specific_content: SpecificContent<'a>,
    visibility: Visibility,
}

impl<'a> UgcPost<'a> {
    /// 构造一篇文章分享，`author` 为 `urn:li:person:<id>`
    pub fn article(author: String, article: &'a ArticleShare) -> Self {
        Self {
            author,
            lifecycle_state: "PUBLISHED",
            specific_content: SpecificContent {
                share_content: ShareContent {
                    share_commentary: Text {
                        text: &article.comment,
                    },
                    share_media_category: "ARTICLE",
                    media: vec![ShareMedia {
                        status: "READY",
                        description: Text {
                            text: &article.title,
                        },
                        original_url: &article.url,
                        title: Text {
                            text: &article.title,
                        },
                    }],
                },
            },
            visibility: Visibility {
                member_network_visibility: "PUBLIC",
            },
        }
    }
}

/// 作者 URN：`urn:li:person:<userID>`，已是 URN 时原样使用
pub fn author_urn(user_id: &str) -> String {
    if user_id.starts_with("urn:") {
        user_id.to_string()
    } else {
        format!("urn:li:person:{user_id}")
    }
}

/// bearer token 方案的发布适配器（LinkedIn UGC）
#[derive(Clone)]
pub struct BearerTokenAdapter {
    provider: String,
    publish_url: String,
    author: String,
    access_token: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for BearerTokenAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAdapter")
            .field("provider", &self.provider)
            .field("publish_url", &self.publish_url)
            .field("author", &self.author)
            .finish_non_exhaustive()
    }
}

impl BearerTokenAdapter {
    /// 创建适配器，作者 URN 由 `user_id` 推导
    pub fn new(
        provider: impl Into<String>,
        publish_url: impl Into<String>,
        user_id: &str,
        access_token: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            provider: provider.into(),
            publish_url: publish_url.into(),
            author: author_urn(user_id),
            access_token: access_token.into(),
            http_client,
        }
    }
}

#[async_trait]
impl ShareAdapter for BearerTokenAdapter {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn scheme(&self) -> AuthScheme {
        AuthScheme::BearerToken
    }

    async fn publish(&self, article: &ArticleShare) -> Result<(), PublishError> {
        let post = UgcPost::article(self.author.clone(), article);

        let response = self
            .http_client
            .post(&self.publish_url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(RESTLI_PROTOCOL_HEADER, RESTLI_PROTOCOL_VERSION)
            .json(&post)
            .send()
            .await
            .map_err(|e| PublishError::transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::HttpFailure {
                status: Some(status.as_u16()),
                body: truncate_body(&body),
            });
        }

        ldebug!(
            "system",
            LogStage::ExternalApi,
            LogComponent::ShareAdapter,
            "ugc_post_published",
            &format!("article published to `{}`", self.provider)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_author_urn() {
        assert_eq!(author_urn("GJ74B4A98G"), "urn:li:person:GJ74B4A98G");
        assert_eq!(author_urn("urn:li:person:abc"), "urn:li:person:abc");
    }

    #[test]
    fn test_ugc_payload_shape() {
        let article = ArticleShare::new("https://e.x/a", "Title", "Great read");
        let post = UgcPost::article(author_urn("abc"), &article);

        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            json!({
                "author": "urn:li:person:abc",
                "lifecycleState": "PUBLISHED",
                "specificContent": {
                    "com.linkedin.ugc.ShareContent": {
                        "shareCommentary": {"text": "Great read"},
                        "shareMediaCategory": "ARTICLE",
                        "media": [{
                            "status": "READY",
                            "description": {"text": "Title"},
                            "originalUrl": "https://e.x/a",
                            "title": {"text": "Title"}
                        }]
                    }
                },
                "visibility": {"com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"}
            })
        );
    }
}
