//! # 领域类型
//!
//! Canonical identity and article-share records shared by every component.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PublishError;

/// Canonical credential produced by a successful federation handshake.
///
/// Provider wire formats never leak past this type: both auth schemes map
/// their token and profile payloads onto the same shape.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// 提供方名称
    pub provider: String,
    /// 提供方侧的用户 ID
    #[serde(rename = "userID")]
    pub user_id: String,
    /// 用户名
    pub user_name: String,
    /// 个人简介
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
    /// 头像地址
    #[serde(default, rename = "userAvatarURL", skip_serializing_if = "Option::is_none")]
    pub user_avatar_url: Option<String>,
    /// 访问令牌
    pub access_token: String,
    /// Only populated for request-signed providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_secret: Option<String>,
    /// 刷新令牌
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// 访问令牌过期时间
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Public view of this identity, without any token material.
    #[must_use]
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary::from(self)
    }
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("provider", &self.provider)
            .field("user_id", &self.user_id)
            .field("user_name", &self.user_name)
            .field("user_description", &self.user_description)
            .field("user_avatar_url", &self.user_avatar_url)
            .field("access_token", &"<redacted>")
            .field(
                "access_token_secret",
                &self.access_token_secret.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Identity fields that are safe to hand back to a browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummary {
    /// 提供方名称
    pub provider: String,
    /// 提供方侧的用户 ID
    #[serde(rename = "userID")]
    pub user_id: String,
    /// 用户名
    pub user_name: String,
    /// 个人简介
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_description: Option<String>,
    /// 头像地址
    #[serde(rename = "userAvatarURL", skip_serializing_if = "Option::is_none")]
    pub user_avatar_url: Option<String>,
    /// 凭证过期时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        Self {
            provider: identity.provider.clone(),
            user_id: identity.user_id.clone(),
            user_name: identity.user_name.clone(),
            user_description: identity.user_description.clone(),
            user_avatar_url: identity.user_avatar_url.clone(),
            expires_at: identity.expires_at,
        }
    }
}

/// An article to republish on every connected provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleShare {
    /// 文章地址
    pub url: String,
    /// 文章标题
    pub title: String,
    /// 附言
    pub comment: String,
}

impl ArticleShare {
    /// 创建文章分享
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            comment: comment.into(),
        }
    }

    /// All three fields are required and must contain more than whitespace.
    pub fn validate(&self) -> Result<(), PublishError> {
        for (field, value) in [
            ("url", &self.url),
            ("title", &self.title),
            ("comment", &self.comment),
        ] {
            if value.trim().is_empty() {
                return Err(PublishError::InvalidArticle { field });
            }
        }
        Ok(())
    }
}
