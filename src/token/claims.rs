//! Wire shape of an identity credential token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::codec::ExpiringClaims;
use crate::error::TokenError;
use crate::types::Identity;

/// JWT claim set carried by a credential token.
///
/// Optional fields are written as `null`. Present values, empty strings
/// included, read back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// 签发方，即提供方名称
    pub iss: String,
    /// 过期时间（unix 秒）
    pub exp: i64,
    /// 用户名
    #[serde(rename = "userName")]
    pub user_name: String,
    /// 提供方侧的用户 ID
    #[serde(rename = "userID")]
    pub user_id: String,
    /// 个人简介
    #[serde(rename = "userDescription", default)]
    pub user_description: Option<String>,
    /// 头像地址
    #[serde(rename = "userAvatarURL", default)]
    pub user_avatar_url: Option<String>,
    /// 提供方名称
    pub provider: String,
    /// 访问令牌
    #[serde(rename = "accessToken")]
    pub access_token: String,
    /// OAuth1 token secret
    #[serde(rename = "accessTokenSecret", default)]
    pub access_token_secret: Option<String>,
    /// 刷新令牌
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
}

impl IdentityClaims {
    /// 从身份构造声明，`exp` 由调用方决定
    pub fn from_identity(identity: &Identity, exp: i64) -> Self {
        Self {
            iss: identity.provider.clone(),
            exp,
            user_name: identity.user_name.clone(),
            user_id: identity.user_id.clone(),
            user_description: identity.user_description.clone(),
            user_avatar_url: identity.user_avatar_url.clone(),
            provider: identity.provider.clone(),
            access_token: identity.access_token.clone(),
            access_token_secret: identity.access_token_secret.clone(),
            refresh_token: identity.refresh_token.clone(),
        }
    }

    /// Rebuilds the identity. `expires_at` always reports the token's `exp`.
    pub fn into_identity(self) -> Result<Identity, TokenError> {
        if self.iss != self.provider {
            return Err(TokenError::Malformed(format!(
                "issuer `{}` does not match provider `{}`",
                self.iss, self.provider
            )));
        }

        let expires_at: DateTime<Utc> = DateTime::from_timestamp(self.exp, 0)
            .ok_or_else(|| TokenError::Malformed(format!("exp {} out of range", self.exp)))?;

        Ok(Identity {
            provider: self.provider,
            user_id: self.user_id,
            user_name: self.user_name,
            user_description: self.user_description,
            user_avatar_url: self.user_avatar_url,
            access_token: self.access_token,
            access_token_secret: self.access_token_secret,
            refresh_token: self.refresh_token,
            expires_at: Some(expires_at),
        })
    }
}

impl ExpiringClaims for IdentityClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}
