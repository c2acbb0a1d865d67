//! Cookie 身份存储
//!
//! 每个提供方一个 cookie：`<base>-<provider>`，值为凭证令牌。
//! 握手中间状态存放在 `<base>-pending-<provider>`。

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use time::OffsetDateTime;

use crate::auth::PendingFlow;
use crate::error::{StoreError, TokenError};
use crate::logging::{LogComponent, LogStage};
use crate::provider::ProviderIndex;
use crate::token::TokenCodec;
use crate::types::Identity;
use crate::{ldebug, lwarn};

/// 基于 cookie 的身份存储：每个提供方一个签名令牌 cookie，服务端不保存任何状态
#[derive(Debug, Clone)]
pub struct CookieIdentityStore {
    index: Arc<ProviderIndex>,
    codec: TokenCodec,
    base_cookie_name: String,
}

impl CookieIdentityStore {
    /// 创建存储，`base_cookie_name` 须已通过配置校验
    pub fn new(
        index: Arc<ProviderIndex>,
        codec: TokenCodec,
        base_cookie_name: impl Into<String>,
    ) -> Self {
        Self {
            index,
            codec,
            base_cookie_name: base_cookie_name.into(),
        }
    }

    /// 身份 cookie 名：`<base>-<provider>`
    pub fn cookie_name(&self, provider: &str) -> String {
        format!("{}-{provider}", self.base_cookie_name)
    }

    /// pending cookie 名：`<base>-pending-<provider>`
    pub fn pending_cookie_name(&self, provider: &str) -> String {
        format!("{}-pending-{provider}", self.base_cookie_name)
    }

    /// 写入（覆盖）该提供方的身份 cookie
    pub fn add(&self, jar: CookieJar, identity: &Identity) -> Result<CookieJar, StoreError> {
        if !self.index.contains(&identity.provider) {
            return Err(StoreError::UnknownProvider(identity.provider.clone()));
        }

        let token = self
            .codec
            .encode(identity)
            .map_err(|source| StoreError::EncodeFailed {
                provider: identity.provider.clone(),
                source,
            })?;

        let cookie = build_cookie(
            self.cookie_name(&identity.provider),
            token.value,
            token.expires_at,
            SameSite::Strict,
        );

        ldebug!(
            "system",
            LogStage::Callback,
            LogComponent::IdentityStore,
            "identity_stored",
            &format!(
                "stored credential for provider `{}` until {}",
                identity.provider, token.expires_at
            )
        );

        Ok(jar.add(cookie))
    }

    /// 读取并解码该提供方的身份
    pub fn get_by_provider(&self, jar: &CookieJar, provider: &str) -> Result<Identity, StoreError> {
        let cookie = jar.get(&self.cookie_name(provider)).ok_or_else(|| StoreError::NotFound {
            provider: provider.to_string(),
        })?;

        let identity = self
            .codec
            .decode(cookie.value())
            .map_err(|source| StoreError::DecodeFailed {
                provider: provider.to_string(),
                source,
            })?;

        // 签名有效但属于其他提供方的 token 不能跨 cookie 使用
        if identity.provider != provider {
            return Err(StoreError::DecodeFailed {
                provider: provider.to_string(),
                source: TokenError::Malformed(format!(
                    "token issued for `{}`",
                    identity.provider
                )),
            });
        }

        Ok(identity)
    }

    /// 删除该提供方的身份 cookie
    pub fn delete(&self, jar: CookieJar, provider: &str) -> CookieJar {
        jar.remove(removal_cookie(self.cookie_name(provider)))
    }

    /// 注销所有提供方
    pub fn delete_all(&self, jar: CookieJar) -> CookieJar {
        self.index
            .names()
            .fold(jar, |jar, provider| self.delete(jar, provider))
    }

    /// 按索引顺序列出每个提供方的查找结果
    pub fn lookup_all(&self, jar: &CookieJar) -> Vec<(String, Result<Identity, StoreError>)> {
        self.index
            .names()
            .map(|provider| (provider.to_string(), self.get_by_provider(jar, provider)))
            .collect()
    }

    /// 按索引顺序列出所有可用身份，跳过缺失或无效的
    pub fn enumerate_available(&self, jar: &CookieJar) -> Vec<Identity> {
        self.lookup_all(jar)
            .into_iter()
            .filter_map(|(provider, result)| match result {
                Ok(identity) => Some(identity),
                Err(StoreError::NotFound { .. }) => None,
                Err(err) => {
                    ldebug!(
                        "system",
                        LogStage::Internal,
                        LogComponent::IdentityStore,
                        "skip_invalid_identity",
                        &format!("skipping provider `{provider}`: {err}")
                    );
                    None
                }
            })
            .collect()
    }

    /// 保存握手中间状态
    ///
    /// 使用 `SameSite=Lax`，以便在提供方跨站跳转回来时仍能被携带。
    pub fn save_pending(&self, jar: CookieJar, pending: &PendingFlow) -> Result<CookieJar, StoreError> {
        let sealed = self
            .codec
            .seal(pending)
            .map_err(|source| StoreError::EncodeFailed {
                provider: pending.provider.clone(),
                source,
            })?;

        let cookie = build_cookie(
            self.pending_cookie_name(&pending.provider),
            sealed,
            pending.expires_at(),
            SameSite::Lax,
        );
        Ok(jar.add(cookie))
    }

    /// 取出并清除握手中间状态，无效或缺失时返回 `None`
    pub fn take_pending(&self, jar: CookieJar, provider: &str) -> (CookieJar, Option<PendingFlow>) {
        let name = self.pending_cookie_name(provider);
        let Some(value) = jar.get(&name).map(|c| c.value().to_string()) else {
            return (jar, None);
        };
        let jar = jar.remove(removal_cookie(name));

        match self.codec.open::<PendingFlow>(&value) {
            Ok(pending) => (jar, Some(pending)),
            Err(err) => {
                lwarn!(
                    "system",
                    LogStage::Callback,
                    LogComponent::IdentityStore,
                    "pending_flow_rejected",
                    &format!("pending flow for `{provider}` rejected: {err}")
                );
                (jar, None)
            }
        }
    }
}

fn build_cookie(
    name: String,
    value: String,
    expires_at: DateTime<Utc>,
    same_site: SameSite,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(same_site);
    if let Ok(expires) = OffsetDateTime::from_unix_timestamp(expires_at.timestamp()) {
        builder = builder.expires(expires);
    }
    builder.build()
}

fn removal_cookie(name: String) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}
