//! # OAuth 联合认证服务
//!
//! 按提供方的认证方案驱动 begin / complete 握手，产出统一的 [`Identity`]。
//!
//! 每个 (会话, 提供方) 的状态机：
//! `Unauthenticated → PendingProvider → Authenticated`。中间状态
//! （[`PendingFlow`]）由客户端持有，服务端不保存任何会话。

use std::sync::Arc;

use chrono::Duration;

use super::pending::PendingFlow;
use super::strategies::{AuthFlow, BearerTokenFlow, CallbackParams, RequestSignedFlow};
use crate::error::AuthError;
use crate::logging::{LogComponent, LogStage};
use crate::provider::{AuthScheme, ProviderIndex, RegisteredProvider};
use crate::types::Identity;
use crate::{linfo, lwarn};

/// begin 的结果
#[derive(Debug, Clone)]
pub struct BeginAuth {
    /// 提供方授权页地址
    pub authorize_url: String,
    /// 需要交给客户端保存的握手状态
    pub pending: PendingFlow,
}

/// OAuth 联合登录服务：按提供方的认证方案分派到对应流程
pub struct FederationService {
    index: Arc<ProviderIndex>,
    bearer: BearerTokenFlow,
    signed: RequestSignedFlow,
    pending_ttl: Duration,
}

impl FederationService {
    /// 创建服务，两种流程共享同一个 HTTP 客户端
    pub fn new(index: Arc<ProviderIndex>, http_client: reqwest::Client, pending_ttl: Duration) -> Self {
        Self {
            index,
            bearer: BearerTokenFlow::new(http_client.clone()),
            signed: RequestSignedFlow::new(http_client),
            pending_ttl,
        }
    }

    /// 提供方索引，供边界层渲染可选的提供方
    pub const fn provider_index(&self) -> &Arc<ProviderIndex> {
        &self.index
    }

    fn flow_for(&self, scheme: AuthScheme) -> &dyn AuthFlow {
        match scheme {
            AuthScheme::BearerToken => &self.bearer,
            AuthScheme::RequestSigned => &self.signed,
        }
    }

    fn lookup(&self, provider: &str) -> Result<&RegisteredProvider, AuthError> {
        self.index
            .get(provider)
            .ok_or_else(|| AuthError::UnknownProvider(provider.to_string()))
    }

    /// 开始认证：返回提供方授权地址和需要客户端保存的 `PendingFlow`
    pub async fn begin_auth(&self, provider: &str) -> Result<BeginAuth, AuthError> {
        let registered = self.lookup(provider)?;
        let redirect = self.flow_for(registered.scheme()).begin(registered).await?;

        linfo!(
            "system",
            LogStage::Authentication,
            LogComponent::OAuth,
            "begin_auth",
            &format!(
                "redirecting to provider `{provider}` ({})",
                registered.scheme()
            )
        );

        Ok(BeginAuth {
            authorize_url: redirect.authorize_url,
            pending: PendingFlow::new(provider, redirect.state, self.pending_ttl),
        })
    }

    /// 完成认证
    ///
    /// 缺少 pending flow、pending flow 属于其他提供方或防伪材料不匹配时返回
    /// `CsrfStateMismatch`，此时不会发出任何网络请求。
    pub async fn complete_auth(
        &self,
        provider: &str,
        pending: Option<&PendingFlow>,
        params: &CallbackParams,
    ) -> Result<Identity, AuthError> {
        let registered = self.lookup(provider)?;

        let Some(pending) = pending.filter(|p| p.provider == provider) else {
            lwarn!(
                "system",
                LogStage::Callback,
                LogComponent::OAuth,
                "missing_pending_flow",
                &format!("callback for `{provider}` without a matching pending flow")
            );
            return Err(AuthError::csrf(provider));
        };

        self.flow_for(registered.scheme())
            .complete(registered, &pending.state, params)
            .await
    }
}
