//! # 认证流程特质
//!
//! 每种认证方案实现一个 `AuthFlow`，由 `FederationService` 按方案选择。

use async_trait::async_trait;
use serde::Deserialize;

use crate::auth::pending::PendingState;
use crate::error::AuthError;
use crate::provider::RegisteredProvider;
use crate::types::Identity;

/// begin 阶段的结果：跳转地址 + 需要客户端保存的防伪材料
#[derive(Debug, Clone)]
pub struct AuthRedirect {
    /// 提供方授权页地址
    pub authorize_url: String,
    /// 防伪材料
    pub state: PendingState,
}

/// 提供方回调携带的查询参数
///
/// bearer 方案使用 `code`/`state`/`error`，signed 方案使用
/// `oauth_token`/`oauth_verifier`/`denied`。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    /// 授权码
    pub code: Option<String>,
    /// 回传的 state
    pub state: Option<String>,
    /// OAuth1 临时凭证
    pub oauth_token: Option<String>,
    /// OAuth1 verifier
    pub oauth_verifier: Option<String>,
    /// 提供方返回的错误码
    pub error: Option<String>,
    /// 错误描述
    pub error_description: Option<String>,
    /// OAuth1 用户拒绝授权时的 token
    pub denied: Option<String>,
}

/// 认证流程接口
#[async_trait]
pub trait AuthFlow: Send + Sync {
    /// 生成授权跳转地址
    async fn begin(&self, provider: &RegisteredProvider) -> Result<AuthRedirect, AuthError>;

    /// 校验防伪材料，换取 token 并拉取用户资料
    ///
    /// 防伪校验必须先于任何网络请求。
    async fn complete(
        &self,
        provider: &RegisteredProvider,
        pending: &PendingState,
        params: &CallbackParams,
    ) -> Result<Identity, AuthError>;
}
