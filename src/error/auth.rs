//! Errors related to the OAuth federation handshake.
//!
//! Every variant aborts one authentication attempt; the user can retry.

use thiserror::Error;

/// Failures of a single begin or complete attempt.
#[derive(Debug, Error)]
pub enum AuthError {
    /// 名称未注册
    #[error("unknown provider `{0}`")]
    UnknownProvider(String),

    /// The callback's state (or request token) does not match the pending
    /// flow issued at begin, or no pending flow was presented at all.
    #[error("anti-forgery state mismatch for provider `{provider}`")]
    CsrfStateMismatch {
        /// 提供方名称
        provider: String,
    },

    /// 临时凭证请求失败
    #[error("request token step failed for provider `{provider}`: {reason}")]
    RequestTokenFailed {
        /// 提供方名称
        provider: String,
        /// 失败原因
        reason: String,
    },

    /// 授权码或 verifier 换取 token 失败
    #[error("token exchange failed for provider `{provider}`: {reason}")]
    ExchangeFailed {
        /// 提供方名称
        provider: String,
        /// 失败原因
        reason: String,
    },

    /// 用户资料请求失败或响应无法解析
    #[error("profile fetch failed for provider `{provider}`: {reason}")]
    ProfileFetchFailed {
        /// 提供方名称
        provider: String,
        /// 失败原因
        reason: String,
    },
}

impl AuthError {
    /// 防伪校验失败
    pub fn csrf(provider: impl Into<String>) -> Self {
        Self::CsrfStateMismatch {
            provider: provider.into(),
        }
    }

    /// 临时凭证请求失败
    pub fn request_token(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::RequestTokenFailed {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// 换取 token 失败
    pub fn exchange(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::ExchangeFailed {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// 拉取资料失败
    pub fn profile(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::ProfileFetchFailed {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// Provider the failed attempt was made against.
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::UnknownProvider(provider)
            | Self::CsrfStateMismatch { provider }
            | Self::RequestTokenFailed { provider, .. }
            | Self::ExchangeFailed { provider, .. }
            | Self::ProfileFetchFailed { provider, .. } => provider,
        }
    }
}
