//! Identity store errors.

use thiserror::Error;

use super::TokenError;

/// Cookie identity store errors, scoped to one provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 没有该提供方的 cookie
    #[error("no credential token stored for provider `{provider}`")]
    NotFound {
        /// 提供方名称
        provider: String,
    },

    /// cookie 存在但令牌无效或已过期
    #[error("credential token for provider `{provider}` could not be decoded")]
    DecodeFailed {
        /// 提供方名称
        provider: String,
        /// 解码错误
        #[source]
        source: TokenError,
    },

    /// 签发令牌失败
    #[error("credential token for provider `{provider}` could not be encoded")]
    EncodeFailed {
        /// 提供方名称
        provider: String,
        /// 编码错误
        #[source]
        source: TokenError,
    },

    /// 名称未注册
    #[error("provider `{0}` is not registered")]
    UnknownProvider(String),
}

impl StoreError {
    /// `true` when nothing was stored, as opposed to a stored but unusable token.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
