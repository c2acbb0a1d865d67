//! Credential token codec errors.

use thiserror::Error;

/// Decode-time failures are always recoverable: the caller degrades to
/// "not authenticated with this provider".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// 签名校验失败
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// 格式错误或缺少必需声明
    #[error("token is malformed: {0}")]
    Malformed(String),

    /// 已过期
    #[error("token has expired")]
    Expired,

    /// Encode-time failure (claim serialization or signing).
    #[error("token could not be signed: {0}")]
    Encoding(String),
}
