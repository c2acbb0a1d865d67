//! # 错误类型定义

use axum::http::StatusCode;
use thiserror::Error;

use super::{AuthError, ConfigError, DispatchError, ErrorCategory, PublishError, StoreError};

/// 应用主要错误类型
#[derive(Debug, Error)]
pub enum GocialError {
    /// 配置相关错误
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// OAuth 握手错误
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// 身份存储错误
    #[error(transparent)]
    Store(#[from] StoreError),

    /// 适配器解析错误
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// 发布错误
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// IO相关错误
    #[error("IO error: {message}")]
    Io {
        /// 描述
        message: String,
        /// 底层错误
        #[source]
        source: std::io::Error,
    },

    /// 系统内部错误
    #[error("internal error: {message}")]
    Internal {
        /// 描述
        message: String,
        /// 底层错误
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 带上下文的错误，HTTP 映射沿用内部错误
    #[error("{context}")]
    Context {
        /// 上下文描述
        context: String,
        /// 原始错误
        #[source]
        source: Box<GocialError>,
    },
}

impl GocialError {
    /// 将错误转换为HTTP状态码和错误代码
    pub fn to_http_response_parts(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Self::Auth(err) => match err {
                AuthError::UnknownProvider(_) => (StatusCode::NOT_FOUND, "UNKNOWN_PROVIDER"),
                AuthError::CsrfStateMismatch { .. } => {
                    (StatusCode::FORBIDDEN, "CSRF_STATE_MISMATCH")
                }
                AuthError::RequestTokenFailed { .. } => {
                    (StatusCode::BAD_GATEWAY, "REQUEST_TOKEN_FAILED")
                }
                AuthError::ExchangeFailed { .. } => (StatusCode::BAD_GATEWAY, "EXCHANGE_FAILED"),
                AuthError::ProfileFetchFailed { .. } => {
                    (StatusCode::BAD_GATEWAY, "PROFILE_FETCH_FAILED")
                }
            },
            Self::Store(err) => match err {
                StoreError::NotFound { .. } => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
                StoreError::DecodeFailed { .. } => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
                StoreError::EncodeFailed { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_ENCODE_FAILED")
                }
                StoreError::UnknownProvider(_) => (StatusCode::NOT_FOUND, "UNKNOWN_PROVIDER"),
            },
            Self::Dispatch(_) => (StatusCode::NOT_FOUND, "ADAPTER_UNAVAILABLE"),
            Self::Publish(err) => match err {
                PublishError::InvalidArticle { .. } => (StatusCode::BAD_REQUEST, "INVALID_ARTICLE"),
                PublishError::LengthExceeded { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "LENGTH_EXCEEDED")
                }
                PublishError::HttpFailure { .. } => (StatusCode::BAD_GATEWAY, "PUBLISH_FAILED"),
                PublishError::AdapterUnavailable { .. } => {
                    (StatusCode::NOT_FOUND, "ADAPTER_UNAVAILABLE")
                }
            },
            Self::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Context { source, .. } => source.to_http_response_parts(),
        }
    }

    /// 错误归类，用于日志级别选择
    pub fn category(&self) -> ErrorCategory {
        if self.to_http_response_parts().0.is_server_error() {
            ErrorCategory::Server
        } else {
            ErrorCategory::Client
        }
    }

    /// 创建带来源的内部错误
    pub fn internal_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

// 自动转换常见错误类型
impl From<std::io::Error> for GocialError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: err,
        }
    }
}
