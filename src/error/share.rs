//! Share dispatch and publish errors.
//!
//! A publish error is scoped to one provider and never aborts a fan-out.

use thiserror::Error;

/// Adapter resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// 缺少可用的身份或凭证
    #[error("no share adapter available for provider `{provider}`: {reason}")]
    AdapterUnavailable {
        /// 提供方名称
        provider: String,
        /// 失败原因
        reason: String,
    },
}

/// Failure of one provider's publish call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// 状态文本超出长度上限
    #[error("status text is {length} characters, the limit is {max}")]
    LengthExceeded {
        /// 实际字符数
        length: usize,
        /// 上限
        max: usize,
    },

    /// `status` is `None` when the request never produced a response.
    #[error("provider request failed ({}): {body}", status_label(.status))]
    HttpFailure {
        /// HTTP 状态码
        status: Option<u16>,
        /// 响应体或传输错误描述
        body: String,
    },

    /// 该提供方没有可用的适配器
    #[error("no share adapter available for provider `{provider}`")]
    AdapterUnavailable {
        /// 提供方名称
        provider: String,
    },

    /// 文章缺少必填字段
    #[error("article field `{field}` is required")]
    InvalidArticle {
        /// 字段名
        field: &'static str,
    },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "transport".to_string(), |s| format!("HTTP {s}"))
}

impl PublishError {
    /// 从 reqwest 错误构造，保留可能存在的状态码
    pub fn transport(err: &reqwest::Error) -> Self {
        Self::HttpFailure {
            status: err.status().map(|s| s.as_u16()),
            body: err.to_string(),
        }
    }
}

impl From<DispatchError> for PublishError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::AdapterUnavailable { provider, .. } => {
                Self::AdapterUnavailable { provider }
            }
        }
    }
}
