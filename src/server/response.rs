//! # 统一响应格式
//!
//! 成功响应：`{success: true, data, timestamp}`；
//! 错误响应：`{success: false, error: {code, message}, timestamp}`。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ErrorCategory, GocialError};
use crate::logging::{LogComponent, LogStage};
use crate::{lerror, lwarn};

/// 成功响应体
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    /// 恒为 `true`
    pub success: bool,
    /// 响应数据
    pub data: T,
    /// 响应时间
    pub timestamp: DateTime<Utc>,
}

/// 错误详情
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    /// 错误码
    pub code: String,
    /// 错误描述
    pub message: String,
}

/// 错误响应体
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 恒为 `false`
    pub success: bool,
    /// 错误详情
    pub error: ErrorInfo,
    /// 响应时间
    pub timestamp: DateTime<Utc>,
}

/// 成功响应
pub fn success<T: Serialize>(data: T) -> Response {
    let body = SuccessResponse {
        success: true,
        data,
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// 处理器错误：包装 [`GocialError`] 并映射为 HTTP 状态码与错误码
#[derive(Debug)]
pub struct ApiError(pub GocialError);

impl<E> From<E> for ApiError
where
    E: Into<GocialError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.0.to_http_response_parts();
        let message = self.0.to_string();

        match self.0.category() {
            ErrorCategory::Server => lerror!(
                "system",
                LogStage::Error,
                LogComponent::Server,
                "request_failed",
                &message,
                code = code,
                status = status.as_u16()
            ),
            ErrorCategory::Client => lwarn!(
                "system",
                LogStage::Error,
                LogComponent::Server,
                "request_rejected",
                &message,
                code = code,
                status = status.as_u16()
            ),
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorInfo {
                code: code.to_string(),
                message,
            },
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}
