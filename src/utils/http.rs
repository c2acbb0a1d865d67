//! 共享的出站 HTTP 客户端

use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{GocialError, Result};

/// 错误信息中保留的响应体最大字节数
const MAX_ERROR_BODY_BYTES: usize = 512;

/// 构建带超时和 User-Agent 的 `reqwest::Client`，进程内共享（内部连接池）
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| GocialError::internal_with_source("failed to build HTTP client", e))
}

/// 截断提供方响应体，避免把大段 HTML 错误页写进日志和错误信息
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_with_defaults() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let short = "bad request";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(MAX_ERROR_BODY_BYTES);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with('…'));
        assert!(truncated.len() <= MAX_ERROR_BODY_BYTES + '…'.len_utf8());
    }
}
