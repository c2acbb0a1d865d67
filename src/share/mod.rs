//! # 内容分享
//!
//! `ShareDispatcher` 把规范化身份解析为对应认证方案的 `ShareAdapter`，
//! 每个适配器负责一种提供方的发布协议。

pub mod bearer;
pub mod dispatcher;
pub mod signed;

use std::collections::BTreeMap;
use std::fmt::Display;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

pub use bearer::BearerTokenAdapter;
pub use dispatcher::ShareDispatcher;
pub use signed::{MAX_STATUS_LENGTH, RequestSignedAdapter};

use crate::error::PublishError;
use crate::provider::AuthScheme;
use crate::types::ArticleShare;

/// 发布适配器：使用身份自带的 token 向单个提供方发布
#[async_trait]
pub trait ShareAdapter: Send + Sync {
    /// 提供方名称
    fn provider(&self) -> &str;

    /// 认证方案
    fn scheme(&self) -> AuthScheme;

    /// 发布一篇文章
    async fn publish(&self, article: &ArticleShare) -> Result<(), PublishError>;
}

/// 未认证原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIdentity {
    /// 没有该提供方的 cookie
    NotFound,
    /// cookie 存在但签名、格式或有效期不合格
    Invalid,
}

/// 单个提供方的分享结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShareOutcome {
    /// 发布成功
    Shared,
    /// 没有可用的身份
    NotAuthenticated {
        /// 未认证原因
        reason: MissingIdentity,
    },
    /// 发布失败
    Failed {
        /// 提供方或传输错误
        #[serde(serialize_with = "serialize_display")]
        error: PublishError,
    },
}

impl ShareOutcome {
    /// 是否发布成功
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }
}

fn serialize_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// 分享报告：按提供方名称排序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShareReport {
    /// 提供方名称到结果
    pub outcomes: BTreeMap<String, ShareOutcome>,
}

impl ShareReport {
    /// 单个提供方的结果
    pub fn get(&self, provider: &str) -> Option<&ShareOutcome> {
        self.outcomes.get(provider)
    }

    /// 发布成功的数量
    pub fn shared_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_shared()).count()
    }

    /// 至少一个提供方失败（不含未认证）
    pub fn has_failures(&self) -> bool {
        self.outcomes
            .values()
            .any(|o| matches!(o, ShareOutcome::Failed { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_as_provider_map() {
        let mut report = ShareReport::default();
        report.outcomes.insert("twitter".to_string(), ShareOutcome::Shared);
        report.outcomes.insert(
            "linkedin".to_string(),
            ShareOutcome::Failed {
                error: PublishError::HttpFailure {
                    status: Some(401),
                    body: "expired".to_string(),
                },
            },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["twitter"]["status"], "shared");
        assert_eq!(json["linkedin"]["status"], "failed");
        assert_eq!(
            json["linkedin"]["error"],
            "provider request failed (HTTP 401): expired"
        );
        assert_eq!(report.shared_count(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn test_not_authenticated_shape() {
        let outcome = ShareOutcome::NotAuthenticated {
            reason: MissingIdentity::Invalid,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"status": "not_authenticated", "reason": "invalid"}));
    }
}
