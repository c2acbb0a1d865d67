//! 握手中间状态（begin 与 callback 之间）
//!
//! 由客户端持有，使用与凭证令牌相同的签名原语封装，不在服务端存储。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::token::ExpiringClaims;

/// 防伪材料：bearer 方案为随机 state，signed 方案为 request token 及其 secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum PendingState {
    /// OAuth2 授权码流程
    Bearer {
        /// 随机 state，回调时必须原样返回
        state: String,
    },
    /// OAuth1 三步流程
    Signed {
        /// 临时凭证
        request_token: String,
        /// 临时凭证 secret，换取 access token 时签名用
        request_token_secret: String,
    },
}

/// 一次未完成的握手，封装后存入 pending cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingFlow {
    /// 提供方名称
    pub provider: String,
    /// 防伪材料
    #[serde(flatten)]
    pub state: PendingState,
    /// 过期时间（unix 秒）
    pub exp: i64,
}

impl PendingFlow {
    /// 创建握手状态，`ttl` 后失效
    pub fn new(provider: impl Into<String>, state: PendingState, ttl: Duration) -> Self {
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            provider: provider.into(),
            state,
            exp: expires_at.timestamp(),
        }
    }

    /// 过期时刻
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl ExpiringClaims for PendingFlow {
    fn exp(&self) -> i64 {
        self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;
    use crate::token::{SigningKey, open, seal};

    fn key() -> SigningKey {
        SigningKey::new("pending-flow-test-key-0123456789abcdef")
    }

    #[test]
    fn test_pending_flow_seals_and_opens() {
        let flow = PendingFlow::new(
            "twitter",
            PendingState::Signed {
                request_token: "rt".to_string(),
                request_token_secret: "rts".to_string(),
            },
            Duration::minutes(10),
        );
        let sealed = seal(&flow, &key()).unwrap();
        let opened: PendingFlow = open(&sealed, &key()).unwrap();
        assert_eq!(opened, flow);
    }

    #[test]
    fn test_expired_pending_flow_rejected() {
        let flow = PendingFlow::new(
            "linkedin",
            PendingState::Bearer {
                state: "abc".to_string(),
            },
            Duration::seconds(-5),
        );
        let sealed = seal(&flow, &key()).unwrap();
        assert_eq!(open::<PendingFlow>(&sealed, &key()), Err(TokenError::Expired));
    }

    #[test]
    fn test_wire_shape_is_tagged_by_scheme() {
        let flow = PendingFlow {
            provider: "linkedin".to_string(),
            state: PendingState::Bearer {
                state: "xyz".to_string(),
            },
            exp: 1,
        };
        let json = serde_json::to_value(&flow).unwrap();
        assert_eq!(json["scheme"], "bearer");
        assert_eq!(json["state"], "xyz");
    }
}
