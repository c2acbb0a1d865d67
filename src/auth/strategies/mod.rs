//! # 认证流程
//!
//! 每种认证方案一个实现：
//! - `bearer_token`：OAuth 2.0 授权码
//! - `request_signed`：OAuth 1.0a 三段式

pub mod bearer_token;
pub mod request_signed;
pub mod traits;

pub use bearer_token::BearerTokenFlow;
pub use request_signed::RequestSignedFlow;
pub use traits::{AuthFlow, AuthRedirect, CallbackParams};
