//! # OAuth 联合认证模块
//!
//! - `federation`：按提供方驱动握手的 `FederationService`
//! - `strategies`：bearer token / request-signed 两种认证流程
//! - `pending`：begin 与 callback 之间由客户端持有的防伪材料
//! - `oauth1`：OAuth 1.0a HMAC-SHA1 请求签名

pub mod federation;
pub mod oauth1;
pub mod pending;
pub mod strategies;

pub use federation::{BeginAuth, FederationService};
pub use oauth1::OAuth1Signer;
pub use pending::{PendingFlow, PendingState};
pub use strategies::{AuthFlow, AuthRedirect, CallbackParams};
