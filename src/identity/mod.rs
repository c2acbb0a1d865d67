//! # 身份存储
//!
//! 以客户端 cookie 保存每个提供方的凭证令牌，服务端无会话表。

mod cookie_store;

pub use cookie_store::CookieIdentityStore;
