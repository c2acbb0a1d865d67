//! # Gocial
//!
//! 多提供方 OAuth 联合登录、无状态凭证令牌以及文章跨平台分享。

pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod provider;
pub mod server;
pub mod share;
pub mod token;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{GocialError, Result};
