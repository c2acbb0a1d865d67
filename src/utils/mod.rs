//! 通用工具

pub mod http;

pub use http::{build_http_client, truncate_body};
