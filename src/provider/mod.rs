//! Provider registry module。
//!
//! - `types`：提供方配置、认证方案与端点预设
//! - `registry`：启动时构建的只读 `ProviderIndex`

mod registry;
mod types;

pub use registry::{ProviderIndex, RegisteredProvider};
pub use types::{AuthScheme, ProviderConfig, ProviderEndpoints};
