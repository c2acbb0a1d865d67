//! # 日志配置模块
//!
//! 结构化日志：每条日志都带 `request_id`、处理阶段、组件和操作名，
//! 通过 `linfo!` / `lwarn!` / `lerror!` / `ldebug!` 宏统一输出。

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 请求处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStage {
    /// 启动
    Startup,
    /// 关闭
    Shutdown,
    /// 加载配置
    Configuration,
    /// 发起认证
    Authentication,
    /// 处理回调
    Callback,
    /// 分享
    Share,
    /// 调用提供方 API
    ExternalApi,
    /// 内部处理
    Internal,
    /// 错误响应
    Error,
}

impl LogStage {
    /// 日志字段取值
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::Callback => "callback",
            Self::Share => "share",
            Self::ExternalApi => "external_api",
            Self::Internal => "internal",
            Self::Error => "error",
        }
    }
}

/// 产生日志的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogComponent {
    /// 二进制入口
    Main,
    /// 配置管理器
    Config,
    /// 提供方索引
    Registry,
    /// OAuth 握手
    OAuth,
    /// OAuth 1.0a 签名客户端
    OAuth1,
    /// 身份存储
    IdentityStore,
    /// 分享分发器
    Dispatcher,
    /// 分享适配器
    ShareAdapter,
    /// HTTP 边界
    Server,
}

impl LogComponent {
    /// 日志字段取值
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Config => "config",
            Self::Registry => "registry",
            Self::OAuth => "oauth",
            Self::OAuth1 => "oauth1",
            Self::IdentityStore => "identity_store",
            Self::Dispatcher => "dispatcher",
            Self::ShareAdapter => "share_adapter",
            Self::Server => "server",
        }
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_event {
    ($level:expr, $rid:expr, $stage:expr, $component:expr, $op:expr, $msg:expr $(, $($fields:tt)+)?) => {
        ::tracing::event!(
            $level,
            request_id = %$rid,
            stage = $stage.as_str(),
            component = $component.as_str(),
            operation = $op,
            $($($fields)+,)?
            "{}",
            $msg
        )
    };
}

/// INFO 级结构化日志
#[macro_export]
macro_rules! linfo {
    ($($args:tt)+) => { $crate::__log_event!(::tracing::Level::INFO, $($args)+) };
}

/// WARN 级结构化日志
#[macro_export]
macro_rules! lwarn {
    ($($args:tt)+) => { $crate::__log_event!(::tracing::Level::WARN, $($args)+) };
}

/// ERROR 级结构化日志
#[macro_export]
macro_rules! lerror {
    ($($args:tt)+) => { $crate::__log_event!(::tracing::Level::ERROR, $($args)+) };
}

/// DEBUG 级结构化日志
#[macro_export]
macro_rules! ldebug {
    ($($args:tt)+) => { $crate::__log_event!(::tracing::Level::DEBUG, $($args)+) };
}

/// 初始化日志系统
///
/// `RUST_LOG` 优先；否则使用 `log_level`（默认 `info`）。
pub fn init_logging(log_level: Option<&str>) {
    let filter = build_filter(log_level);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();

    // 已有全局 subscriber（例如测试中重复初始化）时沿用现有的
    if let Err(err) = installed {
        crate::ldebug!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "logging_already_initialized",
            &format!("keeping the existing subscriber: {err}")
        );
    }
}

/// 构建日志过滤器：`RUST_LOG` 合法时使用它，否则按 `log_level` 生成默认规则
fn build_filter(log_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = log_level.unwrap_or("info");
        EnvFilter::new(format!("{level},gocial={level},hyper=warn,reqwest=warn"))
    })
}
