//! # HTTP 边界
//!
//! 基于 axum 的 JSON 接口。处理器只做参数转换，核心服务通过 [`AppState`] 共享。

pub mod handlers;
pub mod response;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::auth::FederationService;
use crate::config::AppConfig;
use crate::error::{Context, GocialError, Result};
use crate::identity::CookieIdentityStore;
use crate::logging::{LogComponent, LogStage};
use crate::provider::ProviderIndex;
use crate::share::ShareDispatcher;
use crate::token::TokenCodec;
use crate::utils::build_http_client;
use crate::{lerror, linfo};

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    /// 提供方索引
    pub index: Arc<ProviderIndex>,
    /// OAuth 联合登录
    pub federation: Arc<FederationService>,
    /// cookie 身份存储
    pub store: Arc<CookieIdentityStore>,
    /// 分享分发器
    pub dispatcher: Arc<ShareDispatcher>,
    /// 登录完成后的跳转地址
    pub post_login_redirect: Arc<str>,
}

impl AppState {
    /// 从配置装配所有核心服务，共享同一个 HTTP 客户端
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let index = Arc::new(ProviderIndex::build(config.providers.clone())?);
        let http_client = build_http_client(&config.http)?;
        Ok(Self::with_client(config, index, http_client))
    }

    /// 使用外部提供的索引和客户端装配，便于测试
    pub fn with_client(
        config: &AppConfig,
        index: Arc<ProviderIndex>,
        http_client: reqwest::Client,
    ) -> Self {
        let pending_ttl = Duration::try_seconds(
            i64::try_from(config.auth.pending_ttl_secs).unwrap_or(i64::MAX),
        )
        .unwrap_or(Duration::MAX);
        let codec = TokenCodec::from_secret(
            config.auth.token_signing_key.as_bytes(),
            config.auth.token_ttl_secs,
        );

        Self {
            federation: Arc::new(FederationService::new(
                Arc::clone(&index),
                http_client.clone(),
                pending_ttl,
            )),
            store: Arc::new(CookieIdentityStore::new(
                Arc::clone(&index),
                codec,
                config.auth.base_cookie_name.clone(),
            )),
            dispatcher: Arc::new(ShareDispatcher::new(Arc::clone(&index), http_client)),
            post_login_redirect: Arc::from(config.server.post_login_redirect.as_str()),
            index,
        }
    }
}

/// 创建路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/auth", get(handlers::list_providers))
        .route("/auth/info", get(handlers::auth_info))
        .route("/auth/logout", get(handlers::logout))
        .route("/auth/callback/{provider}", get(handlers::auth_callback))
        .route("/auth/{provider}", get(handlers::begin_auth))
        .route("/api/providers", get(handlers::auth_info))
        .route("/api/share", post(handlers::share))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// 绑定地址并运行服务器，直到收到 Ctrl-C
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    let providers = state.index.names().collect::<Vec<_>>().join(", ");
    let app = create_routes(state);

    let bind_address = config.server.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Server,
        "server_listening",
        &format!("listening on {bind_address}"),
        providers = %providers
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            lerror!(
                "system",
                LogStage::Shutdown,
                LogComponent::Server,
                "server_error",
                &format!("server error: {e}")
            );
            GocialError::from(e)
        })?;

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Server,
        "server_stopped",
        "server stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // 无法监听信号时保持运行
        std::future::pending::<()>().await;
    }
}
