//! # 路由处理器
//!
//! 只负责在 HTTP 与核心服务之间转换参数和 JSON，业务逻辑都在核心模块中。

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use super::response::{ApiError, success};
use crate::auth::CallbackParams;
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::provider::AuthScheme;
use crate::types::{ArticleShare, IdentitySummary};

fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// 提供方索引条目
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    /// 提供方名称
    pub name: String,
    /// 展示名称
    pub display_name: String,
    /// 认证方案
    pub scheme: Option<AuthScheme>,
}

/// `POST /api/share` 请求体
#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    /// 文章地址
    pub url: String,
    /// 文章标题
    pub title: String,
    /// 附言，可为空
    #[serde(default)]
    pub comment: String,
}

impl From<ShareRequest> for ArticleShare {
    fn from(req: ShareRequest) -> Self {
        Self::new(req.url, req.title, req.comment)
    }
}

/// `GET /health`
pub async fn health() -> Response {
    success(serde_json::json!({ "status": "ok" }))
}

/// `GET /auth`：按名称排序的提供方列表
pub async fn list_providers(State(state): State<AppState>) -> Response {
    let index = state.federation.provider_index();
    let entries: Vec<ProviderEntry> = index
        .entries()
        .map(|(name, display_name)| ProviderEntry {
            name: name.to_string(),
            display_name: display_name.to_string(),
            scheme: index.scheme_of(name),
        })
        .collect();
    success(entries)
}

/// `GET /auth/{provider}`：保存 pending flow 并 307 跳转到提供方
pub async fn begin_auth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    let begin = state.federation.begin_auth(&provider).await?;
    let jar = state.store.save_pending(jar, &begin.pending)?;
    Ok((jar, Redirect::temporary(&begin.authorize_url)))
}

/// `GET /auth/callback/{provider}`
///
/// 无论成功与否都清除 pending cookie。
pub async fn auth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), (CookieJar, ApiError)> {
    let request_id = new_request_id();
    let (jar, pending) = state.store.take_pending(jar, &provider);

    let identity = match state
        .federation
        .complete_auth(&provider, pending.as_ref(), &params)
        .await
    {
        Ok(identity) => identity,
        Err(err) => return Err((jar, err.into())),
    };

    // add 只消费 jar 的克隆，失败时仍能把删除 pending 的 jar 带回
    let jar = match state.store.add(jar.clone(), &identity) {
        Ok(jar) => jar,
        Err(err) => return Err((jar, err.into())),
    };

    linfo!(
        request_id,
        LogStage::Callback,
        LogComponent::Server,
        "login_complete",
        &format!("identity stored for `{provider}`"),
        user_id = %identity.user_id
    );
    Ok((jar, Redirect::to(&state.post_login_redirect)))
}

/// `GET /auth/info` 与 `GET /api/providers`：当前已认证的身份（不含密钥）
pub async fn auth_info(State(state): State<AppState>, jar: CookieJar) -> Response {
    let identities: Vec<IdentitySummary> = state
        .store
        .enumerate_available(&jar)
        .iter()
        .map(|identity| identity.summary())
        .collect();
    success(identities)
}

/// `GET /auth/logout`：清除所有提供方的 cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = state.store.delete_all(jar);
    (jar, success(serde_json::json!({ "loggedOut": true })))
}

/// `POST /api/share`：对所有已注册提供方并发分享
pub async fn share(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ShareRequest>,
) -> Result<Response, ApiError> {
    let request_id = new_request_id();
    let article = ArticleShare::from(request);
    let lookups = state.store.lookup_all(&jar);

    let report = state
        .dispatcher
        .share_article(&request_id, &article, lookups)
        .await?;

    linfo!(
        request_id,
        LogStage::Share,
        LogComponent::Server,
        "share_complete",
        &format!("shared on {} provider(s)", report.shared_count()),
        failures = report.has_failures()
    );
    Ok(success(report))
}
