//! 分享调度
//!
//! 根据提供方的认证方案选择适配器，并对所有提供方并发分发。

use std::sync::Arc;

use futures::future::join_all;

use super::{
    BearerTokenAdapter, MissingIdentity, RequestSignedAdapter, ShareAdapter, ShareOutcome,
    ShareReport,
};
use crate::auth::OAuth1Signer;
use crate::error::{DispatchError, PublishError, StoreError};
use crate::logging::{LogComponent, LogStage};
use crate::provider::{AuthScheme, ProviderIndex};
use crate::types::{ArticleShare, Identity};
use crate::{ldebug, linfo, lwarn};

/// 分享分发器：为每个已注册提供方解析适配器并并发发布
#[derive(Debug, Clone)]
pub struct ShareDispatcher {
    index: Arc<ProviderIndex>,
    http_client: reqwest::Client,
}

impl ShareDispatcher {
    /// 创建分发器，适配器共享同一个 HTTP 客户端
    pub fn new(index: Arc<ProviderIndex>, http_client: reqwest::Client) -> Self {
        Self { index, http_client }
    }

    /// 用身份自带的 token 构造对应方案的适配器
    pub fn resolve_adapter(&self, identity: &Identity) -> Result<Box<dyn ShareAdapter>, DispatchError> {
        let unavailable = |reason: &str| DispatchError::AdapterUnavailable {
            provider: identity.provider.clone(),
            reason: reason.to_string(),
        };

        let registered = self
            .index
            .get(&identity.provider)
            .ok_or_else(|| unavailable("provider is not registered"))?;
        if identity.access_token.is_empty() {
            return Err(unavailable("identity has no access token"));
        }

        let publish_url = registered.endpoints.publish_url.clone();
        match registered.scheme() {
            AuthScheme::RequestSigned => {
                let token_secret = identity
                    .access_token_secret
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| unavailable("identity has no access token secret"))?;
                let signer = OAuth1Signer::new(
                    registered.config.client_id.clone(),
                    registered.config.client_secret.clone(),
                )
                .with_token(identity.access_token.clone(), token_secret);

                Ok(Box::new(RequestSignedAdapter::new(
                    identity.provider.clone(),
                    publish_url,
                    signer,
                    self.http_client.clone(),
                )))
            }
            AuthScheme::BearerToken => Ok(Box::new(BearerTokenAdapter::new(
                identity.provider.clone(),
                publish_url,
                &identity.user_id,
                identity.access_token.clone(),
                self.http_client.clone(),
            ))),
        }
    }

    /// 通过给定适配器发布
    pub async fn publish(
        &self,
        article: &ArticleShare,
        adapter: &dyn ShareAdapter,
    ) -> Result<(), PublishError> {
        article.validate()?;
        adapter.publish(article).await
    }

    /// 对每个提供方并发发布，单个提供方失败不影响其他提供方
    ///
    /// `lookups` 通常来自 `CookieIdentityStore::lookup_all`。文章本身无效时
    /// 直接返回错误，不发出任何请求。
    pub async fn share_article(
        &self,
        request_id: &str,
        article: &ArticleShare,
        lookups: Vec<(String, Result<Identity, StoreError>)>,
    ) -> Result<ShareReport, PublishError> {
        article.validate()?;

        let tasks = lookups.into_iter().map(|(provider, lookup)| async move {
            let outcome = match lookup {
                Err(StoreError::NotFound { .. }) => ShareOutcome::NotAuthenticated {
                    reason: MissingIdentity::NotFound,
                },
                Err(_) => ShareOutcome::NotAuthenticated {
                    reason: MissingIdentity::Invalid,
                },
                Ok(identity) => match self.resolve_adapter(&identity) {
                    Err(err) => ShareOutcome::Failed { error: err.into() },
                    Ok(adapter) => {
                        ldebug!(
                            request_id,
                            LogStage::Share,
                            LogComponent::Dispatcher,
                            "publish_start",
                            &format!("publishing on `{}`", adapter.provider()),
                            scheme = %adapter.scheme()
                        );
                        match adapter.publish(article).await {
                            Ok(()) => ShareOutcome::Shared,
                            Err(error) => ShareOutcome::Failed { error },
                        }
                    }
                },
            };
            (provider, outcome)
        });

        let mut report = ShareReport::default();
        for (provider, outcome) in join_all(tasks).await {
            match &outcome {
                ShareOutcome::Shared => linfo!(
                    request_id,
                    LogStage::Share,
                    LogComponent::Dispatcher,
                    "share_ok",
                    &format!("article shared on `{provider}`")
                ),
                ShareOutcome::Failed { error } => lwarn!(
                    request_id,
                    LogStage::Share,
                    LogComponent::Dispatcher,
                    "share_failed",
                    &format!("sharing on `{provider}` failed: {error}")
                ),
                ShareOutcome::NotAuthenticated { .. } => {}
            }
            report.outcomes.insert(provider, outcome);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderConfig;

    fn dispatcher() -> ShareDispatcher {
        let index = ProviderIndex::build(vec![
            ProviderConfig::new(
                "twitter",
                AuthScheme::RequestSigned,
                "k",
                "s",
                "https://app.example.com/auth/callback/twitter",
            ),
            ProviderConfig::new(
                "linkedin",
                AuthScheme::BearerToken,
                "k",
                "s",
                "https://app.example.com/auth/callback/linkedin",
            ),
        ])
        .unwrap();
        ShareDispatcher::new(Arc::new(index), reqwest::Client::new())
    }

    fn identity(provider: &str, secret: Option<&str>) -> Identity {
        Identity {
            provider: provider.to_string(),
            user_id: "42".to_string(),
            user_name: "Ada".to_string(),
            user_description: None,
            user_avatar_url: None,
            access_token: "at".to_string(),
            access_token_secret: secret.map(ToString::to_string),
            refresh_token: None,
            expires_at: None,
        }
    }

    #[test]
    fn test_adapter_selected_by_scheme() {
        let dispatcher = dispatcher();
        let signed = dispatcher
            .resolve_adapter(&identity("twitter", Some("ats")))
            .unwrap();
        assert_eq!(signed.scheme(), AuthScheme::RequestSigned);
        assert_eq!(signed.provider(), "twitter");

        let bearer = dispatcher.resolve_adapter(&identity("linkedin", None)).unwrap();
        assert_eq!(bearer.scheme(), AuthScheme::BearerToken);
    }

    #[test]
    fn test_signed_adapter_requires_token_secret() {
        let err = dispatcher()
            .resolve_adapter(&identity("twitter", None))
            .err()
            .unwrap();
        assert!(matches!(err, DispatchError::AdapterUnavailable { .. }));
    }

    #[test]
    fn test_unregistered_provider_has_no_adapter() {
        assert!(dispatcher().resolve_adapter(&identity("myspace", None)).is_err());
    }

    #[tokio::test]
    async fn test_invalid_article_rejected_before_fan_out() {
        let article = ArticleShare::new("", "t", "c");
        let err = dispatcher()
            .share_article("test", &article, vec![("linkedin".to_string(), Ok(identity("linkedin", None)))])
            .await
            .unwrap_err();
        assert_eq!(err, PublishError::InvalidArticle { field: "url" });
    }

    #[tokio::test]
    async fn test_missing_identities_reported_not_authenticated() {
        let article = ArticleShare::new("https://e.x/a", "t", "c");
        let lookups = vec![
            (
                "linkedin".to_string(),
                Err(StoreError::NotFound {
                    provider: "linkedin".to_string(),
                }),
            ),
            (
                "twitter".to_string(),
                Err(StoreError::DecodeFailed {
                    provider: "twitter".to_string(),
                    source: crate::error::TokenError::Expired,
                }),
            ),
        ];
        let report = dispatcher()
            .share_article("test", &article, lookups)
            .await
            .unwrap();

        assert_eq!(
            report.get("linkedin"),
            Some(&ShareOutcome::NotAuthenticated {
                reason: MissingIdentity::NotFound
            })
        );
        assert_eq!(
            report.get("twitter"),
            Some(&ShareOutcome::NotAuthenticated {
                reason: MissingIdentity::Invalid
            })
        );
        assert_eq!(report.shared_count(), 0);
    }
}
