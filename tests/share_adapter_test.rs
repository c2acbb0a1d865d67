//! # 发布适配器集成测试（wiremock 模拟提供方）

use gocial::auth::OAuth1Signer;
use gocial::error::PublishError;
use gocial::share::{BearerTokenAdapter, MAX_STATUS_LENGTH, RequestSignedAdapter, ShareAdapter};
use gocial::types::ArticleShare;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const URL: &str = "https://blog.example.com/post";

/// comment + " " + URL 恰好 `len` 个字符
fn article_with_status_len(len: usize) -> ArticleShare {
    let comment = "x".repeat(len - URL.len() - 1);
    ArticleShare::new(URL, "A post", comment)
}

fn signed_adapter(server: &MockServer) -> RequestSignedAdapter {
    RequestSignedAdapter::new(
        "twitter",
        format!("{}/1.1/statuses/update.json", server.uri()),
        OAuth1Signer::new("tw-key", "tw-secret").with_token("tw-access", "tw-access-secret"),
        reqwest::Client::new(),
    )
}

#[tokio::test]
async fn status_of_exactly_max_length_is_posted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/statuses/update.json"))
        .and(header_exists("authorization"))
        .and(body_string_contains("status="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id_str": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    let article = article_with_status_len(MAX_STATUS_LENGTH);
    assert_eq!(signed_adapter(&server).publish(&article).await, Ok(()));
}

#[tokio::test]
async fn status_over_max_length_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let article = article_with_status_len(MAX_STATUS_LENGTH + 1);
    assert_eq!(
        signed_adapter(&server).publish(&article).await,
        Err(PublishError::LengthExceeded {
            length: MAX_STATUS_LENGTH + 1,
            max: MAX_STATUS_LENGTH,
        })
    );
}

#[tokio::test]
async fn signed_request_carries_oauth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.1/statuses/update.json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    signed_adapter(&server)
        .publish(&ArticleShare::new(URL, "t", "hello"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains("oauth_consumer_key=\"tw-key\""));
    assert!(auth.contains("oauth_token=\"tw-access\""));
    assert!(auth.contains("oauth_signature_method=\"HMAC-SHA1\""));
}

#[tokio::test]
async fn signed_provider_rejection_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("duplicate status"))
        .mount(&server)
        .await;

    let err = signed_adapter(&server)
        .publish(&ArticleShare::new(URL, "t", "hello"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PublishError::HttpFailure {
            status: Some(403),
            body: "duplicate status".to_string(),
        }
    );
}

#[tokio::test]
async fn bearer_adapter_posts_ugc_article() {
    let server = MockServer::start().await;
    let article = ArticleShare::new(URL, "A post", "Worth reading");

    Mock::given(method("POST"))
        .and(path("/v2/ugcPosts"))
        .and(header("authorization", "Bearer li-access"))
        .and(header("x-restli-protocol-version", "2.0.0"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "author": "urn:li:person:GJ74B4A98G",
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": {"text": "Worth reading"},
                    "shareMediaCategory": "ARTICLE",
                    "media": [{
                        "status": "READY",
                        "description": {"text": "A post"},
                        "originalUrl": URL,
                        "title": {"text": "A post"}
                    }]
                }
            },
            "visibility": {"com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"}
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = BearerTokenAdapter::new(
        "linkedin",
        format!("{}/v2/ugcPosts", server.uri()),
        "GJ74B4A98G",
        "li-access",
        reqwest::Client::new(),
    );
    assert_eq!(adapter.publish(&article).await, Ok(()));
}

#[tokio::test]
async fn bearer_provider_rejection_is_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let adapter = BearerTokenAdapter::new(
        "linkedin",
        format!("{}/v2/ugcPosts", server.uri()),
        "abc",
        "stale",
        reqwest::Client::new(),
    );
    let err = adapter
        .publish(&ArticleShare::new(URL, "t", "c"))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::HttpFailure { status: Some(401), .. }));
}

#[tokio::test]
async fn unreachable_provider_is_transport_failure() {
    let adapter = BearerTokenAdapter::new(
        "linkedin",
        "http://127.0.0.1:9/v2/ugcPosts",
        "abc",
        "at",
        reqwest::Client::new(),
    );
    let err = adapter
        .publish(&ArticleShare::new(URL, "t", "c"))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::HttpFailure { status: None, .. }));
}
