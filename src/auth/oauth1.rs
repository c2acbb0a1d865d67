//! # OAuth 1.0a 请求签名
//!
//! HMAC-SHA1 签名（RFC 5849 §3.4），供 request-signed 握手和发布共用。

use std::collections::HashMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;
use url::{Position, Url};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 百分号编码：仅保留 `ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// consumer 凭据，加上可选的 token 凭据
#[derive(Clone)]
pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token: Option<String>,
    token_secret: Option<String>,
}

impl OAuth1Signer {
    /// 只带 consumer 凭证的签名器，用于 request token 请求
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: None,
            token_secret: None,
        }
    }

    /// 附加用户 token 及其 secret
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, token_secret: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self.token_secret = Some(token_secret.into());
        self
    }

    /// 生成 `Authorization` 头
    ///
    /// `oauth_extra` 是额外的协议参数（如 `oauth_callback`、`oauth_verifier`），
    /// `body` 是 `application/x-www-form-urlencoded` 请求体参数。
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        oauth_extra: &[(&str, &str)],
        body: &[(&str, &str)],
    ) -> Result<String, url::ParseError> {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        let timestamp = Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, oauth_extra, body, &nonce, &timestamp)
    }

    /// 使用给定 nonce 和时间戳生成 `Authorization` 头
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &str,
        oauth_extra: &[(&str, &str)],
        body: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Result<String, url::ParseError> {
        let mut oauth_params = self.protocol_params(oauth_extra, nonce, timestamp);
        let base_string = signature_base_string(method, url, &oauth_params, body)?;
        let signature = self.sign(&base_string);
        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }

    fn protocol_params(
        &self,
        oauth_extra: &[(&str, &str)],
        nonce: &str,
        timestamp: &str,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = &self.token {
            params.push(("oauth_token".to_string(), token.clone()));
        }
        params.extend(
            oauth_extra
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        params
    }

    fn sign(&self, base_string: &str) -> String {
        let signing_key = format!(
            "{}&{}",
            percent_encode(&self.consumer_secret),
            percent_encode(self.token_secret.as_deref().unwrap_or_default())
        );
        // HMAC 接受任意长度的密钥
        let Ok(mut mac) = HmacSha1::new_from_slice(signing_key.as_bytes()) else {
            return String::new();
        };
        mac.update(base_string.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Signer")
            .field("consumer_key", &self.consumer_key)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

/// 签名基串：`METHOD&enc(base_url)&enc(sorted params)`
pub fn signature_base_string(
    method: &str,
    url: &str,
    oauth_params: &[(String, String)],
    body: &[(&str, &str)],
) -> Result<String, url::ParseError> {
    let parsed = Url::parse(url)?;
    let base_url = &parsed[..Position::AfterPath];

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (percent_encode(&k), percent_encode(&v)))
        .collect();
    params.extend(
        body.iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v))),
    );
    params.extend(
        oauth_params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v))),
    );
    params.sort();

    let normalized = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        percent_encode(base_url),
        percent_encode(&normalized)
    ))
}

/// 解析 `application/x-www-form-urlencoded` 格式的 token 响应
pub fn parse_form_response(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}
