//! HS256 sealing primitive and the identity token codec built on it.
//!
//! Decoding authenticates before it parses: the HMAC over `header.payload` is
//! checked against the raw bytes first, so any damage to header, payload or
//! signature surfaces as [`TokenError::SignatureInvalid`] rather than as a
//! parse error.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use super::claims::IdentityClaims;
use crate::error::TokenError;
use crate::types::Identity;

type HmacSha256 = Hmac<Sha256>;

/// Claim sets that carry a unix-seconds expiry.
pub trait ExpiringClaims: Serialize + DeserializeOwned {
    /// 过期时间（unix 秒）
    fn exp(&self) -> i64;
}

/// Symmetric HS256 key.
#[derive(Clone)]
pub struct SigningKey {
    secret: Vec<u8>,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    /// 从原始密钥字节创建
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref().to_vec();
        Self {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
            secret,
        }
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// A signed credential token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialToken {
    /// 紧凑 JWS 字符串，即 cookie 值
    pub value: String,
    /// 令牌的 `exp`
    pub expires_at: DateTime<Utc>,
}

/// Signs `claims` as a compact HS256 JWS.
pub fn seal<T: ExpiringClaims>(claims: &T, key: &SigningKey) -> Result<String, TokenError> {
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key.encoding)
        .map_err(|e| TokenError::Encoding(e.to_string()))
}

/// Verifies and parses a token produced by [`seal`], rejecting it once `now >= exp`.
pub fn open_at<T: ExpiringClaims>(
    token: &str,
    key: &SigningKey,
    now: DateTime<Utc>,
) -> Result<T, TokenError> {
    verify_signature(token, key)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let claims = jsonwebtoken::decode::<T>(token, &key.decoding, &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            _ => TokenError::Malformed(e.to_string()),
        })?
        .claims;

    if claims.exp() <= now.timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// [`open_at`] with the current time.
pub fn open<T: ExpiringClaims>(token: &str, key: &SigningKey) -> Result<T, TokenError> {
    open_at(token, key, Utc::now())
}

fn verify_signature(token: &str, key: &SigningKey) -> Result<(), TokenError> {
    let (message, signature) = token
        .rsplit_once('.')
        .ok_or_else(|| TokenError::Malformed("missing segment separator".to_string()))?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| TokenError::SignatureInvalid)?;

    let mut mac =
        HmacSha256::new_from_slice(&key.secret).map_err(|_| TokenError::SignatureInvalid)?;
    mac.update(message.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::SignatureInvalid)
}

/// Encodes `identity`. `exp` is the identity's own expiry when it has one,
/// otherwise `now + default_ttl`.
pub fn encode(
    identity: &Identity,
    key: &SigningKey,
    default_ttl: Duration,
) -> Result<CredentialToken, TokenError> {
    let expires_at = identity.expires_at.unwrap_or_else(|| {
        Utc::now()
            .checked_add_signed(default_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    });
    let claims = IdentityClaims::from_identity(identity, expires_at.timestamp());
    let value = seal(&claims, key)?;

    Ok(CredentialToken {
        value,
        expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or(expires_at),
    })
}

/// Decodes an identity token, rejecting it once expired.
pub fn decode(token: &str, key: &SigningKey) -> Result<Identity, TokenError> {
    decode_at(token, key, Utc::now())
}

/// [`decode`] against an explicit clock.
pub fn decode_at(token: &str, key: &SigningKey, now: DateTime<Utc>) -> Result<Identity, TokenError> {
    open_at::<IdentityClaims>(token, key, now)?.into_identity()
}

/// Key plus default TTL, shared by the identity store and federation.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SigningKey,
    default_ttl: Duration,
}

impl TokenCodec {
    /// 创建编解码器
    pub fn new(key: SigningKey, default_ttl: Duration) -> Self {
        Self { key, default_ttl }
    }

    /// 从密钥字节和秒数 TTL 创建
    pub fn from_secret(secret: impl AsRef<[u8]>, default_ttl_secs: u64) -> Self {
        let ttl_secs = i64::try_from(default_ttl_secs).unwrap_or(i64::MAX);
        Self::new(
            SigningKey::new(secret),
            Duration::try_seconds(ttl_secs).unwrap_or(Duration::MAX),
        )
    }

    /// 签发身份令牌
    pub fn encode(&self, identity: &Identity) -> Result<CredentialToken, TokenError> {
        encode(identity, &self.key, self.default_ttl)
    }

    /// 校验并解析身份令牌
    pub fn decode(&self, token: &str) -> Result<Identity, TokenError> {
        decode(token, &self.key)
    }

    /// 用同一把密钥签名任意带过期时间的声明
    pub fn seal<T: ExpiringClaims>(&self, claims: &T) -> Result<String, TokenError> {
        seal(claims, &self.key)
    }

    /// 校验并解析 [`seal`](Self::seal) 的结果
    pub fn open<T: ExpiringClaims>(&self, token: &str) -> Result<T, TokenError> {
        open(token, &self.key)
    }
}
