//! 会话 token 签发与校验（HMAC-SHA256，无服务端状态）。
//!
//! 格式：`pst_v1.<base64url(claims JSON)>.<base64url(HMAC(payload 段))>`。

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::api::types::{SESSION_TOKEN_VERSION, SessionClaims};

type HmacSha256 = Hmac<Sha256>;

/// token 错误。
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    /// 仅签发路径可能出现。
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// 当前 unix 秒。
pub(crate) fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// token 服务，持有启动时加载的签名密钥。
pub(crate) struct TokenService {
    signing_key: Vec<u8>,
    ttl_sec: u64,
}

impl TokenService {
    pub(crate) fn new(signing_key: impl Into<Vec<u8>>, ttl_sec: u64) -> Self {
        Self {
            signing_key: signing_key.into(),
            ttl_sec,
        }
    }

    pub(crate) fn ttl_sec(&self) -> u64 {
        self.ttl_sec
    }

    /// 为邮箱签发 token。
    pub(crate) fn issue(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, unix_now())
    }

    /// 以指定时间为签发时间。
    pub(crate) fn issue_at(&self, email: &str, now: u64) -> Result<String, TokenError> {
        let claims = SessionClaims {
            email: email.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_sec),
            jti: Uuid::new_v4().simple().to_string(),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|err| TokenError::Signing(format!("encode claims failed: {err}")))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let mut mac = self.mac()?;
        mac.update(payload_b64.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{SESSION_TOKEN_VERSION}.{payload_b64}.{sig_b64}"))
    }

    /// 校验 token，成功返回其中的邮箱。
    pub(crate) fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, unix_now())
    }

    /// 以指定时间校验 token。
    pub(crate) fn verify_at(&self, token: &str, now: u64) -> Result<String, TokenError> {
        let mut parts = token.split('.');
        let version = parts.next().unwrap_or_default();
        let payload_b64 = parts.next().unwrap_or_default();
        let sig_b64 = parts.next().unwrap_or_default();
        if version != SESSION_TOKEN_VERSION
            || payload_b64.is_empty()
            || sig_b64.is_empty()
            || parts.next().is_some()
        {
            return Err(TokenError::Malformed);
        }

        let sig = URL_SAFE_NO_PAD
            .decode(sig_b64.as_bytes())
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac().map_err(|_| TokenError::BadSignature)?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&sig)
            .map_err(|_| TokenError::BadSignature)?;

        // 签名通过后才解析 payload
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64.as_bytes())
            .map_err(|_| TokenError::Malformed)?;
        let claims: SessionClaims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if now > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims.email)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|err| TokenError::Signing(format!("invalid signing key: {err}")))
    }
}
