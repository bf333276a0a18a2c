//! 服务内部共享常量与鉴权类型。

use serde::{Deserialize, Serialize};

/// 会话 token 默认有效期（秒）。
pub(crate) const DEFAULT_TOKEN_TTL_SEC: u64 = 24 * 3600;
/// 会话 token 版本前缀。
pub(crate) const SESSION_TOKEN_VERSION: &str = "pst_v1";
/// 签名密钥最小字节数。
pub(crate) const MIN_TOKEN_SECRET_LEN: usize = 32;
/// `Authorization` 头允许的鉴权方案。
pub(crate) const AUTH_SCHEME: &str = "Bearer";

/// 会话 token claims。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct SessionClaims {
    /// 用户邮箱。
    pub(crate) email: String,
    /// 签发时间（unix 秒）。
    pub(crate) iat: u64,
    /// 过期时间（unix 秒）。
    pub(crate) exp: u64,
    /// token 唯一 ID，预留给吊销名单。
    pub(crate) jti: String,
}
