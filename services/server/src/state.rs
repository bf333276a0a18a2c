//! 服务共享状态：显式持有的各存储句柄。

use std::sync::Arc;

use crate::{
    auth::{
        credentials::{CredentialError, CredentialStore},
        token::TokenService,
    },
    config::ServerConfig,
    polls::store::PollStore,
};

/// 注入到每个请求处理函数的共享状态。
#[derive(Clone)]
pub(crate) struct AppState {
    /// 用户凭据（内存）。
    pub(crate) credentials: Arc<CredentialStore>,
    /// 会话 token 签发/校验。
    pub(crate) tokens: Arc<TokenService>,
    /// 投票与计票（内存）。
    pub(crate) polls: Arc<PollStore>,
}

impl AppState {
    /// 按配置构建全部存储。
    pub(crate) fn new(config: &ServerConfig) -> Result<Self, CredentialError> {
        Ok(Self::from_parts(
            Arc::new(CredentialStore::new()?),
            Arc::new(TokenService::new(
                config.token_secret.as_bytes(),
                config.token_ttl_sec,
            )),
            Arc::new(PollStore::new()),
        ))
    }

    pub(crate) fn from_parts(
        credentials: Arc<CredentialStore>,
        tokens: Arc<TokenService>,
        polls: Arc<PollStore>,
    ) -> Self {
        Self {
            credentials,
            tokens,
            polls,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// 测试用状态：低成本哈希参数 + 固定密钥。
    pub(crate) fn for_tests() -> Self {
        use crate::auth::credentials::test_hasher;

        Self::from_parts(
            Arc::new(CredentialStore::with_hasher(test_hasher()).unwrap()),
            Arc::new(TokenService::new(
                "0123456789abcdef0123456789abcdef",
                crate::api::types::DEFAULT_TOKEN_TTL_SEC,
            )),
            Arc::new(PollStore::new()),
        )
    }
}
