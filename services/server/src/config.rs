//! 配置模块职责：
//! 1. 从环境变量读取监听地址、token 签名密钥与有效期。
//! 2. 校验签名密钥必须由外部提供且长度足够，缺失时拒绝启动。

use std::fmt;

use anyhow::{anyhow, bail};

use crate::api::types::{DEFAULT_TOKEN_TTL_SEC, MIN_TOKEN_SECRET_LEN};

/// 默认监听地址。
pub(crate) const DEFAULT_ADDR: &str = "0.0.0.0:8000";
/// 监听地址环境变量。
pub(crate) const ADDR_ENV: &str = "POLL_ADDR";
/// token 签名密钥环境变量。
pub(crate) const TOKEN_SECRET_ENV: &str = "POLL_TOKEN_SECRET";
/// token 有效期环境变量（秒）。
pub(crate) const TOKEN_TTL_ENV: &str = "POLL_TOKEN_TTL_SEC";

/// 服务运行时配置。
#[derive(Clone)]
pub(crate) struct ServerConfig {
    /// HTTP 监听地址。
    pub(crate) addr: String,
    /// token 签名密钥，启动后不再变化。
    pub(crate) token_secret: String,
    /// token 有效期（秒）。
    pub(crate) token_ttl_sec: u64,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("addr", &self.addr)
            .field("token_secret", &"<redacted>")
            .field("token_ttl_sec", &self.token_ttl_sec)
            .finish()
    }
}

impl ServerConfig {
    /// 从进程环境变量构建配置。
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置。
    pub(crate) fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup(ADDR_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let token_secret = lookup(TOKEN_SECRET_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("{TOKEN_SECRET_ENV} must be set"))?;
        if token_secret.len() < MIN_TOKEN_SECRET_LEN {
            bail!("{TOKEN_SECRET_ENV} must be at least {MIN_TOKEN_SECRET_LEN} bytes");
        }

        let token_ttl_sec = parse_ttl(lookup(TOKEN_TTL_ENV).as_deref());

        Ok(Self {
            addr,
            token_secret,
            token_ttl_sec,
        })
    }
}

/// 解析有效期；缺失、非法或为 0 时回退默认值。
fn parse_ttl(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_TOKEN_TTL_SEC)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{DEFAULT_ADDR, ServerConfig, parse_ttl};
    use crate::api::types::DEFAULT_TOKEN_TTL_SEC;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("POLL_TOKEN_SECRET", SECRET)]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.token_ttl_sec, DEFAULT_TOKEN_TTL_SEC);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("POLL_TOKEN_SECRET"));
        assert!(config_from(&[("POLL_TOKEN_SECRET", "   ")]).is_err());
    }

    #[test]
    fn short_secret_is_an_error() {
        assert!(config_from(&[("POLL_TOKEN_SECRET", "short")]).is_err());
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("POLL_TOKEN_SECRET", SECRET),
            ("POLL_ADDR", " 127.0.0.1:9000 "),
            ("POLL_TOKEN_TTL_SEC", "60"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:9000");
        assert_eq!(config.token_ttl_sec, 60);
    }

    #[test]
    fn invalid_ttl_falls_back_to_default() {
        assert_eq!(parse_ttl(Some("0")), DEFAULT_TOKEN_TTL_SEC);
        assert_eq!(parse_ttl(Some("abc")), DEFAULT_TOKEN_TTL_SEC);
        assert_eq!(parse_ttl(None), DEFAULT_TOKEN_TTL_SEC);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = config_from(&[("POLL_TOKEN_SECRET", SECRET)]).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
