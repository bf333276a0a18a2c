//! 鉴权模块：凭据存储、会话 token、请求鉴权与接口处理。

pub(crate) mod authenticator;
pub(crate) mod credentials;
pub(crate) mod handlers;
pub(crate) mod token;
