//! 投票模块：存储与接口处理。

pub(crate) mod handlers;
pub(crate) mod store;
