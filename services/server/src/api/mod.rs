//! HTTP 边界：错误映射、响应包裹与内部常量。

pub(crate) mod error;
pub(crate) mod response;
pub(crate) mod types;
