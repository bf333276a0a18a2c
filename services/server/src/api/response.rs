//! API 响应包裹。

use axum::{Json, http::StatusCode};
use poll_protocol::{ErrorResponse, STATUS_ERROR};
use serde::Serialize;

/// 构造成功响应。
pub(crate) fn ok_response<T: Serialize>(status: StatusCode, data: T) -> (StatusCode, Json<T>) {
    (status, Json(data))
}

/// 构造失败响应体。
pub(crate) fn error_body(code: &str, detail: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        status: STATUS_ERROR.to_string(),
        code: code.to_string(),
        detail: detail.into(),
    }
}
