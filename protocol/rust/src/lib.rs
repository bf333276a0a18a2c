// 文件职责：
// 1) 定义投票服务 HTTP 接口的请求/响应数据结构。
// 2) 提供时间戳等服务端与客户端一致的基础函数。
// 3) 作为 Rust 侧协议唯一代码源，供服务端与测试/客户端复用。

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// 成功响应中的 `status` 取值。
pub const STATUS_SUCCESS: &str = "success";
/// 失败响应中的 `status` 取值。
pub const STATUS_ERROR: &str = "error";

/// 生成纳秒精度 UTC 时间戳（RFC3339）。
pub fn now_rfc3339_nanos() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    // 显示名（可选）。
    pub name: Option<String>,
    // 登录邮箱，大小写敏感的唯一键。
    pub email: String,
    // 明文密码，仅在请求中出现。
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    // 登录邮箱。
    pub email: String,
    // 明文密码。
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePollRequest {
    // 投票问题。
    pub question: String,
    // 有序选项列表。
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoteRequest {
    // 选项下标；允许负数入参，由服务端判定越界。
    pub option_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    // 固定为 `success`。
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    // 附加说明（可选）。
    pub message: Option<String>,
}

impl StatusResponse {
    /// 构造不带说明的成功响应。
    pub fn success() -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: None,
        }
    }

    /// 构造带说明的成功响应。
    pub fn success_with(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    // 固定为 `success`。
    pub status: String,
    // 会话 token。
    pub token: String,
    // token 有效期（秒）。
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePollResponse {
    // 固定为 `success`。
    pub status: String,
    // 新投票 ID。
    pub poll_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUserResponse {
    // 显示名（注册时未提供则为 null）。
    pub name: Option<String>,
    // 登录邮箱。
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollView {
    // 投票 ID，从 1 递增。
    pub id: u64,
    // 投票问题。
    pub question: String,
    // 有序选项。
    pub options: Vec<String>,
    // 与 options 等长的计票。
    pub votes: Vec<u64>,
    // 已投票用户邮箱。
    pub voted_users: Vec<String>,
    // 创建者邮箱。
    pub creator_email: String,
    // 创建时间（RFC3339）。
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    // 固定为 `error`。
    pub status: String,
    // 稳定错误码（大写下划线）。
    pub code: String,
    // 面向客户端的错误描述。
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    // 欢迎语。
    pub message: String,
    // 主要接口路径。
    pub endpoints: Vec<String>,
}
