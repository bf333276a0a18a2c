//! API 错误定义与响应转换。

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use super::response::error_body;
use crate::{
    auth::{authenticator::AuthError, credentials::CredentialError, token::TokenError},
    polls::store::{PollError, VoteError},
};

/// 接口错误：状态码 + 稳定错误码 + 面向客户端的描述。
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    pub(crate) code: &'static str,
    pub(crate) message: String,
}

impl ApiError {
    /// 构造统一 API 错误。
    pub(crate) fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 内部错误：细节只进日志，不回给客户端。
    pub(crate) fn internal(detail: impl std::fmt::Display) -> Self {
        error!("internal error: {detail}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal server error",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(error_body(self.code, self.message))).into_response()
    }
}

/// 请求体无法解析：保留框架给出的状态码（400/415/422）。
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), "INVALID_BODY", rejection.body_text())
    }
}

/// 路径参数无法解析。
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), "INVALID_PATH", rejection.body_text())
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::AlreadyExists => Self::new(
                StatusCode::BAD_REQUEST,
                "USER_ALREADY_EXISTS",
                "User already exists",
            ),
            CredentialError::InvalidCredentials => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                "Invalid credentials",
            ),
            CredentialError::Hashing(detail) => Self::internal(detail),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(detail) => Self::internal(detail),
            _ => Self::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid or expired token",
            ),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::MissingHeader => "MISSING_AUTH_HEADER",
            AuthError::Malformed => "MALFORMED_AUTH_HEADER",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::UserNotFound => "USER_NOT_FOUND",
        };
        Self::new(StatusCode::UNAUTHORIZED, code, err.to_string())
    }
}

impl From<PollError> for ApiError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::NotFound => {
                Self::new(StatusCode::NOT_FOUND, "POLL_NOT_FOUND", "Poll not found")
            }
            PollError::InvalidPoll => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_POLL",
                "A poll needs at least one option",
            ),
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::NotFound => {
                Self::new(StatusCode::NOT_FOUND, "POLL_NOT_FOUND", "Poll not found")
            }
            VoteError::AlreadyVoted => Self::new(
                StatusCode::BAD_REQUEST,
                "ALREADY_VOTED",
                "You have already voted",
            ),
            VoteError::InvalidOption => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_OPTION",
                "Invalid option index",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::ApiError;
    use crate::{
        auth::{authenticator::AuthError, credentials::CredentialError, token::TokenError},
        polls::store::VoteError,
    };

    #[test]
    fn unknown_email_and_wrong_password_share_one_response() {
        let err = ApiError::from(CredentialError::InvalidCredentials);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_CREDENTIALS");
    }

    #[test]
    fn every_auth_failure_is_unauthorized() {
        for err in [
            AuthError::MissingHeader,
            AuthError::Malformed,
            AuthError::InvalidToken(TokenError::Expired),
            AuthError::UserNotFound,
        ] {
            assert_eq!(ApiError::from(err).status, StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn vote_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::from(VoteError::NotFound).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(VoteError::AlreadyVoted).code,
            "ALREADY_VOTED"
        );
        assert_eq!(
            ApiError::from(VoteError::InvalidOption).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn hashing_failure_hides_detail() {
        let err = ApiError::from(CredentialError::Hashing("salt rng failed".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("salt"));
    }
}
