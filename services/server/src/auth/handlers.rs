//! 鉴权 HTTP 接口处理：注册、登录、当前用户。

use axum::{
    Json,
    extract::{FromRequestParts, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
};
use poll_protocol::{
    CurrentUserResponse, LoginRequest, LoginResponse, STATUS_SUCCESS, SignupRequest,
    StatusResponse,
};
use tracing::{info, warn};

use crate::{
    api::{error::ApiError, response::ok_response},
    auth::credentials::UserRecord,
    state::AppState,
};

/// 取出 `Authorization` 头；非 ASCII 值按空串处理，由鉴权判为格式错误。
pub(crate) fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default())
}

/// 已登录用户。放在 `Path`/`Json` 之前，未登录请求先得到 401，不会先报请求体错误。
pub(crate) struct AuthUser(pub(crate) UserRecord);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .authenticate(authorization_header(&parts.headers))
            .await
            .map(AuthUser)
            .map_err(|err| {
                warn!("request rejected: {err}");
                ApiError::from(err)
            })
    }
}

/// 注册接口。
pub(crate) async fn signup_handler(
    State(state): State<AppState>,
    body: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let Json(req) = body?;
    state
        .credentials
        .register(&req.email, req.name, &req.password)
        .await?;
    let users = state.credentials.len().await;
    info!(users, "signup succeeded");
    Ok(ok_response(
        StatusCode::OK,
        StatusResponse::success_with("User created"),
    ))
}

/// 登录接口：校验密码并签发 token。
pub(crate) async fn login_handler(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let Json(req) = body?;
    let user = state
        .credentials
        .verify(&req.email, &req.password)
        .await?;
    let token = state.tokens.issue(&user.email)?;
    info!("login succeeded");
    Ok(ok_response(
        StatusCode::OK,
        LoginResponse {
            status: STATUS_SUCCESS.to_string(),
            token,
            expires_in: state.tokens.ttl_sec(),
        },
    ))
}

/// 当前用户接口。
pub(crate) async fn current_user_handler(
    AuthUser(user): AuthUser,
) -> Result<(StatusCode, Json<CurrentUserResponse>), ApiError> {
    Ok(ok_response(
        StatusCode::OK,
        CurrentUserResponse {
            name: user.name,
            email: user.email,
        },
    ))
}
