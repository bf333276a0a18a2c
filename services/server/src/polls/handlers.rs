//! 投票 HTTP 接口处理。

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use poll_protocol::{
    CreatePollRequest, CreatePollResponse, PollView, STATUS_SUCCESS, StatusResponse, VoteRequest,
};

use crate::{
    api::{error::ApiError, response::ok_response},
    auth::handlers::AuthUser,
    polls::store::{PollError, PollId, VoteError},
    state::AppState,
};

/// 路径中的投票 ID 按有符号整数解析；负数不可能存在，交由调用方按“未找到”处理。
fn poll_id_from_path(
    path: Result<Path<i64>, PathRejection>,
) -> Result<Option<PollId>, ApiError> {
    let Path(raw) = path?;
    Ok(PollId::try_from(raw).ok())
}

/// 创建投票（需登录）。
pub(crate) async fn create_poll_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<CreatePollRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePollResponse>), ApiError> {
    let Json(req) = body?;
    let poll_id = state
        .polls
        .create(req.question, req.options, &user.email)
        .await?;
    Ok(ok_response(
        StatusCode::OK,
        CreatePollResponse {
            status: STATUS_SUCCESS.to_string(),
            poll_id,
        },
    ))
}

/// 投票列表。
pub(crate) async fn list_polls_handler(State(state): State<AppState>) -> Json<Vec<PollView>> {
    Json(state.polls.list().await.iter().map(|poll| poll.to_view()).collect())
}

/// 单个投票详情。
pub(crate) async fn get_poll_handler(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, Json<PollView>), ApiError> {
    let poll_id = poll_id_from_path(path)?.ok_or(PollError::NotFound)?;
    let poll = state.polls.get(poll_id).await?;
    Ok(ok_response(StatusCode::OK, poll.to_view()))
}

/// 投票（需登录）。
pub(crate) async fn vote_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let poll_id = poll_id_from_path(path)?.ok_or(VoteError::NotFound)?;
    let Json(req) = body?;
    state
        .polls
        .vote(poll_id, req.option_index, &user.email)
        .await?;
    Ok(ok_response(StatusCode::OK, StatusResponse::success()))
}
