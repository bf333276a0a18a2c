//! 应用装配：路由、CORS、请求追踪与监听。

use axum::{
    Json, Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use poll_protocol::WelcomeResponse;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::{
    auth::handlers::{current_user_handler, login_handler, signup_handler},
    config::ServerConfig,
    polls::handlers::{create_poll_handler, get_poll_handler, list_polls_handler, vote_handler},
    state::AppState,
};

/// 服务入口：构建状态并启动 HTTP 监听。
pub(crate) async fn run(config: ServerConfig) -> anyhow::Result<()> {
    // 启动时计算一次占位哈希，同样放到阻塞线程池
    let state = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || AppState::new(&config)).await??
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!(
        "poll-server listening on {} (token ttl {}s)",
        config.addr, config.token_ttl_sec
    );
    axum::serve(listener, app).await?;
    Ok(())
}

/// 构建路由。
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/current-user", get(current_user_handler))
        .route("/polls", get(list_polls_handler).post(create_poll_handler))
        .route("/polls/{poll_id}", get(get_poll_handler))
        .route("/polls/{poll_id}/vote", post(vote_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 欢迎页：列出主要接口。
async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to Online Poll System API".to_string(),
        endpoints: [
            "/signup",
            "/login",
            "/current-user",
            "/polls",
            "/polls/{poll_id}",
            "/polls/{poll_id}/vote",
        ]
        .iter()
        .map(|path| path.to_string())
        .collect(),
    })
}

/// 健康检查接口。
async fn healthz() -> &'static str {
    "ok"
}
