//! poll-server 二进制入口：CLI 分发、日志初始化后启动服务。

mod api;
mod app;
mod auth;
mod cli;
mod config;
mod logging;
mod polls;
mod state;

#[tokio::main]
/// 启动投票服务。
async fn main() -> anyhow::Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<String>>();
    match cli::dispatch(&args)? {
        cli::CliDispatch::Run => {}
        cli::CliDispatch::Exit => return Ok(()),
    }

    let _log_runtime = logging::init("poll-server")?;
    let config = config::ServerConfig::from_env()?;
    app::run(config).await
}
