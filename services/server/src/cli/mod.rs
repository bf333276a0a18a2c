//! poll-server CLI 分发：`run`、`doctor`、`version`、`help`。

use anyhow::anyhow;
use serde_json::json;

use crate::config::{ServerConfig, TOKEN_SECRET_ENV};

/// CLI 分发结果。
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CliDispatch {
    /// 继续启动 HTTP 服务。
    Run,
    /// 命令已处理完成，主程序应退出。
    Exit,
}

/// 解析并执行 CLI。
pub(crate) fn dispatch(args: &[String]) -> anyhow::Result<CliDispatch> {
    if args.is_empty() {
        return Ok(CliDispatch::Run);
    }

    let cmd = args[0].trim();
    if cmd.is_empty() || cmd == "run" {
        return Ok(CliDispatch::Run);
    }

    if matches!(cmd, "-h" | "--help" | "help") {
        print_root_help();
        return Ok(CliDispatch::Exit);
    }

    match cmd {
        "doctor" => {
            let format = parse_doctor_format(&args[1..])?;
            run_doctor(format);
            Ok(CliDispatch::Exit)
        }
        "version" => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(CliDispatch::Exit)
        }
        other => Err(anyhow!(
            "unknown command: {other}; run `poll-server --help` for usage"
        )),
    }
}

/// `doctor` 输出格式。
#[derive(Debug, PartialEq, Eq)]
enum DoctorFormat {
    Text,
    Json,
}

/// 解析 doctor 的 `--format` 参数。
fn parse_doctor_format(args: &[String]) -> anyhow::Result<DoctorFormat> {
    if args.is_empty() {
        return Ok(DoctorFormat::Text);
    }
    if args.len() == 2 && args[0] == "--format" {
        return match args[1].as_str() {
            "text" => Ok(DoctorFormat::Text),
            "json" => Ok(DoctorFormat::Json),
            other => Err(anyhow!("unsupported doctor format: {other}")),
        };
    }
    Err(anyhow!("usage: poll-server doctor [--format text|json]"))
}

/// 校验配置并打印结果；配置无效时以非零码退出。密钥本身从不输出。
fn run_doctor(format: DoctorFormat) {
    let result = ServerConfig::from_env();
    let (addr, ttl, problem) = match &result {
        Ok(config) => (config.addr.clone(), Some(config.token_ttl_sec), None),
        Err(err) => (String::new(), None, Some(err.to_string())),
    };

    match format {
        DoctorFormat::Text => {
            println!("config-valid: {}", if problem.is_none() { "yes" } else { "no" });
            println!("listen-addr: {addr}");
            println!(
                "token-ttl-sec: {}",
                ttl.map(|v| v.to_string()).unwrap_or_default()
            );
            println!(
                "token-secret: {}",
                if problem.is_none() { "set" } else { "invalid" }
            );
            if let Some(problem) = &problem {
                println!("problem: {problem}");
            }
        }
        DoctorFormat::Json => {
            let payload = json!({
                "configValid": problem.is_none(),
                "listenAddr": addr,
                "tokenTtlSec": ttl,
                "tokenSecretEnv": TOKEN_SECRET_ENV,
                "problem": problem,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
            );
        }
    }

    if result.is_err() {
        std::process::exit(1);
    }
}

/// 打印 root help。
fn print_root_help() {
    println!("poll-server usage:");
    println!("  poll-server run");
    println!("  poll-server doctor [--format text|json]");
    println!("  poll-server version");
    println!();
    println!("environment:");
    println!("  POLL_TOKEN_SECRET    token signing key, >= 32 bytes (required)");
    println!("  POLL_ADDR            listen address (default 0.0.0.0:8000)");
    println!("  POLL_TOKEN_TTL_SEC   token lifetime in seconds (default 86400)");
    println!("  POLL_LOG_DIR         log root directory (default ./logs)");
    println!("  POLL_FILE_LOG_LEVEL  file log level (default debug)");
    println!("  RUST_LOG             stdout log filter (default info)");
}
