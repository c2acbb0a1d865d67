//! # Gocial 主程序
//!
//! 加载配置、初始化日志并启动 HTTP 服务。

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use gocial::{
    config::ConfigManager,
    lerror, linfo,
    logging::{self, LogComponent, LogStage},
    server,
};

/// 命令行参数
#[derive(Debug, Parser)]
#[command(name = "gocial", version, about = "OAuth federation and article sharing service")]
struct Cli {
    /// 配置文件路径，未指定时读取 `GOCIAL_CONFIG_PATH` 或 `config/gocial.toml`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());

    let manager = ConfigManager::new(cli.config.as_deref()).context("failed to load configuration")?;
    let config = manager.get_config();

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_starting",
        &format!("starting gocial with {}", manager.path().display()),
        providers = config.providers.len()
    );

    if let Err(e) = server::serve(&config).await {
        lerror!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "service_start_failed",
            &format!("service failed: {e}")
        );
        return Err(e.into());
    }

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "service stopped"
    );
    Ok(())
}
