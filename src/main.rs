//! Nginx Vitals 主程序入口
//!
//! 执行一次健康检测后退出

use anyhow::{Context, Result};
use clap::Parser;
use nginx_vitals::cli::{command_for, Args};
use nginx_vitals::logging::{LogConfig, LoggingSystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: args.log_level.clone().into(),
        json_format: args.json_logs,
        ..Default::default()
    };
    LoggingSystem::setup_logging(&log_config).context("初始化日志系统失败")?;

    info!("Nginx Vitals v{} 启动", nginx_vitals::VERSION);

    // 执行命令
    let code = match command_for(&args).execute(&args).await {
        Ok(code) => code,
        Err(e) => {
            error!("命令执行失败: {}", e);
            1
        }
    };

    std::process::exit(code);
}
