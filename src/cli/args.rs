//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口，进程级参数均可通过环境变量提供

use crate::notification::DEFAULT_TELEGRAM_API_BASE;
use clap::{Parser, Subcommand, ValueEnum};

/// Nginx Vitals - 单次 nginx 健康检测与告警
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nginx-vitals",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 日志级别
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        help = "日志级别",
        env = "LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// 是否输出JSON格式日志
    #[arg(long, help = "输出JSON格式日志", env = "LOG_JSON")]
    pub json_logs: bool,

    /// 健康检测超时时间（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "健康检测单次请求超时时间（秒）",
        env = "PROBE_TIMEOUT_SECONDS"
    )]
    pub probe_timeout: u64,

    /// 传输层重试次数
    #[arg(
        long,
        value_name = "COUNT",
        default_value_t = 2,
        help = "连接失败或超时后的重试次数",
        env = "PROBE_MAX_RETRIES"
    )]
    pub probe_retries: u32,

    /// 指数退避系数
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 1.0,
        help = "重试退避系数（秒）",
        env = "PROBE_BACKOFF_FACTOR"
    )]
    pub backoff_factor: f64,

    /// 通知请求超时时间（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "通知请求超时时间（秒）",
        env = "NOTIFY_TIMEOUT_SECONDS"
    )]
    pub notify_timeout: u64,

    /// 密钥存储超时时间（秒）
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "密钥存储请求超时时间（秒）",
        env = "SECRET_TIMEOUT_SECONDS"
    )]
    pub secret_timeout: u64,

    /// Telegram Bot API 地址
    #[arg(
        long,
        value_name = "URL",
        default_value = DEFAULT_TELEGRAM_API_BASE,
        help = "Telegram Bot API 地址",
        env = "TELEGRAM_API_BASE"
    )]
    pub telegram_api_base: String,

    /// 自定义 Telegram 消息模板
    #[arg(
        long,
        value_name = "TEMPLATE",
        help = "自定义 Telegram 消息模板（Handlebars）",
        env = "MESSAGE_TEMPLATE"
    )]
    pub message_template: Option<String>,

    /// 子命令，默认执行一次检测
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 执行一次健康检测并输出调用结果
    Run {
        /// 触发事件（JSON），不参与检测逻辑
        #[arg(long, value_name = "JSON", help = "触发事件（JSON）")]
        event: Option<String>,
    },

    /// 校验环境配置，不发起任何网络请求
    Validate,
}

impl Args {
    /// 实际执行的子命令
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Run { event: None })
    }
}
