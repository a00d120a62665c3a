//! Nginx Vitals - nginx 健康检测与告警
//!
//! 由外部调度器触发，每次调用执行一遍：
//! - 读取环境配置
//! - HTTP 健康检测（超时 + 传输层重试）
//! - 异常时从 AWS Secrets Manager 获取通知凭据
//! - 通过 Slack 或 Telegram 发送告警

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod job;
pub mod logging;
pub mod notification;
pub mod secrets;

// 重新导出主要类型
pub use config::{ChannelKind, CheckConfig};
pub use error::VitalsError;
pub use health::{HealthChecker, HealthResult, HealthStatus};
pub use job::{HealthCheckJob, InvocationBody, InvocationResult};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
