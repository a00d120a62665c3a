//! 健康检测模块
//!
//! 提供HTTP健康检测和结果处理功能

pub mod checker;
pub mod result;

// 重新导出主要类型
pub use checker::{HealthChecker, HttpHealthChecker, RetryPolicy};
pub use result::{HealthResult, HealthStatus};
