//! 健康检测结果数据结构
//!
//! 定义健康检测的结果类型和状态枚举

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// 健康状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// 服务正常
    Up,
    /// 服务异常
    Down,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Up => write!(f, "正常"),
            HealthStatus::Down => write!(f, "异常"),
        }
    }
}

impl HealthStatus {
    /// 判断状态是否为健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Up)
    }

    /// 按HTTP状态码判定健康状态，[200, 300) 为健康
    pub fn from_status_code(status_code: u16) -> Self {
        if (200..300).contains(&status_code) {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        }
    }
}

/// 单次探测的结果
///
/// 探测器从不返回错误，所有失败都记录在 `status` 和 `error_message` 中。
#[derive(Debug, Clone)]
pub struct HealthResult {
    pub url: String,
    /// 探测完成的时间
    pub checked_at: DateTime<Utc>,
    pub status: HealthStatus,
    /// 收到响应时的HTTP状态码
    pub status_code: Option<u16>,
    /// 从首次请求到得出结论的耗时，包含重试等待
    pub elapsed: Duration,
    /// 失败原因
    pub error_message: Option<String>,
    /// 实际发出的请求次数
    pub attempts: u32,
    /// 响应体是否包含预期内容，仅用于诊断，不影响健康判定
    pub content_matched: Option<bool>,
}

impl HealthResult {
    /// 创建新的健康检测结果
    ///
    /// # 参数
    /// * `url` - 检测的URL
    /// * `status` - 健康状态
    ///
    /// # 返回
    /// * `Self` - 健康检测结果实例
    pub fn new(url: String, status: HealthStatus) -> Self {
        Self {
            url,
            checked_at: Utc::now(),
            status,
            status_code: None,
            elapsed: Duration::ZERO,
            error_message: None,
            attempts: 1,
            content_matched: None,
        }
    }

    /// 设置HTTP状态码
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// 设置探测耗时
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// 设置错误信息
    pub fn with_error(mut self, error_message: String) -> Self {
        self.error_message = Some(error_message);
        self
    }

    /// 设置请求次数
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// 设置内容匹配结果
    pub fn with_content_matched(mut self, matched: bool) -> Self {
        self.content_matched = Some(matched);
        self
    }

    /// 是否健康
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// 探测耗时（毫秒）
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    /// 用于日志的一行摘要
    pub fn summary(&self) -> String {
        let outcome = match (&self.error_message, self.status_code) {
            (Some(error), _) => error.clone(),
            (None, Some(code)) => format!("HTTP {}", code),
            (None, None) => self.status.to_string(),
        };
        format!(
            "{} ({}ms, {} 次请求)",
            outcome,
            self.elapsed_ms(),
            self.attempts
        )
    }
}
