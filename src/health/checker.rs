//! HTTP健康检测器实现
//!
//! 提供HTTP健康检测功能，支持超时和传输层重试

use crate::health::result::{HealthResult, HealthStatus};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 响应体中的预期内容标记（不区分大小写）
pub const DEFAULT_CONTENT_MARKERS: [&str; 2] = ["nginx", "welcome"];

/// 单次退避等待的上限
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// 健康检测器trait，定义检测接口
///
/// 实现方不返回错误：任何传输层失败都会被转换为异常状态的检测结果。
#[async_trait]
pub trait HealthChecker: Send + Sync {
    /// 使用默认超时执行健康检测
    ///
    /// # 参数
    /// * `url` - 检测的URL
    ///
    /// # 返回
    /// * `HealthResult` - 检测结果
    async fn check(&self, url: &str) -> HealthResult;

    /// 带超时的健康检测
    ///
    /// # 参数
    /// * `url` - 检测的URL
    /// * `timeout_duration` - 单次请求超时时间
    ///
    /// # 返回
    /// * `HealthResult` - 检测结果
    async fn check_with_timeout(&self, url: &str, timeout_duration: Duration) -> HealthResult;
}

/// 传输层重试策略
///
/// 只在连接、超时等传输错误时重试，收到任何HTTP响应都不重试。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// 首次请求之后的最大重试次数
    pub max_retries: u32,
    /// 指数退避系数（秒）
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_factor: 1.0,
        }
    }
}

impl RetryPolicy {
    /// 不重试的策略
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_factor: 0.0,
        }
    }

    /// 计算第 `consecutive_errors` 次连续错误之后的等待时间
    ///
    /// 第一次错误后立即重试，之后为 `backoff_factor * 2^(n-1)` 秒。
    pub fn backoff_for(&self, consecutive_errors: u32) -> Duration {
        if consecutive_errors <= 1 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = (consecutive_errors - 1).min(16) as i32;
        let seconds = self.backoff_factor * 2f64.powi(exponent);
        Duration::from_secs_f64(seconds).min(MAX_BACKOFF)
    }

    /// 判断请求错误是否值得重试
    fn is_retryable(error: &reqwest::Error) -> bool {
        !error.is_builder()
    }
}

/// HTTP健康检测器实现
pub struct HttpHealthChecker {
    /// HTTP客户端
    client: Client,
    /// 默认超时时间
    default_timeout: Duration,
    /// 重试策略
    retry_policy: RetryPolicy,
}

impl HttpHealthChecker {
    /// 创建新的HTTP健康检测器
    ///
    /// # 参数
    /// * `client` - 共享的HTTP客户端
    /// * `timeout` - 默认超时时间
    /// * `retry_policy` - 重试策略
    ///
    /// # 返回
    /// * `Self` - 检测器实例
    pub fn new(client: Client, timeout: Duration, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            default_timeout: timeout,
            retry_policy,
        }
    }

    /// 检查响应体是否包含预期内容
    fn matches_expected_content(body: &str) -> bool {
        let body = body.to_lowercase();
        DEFAULT_CONTENT_MARKERS
            .iter()
            .any(|marker| body.contains(marker))
    }

    /// 处理收到的HTTP响应
    async fn process_response(
        &self,
        url: &str,
        response: Response,
        elapsed: Duration,
        attempts: u32,
    ) -> HealthResult {
        let status_code = response.status().as_u16();
        let status = HealthStatus::from_status_code(status_code);
        info!("响应状态码: {} ({})", status_code, status);

        let mut result = HealthResult::new(url.to_string(), status)
            .with_status_code(status_code)
            .with_elapsed(elapsed)
            .with_attempts(attempts);

        if status.is_healthy() {
            // 内容检查只用于诊断，2xx 一律判定为健康
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("读取响应体失败: {}", e.without_url());
                    String::new()
                }
            };
            let matched = Self::matches_expected_content(&body);
            if matched {
                info!("响应包含预期的 nginx 内容");
            } else {
                warn!("状态码正常，但响应中未检测到 nginx 内容");
            }
            result = result.with_content_matched(matched);
        } else {
            warn!("异常状态码: {}", status_code);
            result = result.with_error(format!(
                "HTTP {} {}",
                status_code,
                response.status().canonical_reason().unwrap_or("Unknown")
            ));
        }

        result
    }

    /// 创建错误结果
    fn create_error_result(
        &self,
        url: &str,
        elapsed: Duration,
        attempts: u32,
        error_message: String,
    ) -> HealthResult {
        HealthResult::new(url.to_string(), HealthStatus::Down)
            .with_elapsed(elapsed)
            .with_attempts(attempts)
            .with_error(error_message)
    }

    /// 格式化请求错误信息，使其更加清晰易读
    fn format_request_error(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            "Request timeout".to_string()
        } else if error.is_connect() {
            "Connection refused".to_string()
        } else if error.is_builder() {
            "Invalid request".to_string()
        } else {
            let error_str = error.to_string();
            if error_str.contains("dns") || error_str.contains("DNS") {
                "DNS resolution failed".to_string()
            } else if error_str.contains("certificate")
                || error_str.contains("tls")
                || error_str.contains("ssl")
            {
                "SSL/TLS certificate error".to_string()
            } else {
                format!("Request failed: {}", error_str)
            }
        }
    }
}

#[async_trait]
impl HealthChecker for HttpHealthChecker {
    async fn check(&self, url: &str) -> HealthResult {
        self.check_with_timeout(url, self.default_timeout).await
    }

    async fn check_with_timeout(&self, url: &str, timeout_duration: Duration) -> HealthResult {
        info!("正在请求 {}，超时 {}s", url, timeout_duration.as_secs_f64());

        let start_time = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let response = self
                .client
                .get(url)
                .timeout(timeout_duration)
                .send()
                .await;

            match response {
                Ok(response) => {
                    return self
                        .process_response(url, response, start_time.elapsed(), attempts)
                        .await;
                }
                Err(e) => {
                    let e = e.without_url();
                    let retries_used = attempts - 1;
                    if retries_used >= self.retry_policy.max_retries
                        || !RetryPolicy::is_retryable(&e)
                    {
                        let message = self.format_request_error(&e);
                        warn!("健康检测失败: {} ({} 次请求)", message, attempts);
                        return self.create_error_result(
                            url,
                            start_time.elapsed(),
                            attempts,
                            message,
                        );
                    }

                    let delay = self.retry_policy.backoff_for(attempts);
                    debug!(
                        "第 {} 次请求失败: {}，{}ms 后重试",
                        attempts,
                        e,
                        delay.as_millis()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }
}
