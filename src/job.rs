//! 健康检测任务
//!
//! 串联配置解析、健康检测、密钥获取和告警发送，每次调用执行一遍

use crate::config::EnvConfigLoader;
use crate::error::Result;
use crate::health::HealthChecker;
use crate::notification::{AlertContext, NotificationDispatcher};
use crate::secrets::SecretResolver;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// 调用结果的消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvocationBody {
    /// 目标健康
    Healthy {
        url: String,
        timestamp: DateTime<Utc>,
    },
    /// 目标异常，已尝试发送告警
    Unhealthy {
        url: String,
        notification_sent: bool,
        timestamp: DateTime<Utc>,
    },
    /// 调用过程出错
    Error {
        error: String,
        timestamp: DateTime<Utc>,
    },
}

/// 单次调用结果
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResult {
    /// 200 表示健康，其余情况为 500
    pub status_code: u16,
    /// 消息体
    pub body: InvocationBody,
}

/// 调用结果的传输格式，`body` 为 JSON 字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResult {
    /// 健康结果
    pub fn healthy(url: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: InvocationBody::Healthy {
                url: url.into(),
                timestamp: Utc::now(),
            },
        }
    }

    /// 异常结果
    pub fn unhealthy(url: impl Into<String>, notification_sent: bool) -> Self {
        Self {
            status_code: 500,
            body: InvocationBody::Unhealthy {
                url: url.into(),
                notification_sent,
                timestamp: Utc::now(),
            },
        }
    }

    /// 错误结果
    pub fn error(error: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: InvocationBody::Error {
                error: error.into(),
                timestamp: Utc::now(),
            },
        }
    }

    /// 结果状态名称
    pub fn status(&self) -> &'static str {
        match self.body {
            InvocationBody::Healthy { .. } => "healthy",
            InvocationBody::Unhealthy { .. } => "unhealthy",
            InvocationBody::Error { .. } => "error",
        }
    }

    /// 转换为传输格式
    pub fn to_response(&self) -> std::result::Result<InvocationResponse, serde_json::Error> {
        Ok(InvocationResponse {
            status_code: self.status_code,
            body: serde_json::to_string(&self.body)?,
        })
    }
}

/// 健康检测任务
///
/// 所有外部依赖都通过构造参数注入，任务本身不保存调用之间的状态。
#[derive(Clone)]
pub struct HealthCheckJob {
    config_loader: EnvConfigLoader,
    checker: Arc<dyn HealthChecker>,
    secrets: SecretResolver,
    dispatcher: NotificationDispatcher,
}

impl HealthCheckJob {
    /// 创建新的健康检测任务
    ///
    /// # 参数
    /// * `config_loader` - 配置加载器
    /// * `checker` - 健康检测器
    /// * `secrets` - 密钥解析器
    /// * `dispatcher` - 通知调度器
    ///
    /// # 返回
    /// * `Self` - 任务实例
    pub fn new(
        config_loader: EnvConfigLoader,
        checker: Arc<dyn HealthChecker>,
        secrets: SecretResolver,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            config_loader,
            checker,
            secrets,
            dispatcher,
        }
    }

    /// 处理一次调用
    ///
    /// 触发事件不参与检测逻辑。任何错误（包括 panic）都会转换为 `error` 结果返回。
    ///
    /// # 参数
    /// * `event` - 触发事件
    ///
    /// # 返回
    /// * `InvocationResult` - 调用结果
    pub async fn handle(&self, event: &serde_json::Value) -> InvocationResult {
        let span = info_span!("invocation", id = %Uuid::new_v4());

        async move {
            info!("开始健康检测，时间: {}", Utc::now().to_rfc3339());
            debug!("触发事件: {}", event);

            let result = match AssertUnwindSafe(self.execute()).catch_unwind().await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => {
                    error!("健康检测任务失败: {}", e);
                    InvocationResult::error(e.to_string())
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!("健康检测任务异常终止: {}", message);
                    InvocationResult::error(message)
                }
            };

            info!(
                "健康检测结束: {} (statusCode {})",
                result.status(),
                result.status_code
            );
            result
        }
        .instrument(span)
        .await
    }

    /// 执行检测流程
    async fn execute(&self) -> Result<InvocationResult> {
        let config = self.config_loader.load()?;
        info!("检测URL: {}", config.target_url);
        info!("通知类型: {}", config.notification_type);

        let health = self.checker.check(&config.target_url).await;
        if health.is_healthy() {
            info!("目标服务健康");
            return Ok(InvocationResult::healthy(config.target_url));
        }

        warn!("目标服务异常: {}，准备发送告警", health.summary());
        let credentials = self.secrets.resolve(&config.secret_name).await?;
        let alert = AlertContext::from_health(&health);
        let notification_sent = self
            .dispatcher
            .notify(&config.notification_type, &credentials, &alert)
            .await;

        Ok(InvocationResult::unhealthy(config.target_url, notification_sent))
    }
}

/// 提取 panic 信息
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("内部错误: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("内部错误: {}", message)
    } else {
        "内部错误".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_healthy_response_shape() {
        let response = InvocationResult::healthy("http://nginx.internal/")
            .to_response()
            .unwrap();
        assert_eq!(response.status_code, 200);

        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["url"], "http://nginx.internal/");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(body.get("notification_sent").is_none());
    }

    #[test]
    fn test_unhealthy_response_shape() {
        let result = InvocationResult::unhealthy("http://nginx.internal/", false);
        assert_eq!(result.status(), "unhealthy");

        let response = result.to_response().unwrap();
        assert_eq!(response.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["notification_sent"], false);
    }

    #[test]
    fn test_error_response_uses_status_code_key() {
        let response = InvocationResult::error("缺少必需的环境变量: TARGET_URL")
            .to_response()
            .unwrap();
        let wire = serde_json::to_value(&response).unwrap();

        assert_eq!(wire["statusCode"], 500);
        let body: serde_json::Value = serde_json::from_str(wire["body"].as_str().unwrap()).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "缺少必需的环境变量: TARGET_URL");
        assert!(body.get("url").is_none());
    }

    #[test]
    fn test_panic_message() {
        let panic: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(panic.as_ref()), "内部错误: boom");
        let panic: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(panic.as_ref()), "内部错误");
    }
}
