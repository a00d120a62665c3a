//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands};
use crate::config::EnvConfigLoader;
use crate::error::Result;
use crate::health::{HttpHealthChecker, RetryPolicy};
use crate::job::{HealthCheckJob, InvocationResult};
use crate::notification::{AlertTemplate, NotificationDispatcher, SlackNotifier, TelegramNotifier};
use crate::secrets::{AwsSecretsManagerStore, SecretResolver};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    ///
    /// # 返回
    /// * `Result<i32>` - 进程退出码
    async fn execute(&self, args: &Args) -> Result<i32>;
}

/// 根据命令行参数创建命令处理器
pub fn command_for(args: &Args) -> Box<dyn Command> {
    match args.command() {
        Commands::Run { event } => Box::new(RunCommand { event }),
        Commands::Validate => Box::new(ValidateCommand),
    }
}

/// 创建共享的HTTP客户端
///
/// 客户端级超时作用于通知请求，健康检测请求使用各自的超时。
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
        .build()
        .map_err(|e| anyhow::anyhow!("创建HTTP客户端失败: {}", e))?;
    Ok(client)
}

/// 组装健康检测任务
///
/// 只创建客户端，不发起任何网络请求。
pub fn build_job(args: &Args) -> Result<HealthCheckJob> {
    let client = build_http_client(Duration::from_secs(args.notify_timeout))?;

    let checker = HttpHealthChecker::new(
        client.clone(),
        Duration::from_secs(args.probe_timeout),
        RetryPolicy {
            max_retries: args.probe_retries,
            backoff_factor: args.backoff_factor,
        },
    );

    let store = AwsSecretsManagerStore::from_env(Duration::from_secs(args.secret_timeout));

    let template = AlertTemplate::new(args.message_template.as_deref())?;
    let dispatcher = NotificationDispatcher::new(
        Arc::new(SlackNotifier::new(client.clone())),
        Arc::new(TelegramNotifier::new(
            client,
            args.telegram_api_base.clone(),
            template,
        )),
    );

    Ok(HealthCheckJob::new(
        EnvConfigLoader::from_env(),
        Arc::new(checker),
        SecretResolver::new(Arc::new(store)),
        dispatcher,
    ))
}

/// 执行一次检测
pub struct RunCommand {
    /// 触发事件（JSON）
    pub event: Option<String>,
}

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self, args: &Args) -> Result<i32> {
        let event = parse_event(self.event.as_deref());
        let result = match build_job(args) {
            Ok(job) => job.handle(&event).await,
            Err(e) => {
                error!("初始化健康检测任务失败: {}", e);
                InvocationResult::error(e.to_string())
            }
        };

        println!("{}", serde_json::to_string(&result.to_response()?)?);
        Ok(if result.status_code == 200 { 0 } else { 1 })
    }
}

/// 解析触发事件
///
/// 事件不参与检测逻辑，无法解析为JSON时按原始字符串传递。
fn parse_event(raw: Option<&str>) -> serde_json::Value {
    match raw {
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            debug!("触发事件不是有效的JSON，按字符串处理: {}", e);
            serde_json::Value::String(raw.to_string())
        }),
        None => serde_json::Value::Null,
    }
}

/// 配置校验命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<i32> {
        let config = match EnvConfigLoader::from_env().load() {
            Ok(config) => config,
            Err(e) => {
                println!("❌ {}", e);
                return Ok(1);
            }
        };

        if let Err(e) = AlertTemplate::new(args.message_template.as_deref()) {
            println!("❌ {}", e);
            return Ok(1);
        }

        println!("检测URL: {}", config.target_url);
        println!("密钥名称: {}", config.secret_name);
        match config.channel_kind() {
            Some(kind) => {
                println!("通知渠道: {}", kind);
                println!("✅ 配置有效");
                Ok(0)
            }
            None => {
                println!(
                    "⚠️ 未知的通知类型 '{}'，异常时将无法发送告警",
                    config.notification_type
                );
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_event_accepts_json() {
        assert_eq!(
            parse_event(Some(r#"{"source":"aws.events"}"#)),
            json!({"source": "aws.events"})
        );
        assert_eq!(parse_event(None), serde_json::Value::Null);
    }

    #[test]
    fn test_parse_event_keeps_invalid_json_as_string() {
        assert_eq!(
            parse_event(Some("not-json")),
            serde_json::Value::String("not-json".to_string())
        );
        assert_eq!(parse_event(Some("")), json!(""));
    }
}
