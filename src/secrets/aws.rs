//! AWS Secrets Manager 密钥存储实现

use crate::error::SecretError;
use crate::secrets::store::SecretStore;
use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::operation::get_secret_value::{
    GetSecretValueError, GetSecretValueOutput,
};
use aws_sdk_secretsmanager::Client;
use std::fmt;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

/// AWS Secrets Manager 密钥存储
///
/// 客户端在第一次读取密钥时才创建。加载区域和凭据可能访问实例元数据服务，
/// 目标健康或配置缺失的调用不会触发这些请求。
#[derive(Debug)]
pub struct AwsSecretsManagerStore {
    client: OnceCell<Client>,
    operation_timeout: Duration,
}

impl AwsSecretsManagerStore {
    /// 使用默认凭据链和区域配置创建存储
    ///
    /// # 参数
    /// * `operation_timeout` - 单次操作超时时间（包含SDK内部重试）
    ///
    /// # 返回
    /// * `Self` - 存储实例，客户端延迟到首次使用时加载
    pub fn from_env(operation_timeout: Duration) -> Self {
        Self {
            client: OnceCell::new(),
            operation_timeout,
        }
    }

    /// 获取客户端，首次调用时加载SDK配置
    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let timeouts = TimeoutConfig::builder()
                    .operation_timeout(self.operation_timeout)
                    .build();
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .timeout_config(timeouts)
                    .load()
                    .await;

                debug!(
                    "AWS Secrets Manager 客户端已创建，区域: {:?}",
                    sdk_config.region()
                );
                Client::new(&sdk_config)
            })
            .await
    }

    /// 将SDK错误映射为密钥错误
    fn map_error<R>(name: &str, err: SdkError<GetSecretValueError, R>) -> SecretError
    where
        R: fmt::Debug + Send + Sync + 'static,
    {
        let message = DisplayErrorContext(&err).to_string();
        let service_error = err.into_service_error();

        if service_error.is_resource_not_found_exception() {
            SecretError::NotFound {
                name: name.to_string(),
            }
        } else if service_error.code() == Some("AccessDeniedException") {
            SecretError::AccessDenied {
                name: name.to_string(),
                message,
            }
        } else {
            SecretError::Unavailable {
                name: name.to_string(),
                message,
            }
        }
    }

    /// 取出密钥内容，二进制密钥按UTF-8解码
    fn secret_text(name: &str, output: GetSecretValueOutput) -> Result<String, SecretError> {
        if let Some(secret_string) = output.secret_string() {
            return Ok(secret_string.to_string());
        }

        match output.secret_binary() {
            Some(secret_binary) => String::from_utf8(secret_binary.as_ref().to_vec()).map_err(
                |_| SecretError::Malformed {
                    name: name.to_string(),
                    reason: "二进制密钥不是有效的UTF-8".to_string(),
                },
            ),
            None => Err(SecretError::Empty {
                name: name.to_string(),
            }),
        }
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManagerStore {
    async fn get_secret_string(&self, name: &str) -> Result<String, SecretError> {
        let output = self
            .client()
            .await
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| Self::map_error(name, e))?;

        Self::secret_text(name, output)
    }
}
