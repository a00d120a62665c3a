//! 密钥存储抽象与通知凭据解析
//!
//! 凭据只在内存中使用，不写入磁盘，也不写入日志

use crate::error::SecretError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Slack webhook 地址字段
pub const SLACK_WEBHOOK_URL_KEY: &str = "slack_webhook_url";
/// Telegram bot token 字段
pub const TELEGRAM_BOT_TOKEN_KEY: &str = "telegram_bot_token";
/// Telegram chat id 字段
pub const TELEGRAM_CHAT_ID_KEY: &str = "telegram_chat_id";

/// 密钥存储trait
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// 按名称读取密钥的原始字符串内容
    ///
    /// # 参数
    /// * `name` - 密钥名称
    ///
    /// # 返回
    /// * `Result<String, SecretError>` - 密钥内容或错误
    async fn get_secret_string(&self, name: &str) -> Result<String, SecretError>;
}

/// 通知凭据
///
/// `Debug` 输出只包含字段名。
#[derive(Clone, Default, PartialEq, Eq)]
pub struct NotificationCredentials {
    values: HashMap<String, String>,
}

impl NotificationCredentials {
    /// 从键值对创建凭据
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 解析密钥中的JSON对象
    ///
    /// 字符串值原样保留，数字和布尔值转为字符串，嵌套值被忽略。
    ///
    /// # 参数
    /// * `name` - 密钥名称（用于错误信息）
    /// * `payload` - 密钥内容
    ///
    /// # 返回
    /// * `Result<Self, SecretError>` - 凭据或错误
    pub fn from_json(name: &str, payload: &str) -> Result<Self, SecretError> {
        let parsed: Value = serde_json::from_str(payload).map_err(|e| SecretError::Malformed {
            name: name.to_string(),
            reason: format!("JSON解析失败: {}", e),
        })?;

        let Value::Object(map) = parsed else {
            return Err(SecretError::Malformed {
                name: name.to_string(),
                reason: "内容不是JSON对象".to_string(),
            });
        };

        let values = map
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key, value))
            })
            .collect();

        Ok(Self { values })
    }

    /// 读取非空字段
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// 字段名列表
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for NotificationCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCredentials")
            .field("keys", &self.keys())
            .finish()
    }
}

/// 密钥解析器，每次调用都重新获取，不做缓存
#[derive(Clone)]
pub struct SecretResolver {
    store: Arc<dyn SecretStore>,
}

impl SecretResolver {
    /// 创建新的密钥解析器
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// 获取并解析通知凭据
    ///
    /// # 参数
    /// * `name` - 密钥名称
    ///
    /// # 返回
    /// * `Result<NotificationCredentials, SecretError>` - 凭据或错误
    pub async fn resolve(&self, name: &str) -> Result<NotificationCredentials, SecretError> {
        info!("正在获取密钥: {}", name);
        let payload = self.store.get_secret_string(name).await?;
        let credentials = NotificationCredentials::from_json(name, &payload)?;
        tracing::debug!("密钥 {} 包含字段: {:?}", name, credentials.keys());
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 固定内容的密钥存储，`None` 表示密钥不存在
    struct FixedStore(Option<String>);

    #[async_trait]
    impl SecretStore for FixedStore {
        async fn get_secret_string(&self, name: &str) -> Result<String, SecretError> {
            self.0.clone().ok_or_else(|| SecretError::NotFound {
                name: name.to_string(),
            })
        }
    }

    fn resolver(store: FixedStore) -> SecretResolver {
        SecretResolver::new(Arc::new(store))
    }

    #[test]
    fn test_parse_slack_secret() {
        let credentials = NotificationCredentials::from_json(
            "alerts",
            r#"{"slack_webhook_url": "https://hooks.example/x"}"#,
        )
        .unwrap();
        assert_eq!(
            credentials.get(SLACK_WEBHOOK_URL_KEY),
            Some("https://hooks.example/x")
        );
        assert_eq!(credentials.get(TELEGRAM_BOT_TOKEN_KEY), None);
    }

    #[test]
    fn test_numeric_chat_id_is_stringified() {
        let credentials = NotificationCredentials::from_json(
            "alerts",
            r#"{"telegram_bot_token": "123:abc", "telegram_chat_id": -100200300, "extra": {"a": 1}}"#,
        )
        .unwrap();
        assert_eq!(credentials.get(TELEGRAM_CHAT_ID_KEY), Some("-100200300"));
        assert_eq!(credentials.keys(), vec!["telegram_bot_token", "telegram_chat_id"]);
    }

    #[test]
    fn test_empty_value_is_treated_as_missing() {
        let credentials =
            NotificationCredentials::from_json("alerts", r#"{"slack_webhook_url": ""}"#).unwrap();
        assert_eq!(credentials.get(SLACK_WEBHOOK_URL_KEY), None);
    }

    #[test]
    fn test_malformed_payloads() {
        for payload in ["not json", "[1, 2]", "\"just a string\""] {
            let err = NotificationCredentials::from_json("alerts", payload).unwrap_err();
            assert!(matches!(err, SecretError::Malformed { ref name, .. } if name == "alerts"));
        }
    }

    #[test]
    fn test_debug_output_hides_values() {
        let credentials = NotificationCredentials::from_json(
            "alerts",
            r#"{"telegram_bot_token": "123:super-secret", "telegram_chat_id": "42"}"#,
        )
        .unwrap();
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("telegram_bot_token"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("42"));
    }

    #[tokio::test]
    async fn test_resolver_propagates_store_errors() {
        let resolver = resolver(FixedStore(None));
        let err = resolver.resolve("missing/secret").await.unwrap_err();
        assert!(matches!(err, SecretError::NotFound { ref name } if name == "missing/secret"));
    }

    #[tokio::test]
    async fn test_resolver_parses_payload() {
        let resolver = resolver(FixedStore(Some(
            r#"{"slack_webhook_url": "https://hooks.example/x"}"#.to_string(),
        )));
        let credentials = resolver.resolve("alerts").await.unwrap();
        assert_eq!(
            credentials.get(SLACK_WEBHOOK_URL_KEY),
            Some("https://hooks.example/x")
        );
    }
}
