//! 配置加载器实现
//!
//! 从执行环境中读取单次检测配置，缺少必需项时立即失败

use crate::config::types::{
    ChannelKind, CheckConfig, NOTIFICATION_TYPE_VAR, SECRET_NAME_VAR, TARGET_URL_VAR,
};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::sync::Arc;

/// 配置来源trait，按名称读取配置值
pub trait ConfigSource: Send + Sync {
    /// 读取配置值
    ///
    /// # 参数
    /// * `key` - 配置名称
    ///
    /// # 返回
    /// * `Option<String>` - 配置值，不存在时返回 `None`
    fn get(&self, key: &str) -> Option<String>;
}

/// 进程环境变量配置来源
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// 环境配置加载器
#[derive(Clone)]
pub struct EnvConfigLoader {
    /// 配置来源
    source: Arc<dyn ConfigSource>,
}

impl EnvConfigLoader {
    /// 创建新的配置加载器
    ///
    /// # 参数
    /// * `source` - 配置来源
    ///
    /// # 返回
    /// * `Self` - 加载器实例
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self { source }
    }

    /// 从进程环境变量读取配置的加载器
    pub fn from_env() -> Self {
        Self::new(Arc::new(EnvSource))
    }

    /// 读取非空配置值，空白字符串视为未设置
    fn non_empty(&self, key: &str) -> Option<String> {
        self.source
            .get(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// 读取必需的配置值
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.non_empty(key).ok_or_else(|| ConfigError::MissingVar {
            var: key.to_string(),
        })
    }

    /// 解析单次检测配置
    ///
    /// # 返回
    /// * `Result<CheckConfig, ConfigError>` - 配置或错误
    pub fn load(&self) -> Result<CheckConfig, ConfigError> {
        let target_url = self.required(TARGET_URL_VAR)?;
        let secret_name = self.required(SECRET_NAME_VAR)?;
        let notification_type = self
            .non_empty(NOTIFICATION_TYPE_VAR)
            .unwrap_or_else(|| ChannelKind::default().to_string());

        let config = CheckConfig {
            target_url,
            notification_type,
            secret_name,
        };

        tracing::debug!("配置内容: {:?}", config);
        Ok(config)
    }
}
