//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Nginx Vitals 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum VitalsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 密钥获取相关错误
    #[error("密钥获取错误: {0}")]
    Secret(#[from] SecretError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 必需的环境变量缺失或为空
    #[error("缺少必需的环境变量: {var}")]
    MissingVar { var: String },
}

/// 密钥获取错误类型
///
/// 只携带密钥名称，从不携带密钥内容。
#[derive(Error, Debug)]
pub enum SecretError {
    /// 密钥不存在
    #[error("密钥不存在: {name}")]
    NotFound { name: String },

    /// 无权访问密钥
    #[error("无权访问密钥 {name}: {message}")]
    AccessDenied { name: String, message: String },

    /// 密钥存储不可用（网络、超时等）
    #[error("密钥存储请求失败 {name}: {message}")]
    Unavailable { name: String, message: String },

    /// 密钥没有可读取的内容
    #[error("密钥 {name} 内容为空")]
    Empty { name: String },

    /// 密钥内容无法解析
    #[error("密钥 {name} 格式错误: {reason}")]
    Malformed { name: String, reason: String },
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 凭据中缺少必需字段
    #[error("{channel} 通知凭据缺少字段: {key}")]
    MissingCredential {
        channel: &'static str,
        key: &'static str,
    },

    /// 发送请求失败
    #[error("{channel} 通知发送失败: {message}")]
    Transport {
        channel: &'static str,
        message: String,
    },

    /// 响应状态码不是 200
    #[error("{channel} 通知返回异常状态码: {status}")]
    UnexpectedStatus { channel: &'static str, status: u16 },

    /// 模板渲染错误
    #[error("模板渲染失败: {0}")]
    Template(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, VitalsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_names_variable() {
        let err: VitalsError = ConfigError::MissingVar {
            var: "TARGET_URL".to_string(),
        }
        .into();
        assert!(err.to_string().contains("TARGET_URL"));
    }

    #[test]
    fn test_secret_error_names_secret_only() {
        let err = SecretError::Malformed {
            name: "prod/alerts".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("prod/alerts"));
        assert!(message.contains("格式错误"));
    }
}
