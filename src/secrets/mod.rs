//! 密钥模块
//!
//! 在检测异常时从外部密钥存储获取通知凭据

pub mod aws;
pub mod store;

// 重新导出主要类型
pub use aws::AwsSecretsManagerStore;
pub use store::{NotificationCredentials, SecretResolver, SecretStore};
