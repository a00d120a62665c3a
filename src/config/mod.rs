//! 配置管理模块
//!
//! 提供单次检测配置的解析和校验功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{ConfigSource, EnvConfigLoader, EnvSource};
pub use types::{ChannelKind, CheckConfig};
