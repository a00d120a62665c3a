//! 配置数据结构定义
//!
//! 定义单次检测所需的配置结构体和通知渠道类型

use std::fmt;
use std::str::FromStr;

/// 目标URL环境变量名
pub const TARGET_URL_VAR: &str = "TARGET_URL";
/// 通知类型环境变量名
pub const NOTIFICATION_TYPE_VAR: &str = "NOTIFICATION_TYPE";
/// 密钥名称环境变量名
pub const SECRET_NAME_VAR: &str = "SECRET_NAME";

/// 通知渠道类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Slack webhook
    #[default]
    Slack,
    /// Telegram Bot API
    Telegram,
}

impl ChannelKind {
    /// 所有支持的渠道
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Slack, ChannelKind::Telegram];

    /// 渠道名称
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Slack => "slack",
            ChannelKind::Telegram => "telegram",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slack" => Ok(ChannelKind::Slack),
            "telegram" => Ok(ChannelKind::Telegram),
            other => Err(format!(
                "未知的通知类型: {}，支持的类型: {:?}",
                other,
                ChannelKind::ALL.map(|kind| kind.as_str())
            )),
        }
    }
}

/// 单次检测配置
///
/// 每次调用时从环境中解析一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// 待检测的URL
    pub target_url: String,
    /// 原始通知类型（未识别的值留到发送通知时再处理）
    pub notification_type: String,
    /// 密钥存储中的密钥名称
    pub secret_name: String,
}

impl CheckConfig {
    /// 解析通知渠道，无法识别时返回 `None`
    pub fn channel_kind(&self) -> Option<ChannelKind> {
        self.notification_type.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_kind_parsing_is_case_insensitive() {
        assert_eq!("slack".parse::<ChannelKind>(), Ok(ChannelKind::Slack));
        assert_eq!("Telegram".parse::<ChannelKind>(), Ok(ChannelKind::Telegram));
        assert_eq!(" SLACK ".parse::<ChannelKind>(), Ok(ChannelKind::Slack));
        assert!("discord".parse::<ChannelKind>().is_err());
    }

    #[test]
    fn test_channel_kind_display() {
        assert_eq!(ChannelKind::Slack.to_string(), "slack");
        assert_eq!(ChannelKind::Telegram.to_string(), "telegram");
        assert_eq!(ChannelKind::default(), ChannelKind::Slack);
    }

    #[test]
    fn test_unknown_channel_kind_is_kept_in_config() {
        let config = CheckConfig {
            target_url: "http://example.com".to_string(),
            notification_type: "pager".to_string(),
            secret_name: "alerts".to_string(),
        };
        assert_eq!(config.channel_kind(), None);
    }
}
