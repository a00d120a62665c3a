//! 通知模块
//!
//! 提供 Slack / Telegram 告警发送和消息模板功能

pub mod sender;
pub mod slack;
pub mod telegram;
pub mod template;

// 重新导出主要类型
pub use sender::{AlertContext, NotificationDispatcher, Notifier};
pub use slack::SlackNotifier;
pub use telegram::{TelegramNotifier, DEFAULT_TELEGRAM_API_BASE};
pub use template::AlertTemplate;
