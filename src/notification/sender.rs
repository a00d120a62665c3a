//! 通知发送器模块
//!
//! 定义通知发送的trait以及按渠道分发告警的调度器

use crate::config::types::ChannelKind;
use crate::error::NotificationError;
use crate::health::HealthResult;
use crate::secrets::NotificationCredentials;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 告警上下文
#[derive(Debug, Clone)]
pub struct AlertContext {
    /// 检测的URL
    pub target_url: String,
    /// 告警触发时间
    pub triggered_at: DateTime<Utc>,
    /// HTTP状态码（如果收到响应）
    pub status_code: Option<u16>,
    /// 检测错误信息
    pub error_message: Option<String>,
}

impl AlertContext {
    /// 创建新的告警上下文
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            triggered_at: Utc::now(),
            status_code: None,
            error_message: None,
        }
    }

    /// 根据检测结果创建告警上下文
    pub fn from_health(result: &HealthResult) -> Self {
        Self {
            target_url: result.url.clone(),
            triggered_at: Utc::now(),
            status_code: result.status_code,
            error_message: result.error_message.clone(),
        }
    }

    /// 告警时间，格式为 `%Y-%m-%d %H:%M:%S UTC`
    pub fn formatted_time(&self) -> String {
        self.triggered_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

/// 通知发送器trait
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送器对应的渠道
    fn channel(&self) -> ChannelKind;

    /// 发送健康检测告警
    ///
    /// # 参数
    /// * `credentials` - 通知凭据
    /// * `alert` - 告警上下文
    ///
    /// # 返回
    /// * `Result<(), NotificationError>` - 发送结果，只有状态码 200 视为成功
    async fn send_alert(
        &self,
        credentials: &NotificationCredentials,
        alert: &AlertContext,
    ) -> Result<(), NotificationError>;
}

/// 通知调度器，每次调用只选择一个渠道
#[derive(Clone)]
pub struct NotificationDispatcher {
    slack: Arc<dyn Notifier>,
    telegram: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    /// 创建新的通知调度器
    ///
    /// # 参数
    /// * `slack` - Slack 发送器
    /// * `telegram` - Telegram 发送器
    ///
    /// # 返回
    /// * `Self` - 调度器实例
    pub fn new(slack: Arc<dyn Notifier>, telegram: Arc<dyn Notifier>) -> Self {
        Self { slack, telegram }
    }

    /// 获取渠道对应的发送器
    pub fn notifier_for(&self, kind: ChannelKind) -> &dyn Notifier {
        match kind {
            ChannelKind::Slack => self.slack.as_ref(),
            ChannelKind::Telegram => self.telegram.as_ref(),
        }
    }

    /// 发送告警
    ///
    /// 任何失败都只记录日志并返回 `false`，不会向上传播。
    ///
    /// # 参数
    /// * `notification_type` - 配置中的通知类型
    /// * `credentials` - 通知凭据
    /// * `alert` - 告警上下文
    ///
    /// # 返回
    /// * `bool` - 是否发送成功
    pub async fn notify(
        &self,
        notification_type: &str,
        credentials: &NotificationCredentials,
        alert: &AlertContext,
    ) -> bool {
        let kind = match notification_type.parse::<ChannelKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };

        let notifier = self.notifier_for(kind);
        info!("通过 {} 发送告警: {}", notifier.channel(), alert.target_url);
        match notifier.send_alert(credentials, alert).await {
            Ok(()) => {
                info!("{} 通知发送成功", notifier.channel());
                true
            }
            Err(e) => {
                error!(channel = %notifier.channel(), "{}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 记录调用次数的发送器
    struct RecordingNotifier {
        kind: ChannelKind,
        succeed: bool,
        calls: AtomicUsize,
    }

    impl RecordingNotifier {
        fn new(kind: ChannelKind, succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                kind,
                succeed,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn channel(&self) -> ChannelKind {
            self.kind
        }

        async fn send_alert(
            &self,
            _credentials: &NotificationCredentials,
            _alert: &AlertContext,
        ) -> Result<(), NotificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(NotificationError::UnexpectedStatus {
                    channel: "test",
                    status: 503,
                })
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_selects_channel() {
        let slack = RecordingNotifier::new(ChannelKind::Slack, true);
        let telegram = RecordingNotifier::new(ChannelKind::Telegram, true);
        let dispatcher = NotificationDispatcher::new(slack.clone(), telegram.clone());
        let alert = AlertContext::new("http://nginx.internal/");
        let credentials = NotificationCredentials::default();

        assert!(dispatcher.notify("slack", &credentials, &alert).await);
        assert!(dispatcher.notify("TELEGRAM", &credentials, &alert).await);

        assert_eq!(slack.calls(), 1);
        assert_eq!(telegram.calls(), 1);
        assert_eq!(
            dispatcher.notifier_for(ChannelKind::Telegram).channel(),
            ChannelKind::Telegram
        );
    }

    #[test]
    fn test_each_channel_has_matching_notifier() {
        let dispatcher = NotificationDispatcher::new(
            RecordingNotifier::new(ChannelKind::Slack, true),
            RecordingNotifier::new(ChannelKind::Telegram, true),
        );

        for kind in ChannelKind::ALL {
            assert_eq!(dispatcher.notifier_for(kind).channel(), kind);
        }
    }

    #[tokio::test]
    async fn test_unknown_channel_returns_false() {
        let slack = RecordingNotifier::new(ChannelKind::Slack, true);
        let telegram = RecordingNotifier::new(ChannelKind::Telegram, true);
        let dispatcher = NotificationDispatcher::new(slack.clone(), telegram.clone());
        let alert = AlertContext::new("http://nginx.internal/");

        let sent = dispatcher
            .notify("pagerduty", &NotificationCredentials::default(), &alert)
            .await;

        assert!(!sent);
        assert_eq!(slack.calls() + telegram.calls(), 0);
    }

    #[tokio::test]
    async fn test_send_failure_returns_false() {
        let slack = RecordingNotifier::new(ChannelKind::Slack, false);
        let telegram = RecordingNotifier::new(ChannelKind::Telegram, true);
        let dispatcher = NotificationDispatcher::new(slack.clone(), telegram);
        let alert = AlertContext::new("http://nginx.internal/");

        let sent = dispatcher
            .notify("slack", &NotificationCredentials::default(), &alert)
            .await;

        assert!(!sent);
        assert_eq!(slack.calls(), 1);
    }

    #[test]
    fn test_alert_time_format() {
        let mut alert = AlertContext::new("http://nginx.internal/");
        alert.triggered_at = DateTime::parse_from_rfc3339("2024-05-01T12:34:56Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(alert.formatted_time(), "2024-05-01 12:34:56 UTC");
    }
}
