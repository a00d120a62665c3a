//! Telegram 通知发送器模块
//!
//! 通过 Bot API 的 sendMessage 接口发送告警

use crate::config::types::ChannelKind;
use crate::error::NotificationError;
use crate::notification::sender::{AlertContext, Notifier};
use crate::notification::template::{AlertTemplate, TemplateContext};
use crate::secrets::store::{TELEGRAM_BOT_TOKEN_KEY, TELEGRAM_CHAT_ID_KEY};
use crate::secrets::NotificationCredentials;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error};

/// 默认的 Bot API 地址
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

const CHANNEL: &str = "telegram";

/// Telegram 通知发送器
pub struct TelegramNotifier {
    /// HTTP客户端
    client: Client,
    /// Bot API 地址
    api_base: String,
    /// 消息模板
    template: AlertTemplate,
}

impl TelegramNotifier {
    /// 创建新的 Telegram 发送器
    ///
    /// # 参数
    /// * `client` - HTTP客户端
    /// * `api_base` - Bot API 地址
    /// * `template` - 消息模板
    ///
    /// # 返回
    /// * `Self` - 发送器实例
    pub fn new(client: Client, api_base: impl Into<String>, template: AlertTemplate) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            template,
        }
    }

    /// sendMessage 接口地址，bot token 位于路径中
    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn send_alert(
        &self,
        credentials: &NotificationCredentials,
        alert: &AlertContext,
    ) -> Result<(), NotificationError> {
        let bot_token = credentials.get(TELEGRAM_BOT_TOKEN_KEY);
        let chat_id = credentials.get(TELEGRAM_CHAT_ID_KEY);
        let (bot_token, chat_id) = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => (bot_token, chat_id),
            (None, _) => {
                return Err(NotificationError::MissingCredential {
                    channel: CHANNEL,
                    key: TELEGRAM_BOT_TOKEN_KEY,
                })
            }
            (_, None) => {
                return Err(NotificationError::MissingCredential {
                    channel: CHANNEL,
                    key: TELEGRAM_CHAT_ID_KEY,
                })
            }
        };

        let text = self.template.render_telegram(&TemplateContext::from(alert))?;
        debug!("发送消息到 Telegram Bot API");

        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .form(&[
                ("chat_id", chat_id),
                ("text", text.as_str()),
                ("parse_mode", "Markdown"),
            ])
            .send()
            .await
            .map_err(|e| NotificationError::Transport {
                channel: CHANNEL,
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("Telegram 响应: {}", body);
        Err(NotificationError::UnexpectedStatus {
            channel: CHANNEL,
            status: status.as_u16(),
        })
    }
}
