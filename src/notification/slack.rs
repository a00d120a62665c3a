//! Slack 通知发送器模块
//!
//! 实现 Slack incoming webhook 通知功能

use crate::config::types::ChannelKind;
use crate::error::NotificationError;
use crate::notification::sender::{AlertContext, Notifier};
use crate::notification::template::{ALERT_STATUS, ALERT_TITLE};
use crate::secrets::store::SLACK_WEBHOOK_URL_KEY;
use crate::secrets::NotificationCredentials;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

const CHANNEL: &str = "slack";

/// Slack 通知发送器
pub struct SlackNotifier {
    /// HTTP客户端
    client: Client,
}

impl SlackNotifier {
    /// 创建新的 Slack 发送器
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 构建 Slack 消息体
    pub fn build_message_body(alert: &AlertContext) -> Value {
        json!({
            "text": ALERT_TITLE,
            "attachments": [
                {
                    "color": "danger",
                    "fields": [
                        {
                            "title": "Status",
                            "value": ALERT_STATUS,
                            "short": true
                        },
                        {
                            "title": "Target URL",
                            "value": alert.target_url,
                            "short": true
                        },
                        {
                            "title": "Time",
                            "value": alert.formatted_time(),
                            "short": true
                        }
                    ]
                }
            ]
        })
    }

    /// 发送消息到 webhook
    async fn send_to_webhook(
        &self,
        webhook_url: &str,
        body: &Value,
    ) -> Result<(), NotificationError> {
        // webhook 地址本身就是凭据，不写入日志
        debug!("发送消息到 Slack webhook");

        let response = self
            .client
            .post(webhook_url)
            .json(body)
            .send()
            .await
            .map_err(|e| NotificationError::Transport {
                channel: CHANNEL,
                message: e.without_url().to_string(),
            })?;

        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(NotificationError::UnexpectedStatus {
                channel: CHANNEL,
                status: response.status().as_u16(),
            })
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn channel(&self) -> ChannelKind {
        ChannelKind::Slack
    }

    async fn send_alert(
        &self,
        credentials: &NotificationCredentials,
        alert: &AlertContext,
    ) -> Result<(), NotificationError> {
        let webhook_url = credentials.get(SLACK_WEBHOOK_URL_KEY).ok_or(
            NotificationError::MissingCredential {
                channel: CHANNEL,
                key: SLACK_WEBHOOK_URL_KEY,
            },
        )?;

        let body = Self::build_message_body(alert);
        self.send_to_webhook(webhook_url, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::collections::HashMap;

    fn credentials(webhook_url: &str) -> NotificationCredentials {
        NotificationCredentials::new(HashMap::from([(
            SLACK_WEBHOOK_URL_KEY.to_string(),
            webhook_url.to_string(),
        )]))
    }

    #[test]
    fn test_message_body_layout() {
        let alert = AlertContext::new("http://nginx.internal/");
        let body = SlackNotifier::build_message_body(&alert);

        assert_eq!(body["text"], ALERT_TITLE);
        let attachment = &body["attachments"][0];
        assert_eq!(attachment["color"], "danger");
        let fields = attachment["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0]["title"], "Status");
        assert_eq!(fields[1]["value"], "http://nginx.internal/");
        assert!(fields[2]["value"].as_str().unwrap().ends_with(" UTC"));
        assert!(fields.iter().all(|field| field["short"] == true));
    }

    #[tokio::test]
    async fn test_send_alert_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/services/T000/B000/XXX")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({ "text": ALERT_TITLE })))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let notifier = SlackNotifier::new(Client::new());
        let alert = AlertContext::new("http://nginx.internal/");
        let webhook = format!("{}/services/T000/B000/XXX", server.url());

        let result = notifier.send_alert(&credentials(&webhook), &alert).await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_non_200_is_failure() {
        let mut server = mockito::Server::new_async().await;
        for code in [202, 503] {
            let path = format!("/hook-{code}");
            server
                .mock("POST", path.as_str())
                .with_status(code)
                .create_async()
                .await;

            let notifier = SlackNotifier::new(Client::new());
            let alert = AlertContext::new("http://nginx.internal/");
            let result = notifier
                .send_alert(&credentials(&format!("{}{}", server.url(), path)), &alert)
                .await;

            assert!(matches!(
                result,
                Err(NotificationError::UnexpectedStatus { status, .. }) if status == code as u16
            ));
        }
    }

    #[tokio::test]
    async fn test_missing_webhook_url_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let notifier = SlackNotifier::new(Client::new());
        let alert = AlertContext::new(server.url());
        let result = notifier
            .send_alert(&NotificationCredentials::default(), &alert)
            .await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(NotificationError::MissingCredential {
                key: SLACK_WEBHOOK_URL_KEY,
                ..
            })
        ));
    }
}
