//! 消息模板模块
//!
//! 使用 Handlebars 渲染告警消息

use crate::error::NotificationError;
use crate::notification::sender::AlertContext;
use handlebars::Handlebars;
use serde::Serialize;

/// 告警标题
pub const ALERT_TITLE: &str = "🚨 Nginx Health Check Alert";

/// 告警状态描述
pub const ALERT_STATUS: &str = "❌ Nginx is not responding";

/// Telegram 模板名称
const TELEGRAM_TEMPLATE_NAME: &str = "telegram_alert";

/// 默认的 Telegram 告警模板（Markdown）
pub const DEFAULT_TELEGRAM_TEMPLATE: &str = r#"🚨 *Nginx Health Check Alert*

❌ *Status:* Nginx is not responding
🌐 *URL:* `{{target_url}}`
🕒 *Time:* {{timestamp}}

Please check your nginx server immediately."#;

/// 模板上下文数据
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    /// 检测的URL
    pub target_url: String,
    /// 格式化后的UTC时间
    pub timestamp: String,
    /// HTTP状态码
    pub status_code: Option<u16>,
    /// 错误信息
    pub error_message: Option<String>,
}

impl From<&AlertContext> for TemplateContext {
    fn from(alert: &AlertContext) -> Self {
        Self {
            target_url: alert.target_url.clone(),
            timestamp: alert.formatted_time(),
            status_code: alert.status_code,
            error_message: alert.error_message.clone(),
        }
    }
}

/// 告警消息模板
pub struct AlertTemplate {
    registry: Handlebars<'static>,
}

impl AlertTemplate {
    /// 创建告警模板
    ///
    /// # 参数
    /// * `telegram_template` - 自定义的 Telegram 模板，`None` 使用默认模板
    ///
    /// # 返回
    /// * `Result<Self, NotificationError>` - 模板实例，模板语法错误时返回错误
    pub fn new(telegram_template: Option<&str>) -> Result<Self, NotificationError> {
        let mut registry = Handlebars::new();
        // Markdown 文本，不做 HTML 转义
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(
                TELEGRAM_TEMPLATE_NAME,
                telegram_template.unwrap_or(DEFAULT_TELEGRAM_TEMPLATE),
            )
            .map_err(|e| NotificationError::Template(e.to_string()))?;

        Ok(Self { registry })
    }

    /// 渲染 Telegram 告警文本
    pub fn render_telegram(&self, context: &TemplateContext) -> Result<String, NotificationError> {
        self.registry
            .render(TELEGRAM_TEMPLATE_NAME, context)
            .map_err(|e| NotificationError::Template(e.to_string()))
    }
}
