/// Fire-and-forget login notifications via the Telegram Bot API
use std::sync::Arc;

use serde_json::json;

use crate::error::{AuthError, Result};

pub struct TelegramNotifier {
    bot_token: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: String) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|e| AuthError::Internal(format!("Telegram request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::Internal(format!(
                "Telegram sendMessage returned {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Deliver in a background task. Notification failure must never
    /// fail the login that triggered it; errors are logged and dropped.
    pub fn notify_login(self: &Arc<Self>, chat_id: i64, text: String) {
        let notifier = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = notifier.send_message(chat_id, &text).await {
                tracing::warn!("Login notification to chat {} failed: {}", chat_id, e);
            }
        });
    }
}

/// Device summary sent to the account's linked chat after a login.
/// `None` when the request carried no user agent.
pub fn device_info_text(user_agent: Option<&str>, ip: Option<&str>) -> Option<String> {
    let user_agent = user_agent?;
    Some(format!(
        "Logged in to your account. With device:\nBrowser: {}\nIP: {}\n",
        user_agent,
        ip.unwrap_or("unknown")
    ))
}
