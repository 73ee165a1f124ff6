//! Delivery through the Telegram Bot API `sendMessage` method.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

use super::{NotificationChannel, error::NotificationError};
use crate::models::AlertPayload;

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts to one Telegram chat. Each call is a single attempt; retries
/// are left to the caller.
pub struct TelegramChannel {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
    request_timeout: Duration,
}

impl TelegramChannel {
    /// Creates a channel posting to `{api_url}/bot{token}/sendMessage`.
    pub fn new(
        client: reqwest::Client,
        api_url: &Url,
        token: &str,
        chat_id: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        let endpoint = format!("{}/bot{}/sendMessage", api_url.as_str().trim_end_matches('/'), token);
        Self { client, endpoint, chat_id: chat_id.into(), request_timeout }
    }

    /// Builds the `sendMessage` request body.
    pub fn build_payload(&self, payload: &AlertPayload) -> Value {
        let mut body = json!({
            "chat_id": self.chat_id,
            "text": payload.text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        if !payload.buttons.is_empty() {
            let keyboard: Vec<Vec<Value>> = payload
                .buttons
                .iter()
                .map(|row| {
                    row.iter().map(|b| json!({ "text": b.label, "url": b.url })).collect()
                })
                .collect();
            body["reply_markup"] = json!({ "inline_keyboard": keyboard });
        }

        body
    }
}

fn classify_request_error(error: reqwest::Error) -> NotificationError {
    if error.is_builder() {
        NotificationError::Rejected(error.to_string())
    } else {
        NotificationError::Transient(error.to_string())
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    #[tracing::instrument(skip_all, level = "debug", fields(chat_id = %self.chat_id))]
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), NotificationError> {
        let body = self.build_payload(payload);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(NotificationError::Transient(format!("Telegram returned HTTP {status}")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected(format!("Telegram returned HTTP {status}: {text}")));
        }

        match response.json::<TelegramResponse>().await {
            Ok(TelegramResponse { ok: false, description }) => Err(NotificationError::Rejected(
                description.unwrap_or_else(|| "ok=false".to_string()),
            )),
            Ok(_) => Ok(()),
            Err(e) => {
                // The message was accepted with a 2xx; only the body is odd.
                tracing::warn!(error = %e, "Unreadable Telegram response body.");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::models::AlertButton;

    fn channel(server_url: &str) -> TelegramChannel {
        TelegramChannel::new(
            reqwest::Client::new(),
            &Url::parse(server_url).unwrap(),
            "123:abc",
            "-100",
            Duration::from_secs(5),
        )
    }

    fn payload() -> AlertPayload {
        AlertPayload {
            text: "*hello*".to_string(),
            buttons: vec![
                vec![AlertButton::new("Trade", "https://t.me/bot")],
                vec![
                    AlertButton::new("A", "https://a.example/x"),
                    AlertButton::new("B", "https://b.example/y"),
                ],
            ],
        }
    }

    #[test]
    fn test_build_payload_with_keyboard() {
        let body = channel("https://api.telegram.org").build_payload(&payload());

        assert_eq!(body["chat_id"], "-100");
        assert_eq!(body["text"], "*hello*");
        assert_eq!(body["parse_mode"], "Markdown");
        assert_eq!(body["reply_markup"]["inline_keyboard"][0][0]["text"], "Trade");
        assert_eq!(body["reply_markup"]["inline_keyboard"][1][1]["url"], "https://b.example/y");
    }

    #[test]
    fn test_build_payload_without_buttons_has_no_markup() {
        let body = channel("https://api.telegram.org").build_payload(&AlertPayload::text("hi"));
        assert!(body.get("reply_markup").is_none());
    }

    #[tokio::test]
    async fn test_deliver_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::PartialJson(json!({ "chat_id": "-100", "text": "*hello*" })))
            .with_status(200)
            .with_body(r#"{"ok":true,"result":{}}"#)
            .expect(1)
            .create_async()
            .await;

        channel(&server.url()).deliver(&payload()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_deliver_classifies_statuses() {
        let mut server = mockito::Server::new_async().await;
        let channel = channel(&server.url());

        let _m = server.mock("POST", "/bot123:abc/sendMessage").with_status(502).create_async().await;
        assert!(channel.deliver(&payload()).await.unwrap_err().is_transient());
        server.reset();

        let _m = server.mock("POST", "/bot123:abc/sendMessage").with_status(429).create_async().await;
        assert!(channel.deliver(&payload()).await.unwrap_err().is_transient());
        server.reset();

        let _m = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"description":"Bad Request: chat not found"}"#)
            .create_async()
            .await;
        let err = channel.deliver(&payload()).await.unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn test_deliver_ok_false_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok":false,"description":"can't parse entities"}"#)
            .create_async()
            .await;

        let err = channel(&server.url()).deliver(&payload()).await.unwrap_err();
        assert!(matches!(err, NotificationError::Rejected(ref msg) if msg.contains("parse entities")));
    }

    #[tokio::test]
    async fn test_deliver_connection_error_is_transient() {
        // Nothing listens on port 9 locally.
        let err = channel("http://127.0.0.1:9").deliver(&payload()).await.unwrap_err();
        assert!(err.is_transient());
    }
}
