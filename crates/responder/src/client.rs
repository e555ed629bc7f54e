use std::time::Duration;

use {
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::error::{Error, Result};

/// Timeout budget for a single `/chat` call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    pub user_name: String,
    pub is_group: bool,
    pub is_mentioned: bool,
    pub participant_id: Option<String>,
}

/// Response body from `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Client for the remote response service.
#[derive(Debug, Clone)]
pub struct ResponderClient {
    http: reqwest::Client,
    base_url: String,
}

impl ResponderClient {
    /// Build a client against `base_url` with the given call timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL the client targets.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the service for a reply. No retry: timeout or failure propagates
    /// to the caller's catch point.
    pub async fn ask(&self, request: &ChatRequest) -> Result<String> {
        debug!(user_id = %request.user_id, is_group = request.is_group, "calling responder");
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status { status });
        }

        let body: ChatResponse = response.json().await?;
        Ok(body.response)
    }

    /// Probe `GET /health`. Used at startup to warn early when the service
    /// is unreachable; the pipeline itself never depends on it.
    pub async fn health(&self) -> Result<()> {
        let status = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?
            .status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status { status })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, serde_json::json};

    fn request() -> ChatRequest {
        ChatRequest {
            message: "hi".into(),
            user_id: "33612345678@s.whatsapp.net".into(),
            user_name: "Alice".into(),
            is_group: false,
            is_mentioned: false,
            participant_id: None,
        }
    }

    #[tokio::test]
    async fn ask_posts_chat_request_and_returns_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_body(mockito::Matcher::PartialJson(json!({
                "message": "hi",
                "user_id": "33612345678@s.whatsapp.net",
                "user_name": "Alice",
                "is_group": false,
                "is_mentioned": false,
                "participant_id": null,
            })))
            .with_header("content-type", "application/json")
            .with_body(r#"{"response":"hello!","timestamp":"2026-01-01T00:00:00"}"#)
            .create_async()
            .await;

        let client = ResponderClient::new(server.url(), DEFAULT_TIMEOUT).unwrap();
        let reply = client.ask(&request()).await.unwrap();
        assert_eq!(reply, "hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ask_maps_server_errors_to_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body(r#"{"detail":"boom"}"#)
            .create_async()
            .await;

        let client = ResponderClient::new(server.url(), DEFAULT_TIMEOUT).unwrap();
        let err = client.ask(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Status { status } if status.as_u16() == 500));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .with_body(r#"{"response":"ok"}"#)
            .create_async()
            .await;

        let url = format!("{}/", server.url());
        let client = ResponderClient::new(url, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.ask(&request()).await.unwrap(), "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn health_checks_status_only() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_body(r#"{"status":"healthy"}"#)
            .create_async()
            .await;

        let client = ResponderClient::new(server.url(), DEFAULT_TIMEOUT).unwrap();
        assert!(client.health().await.is_ok());
    }
}
