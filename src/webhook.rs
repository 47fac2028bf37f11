//! Chat webhook delivery

use tracing::{error, warn};

use crate::message::ChatMessage;

/// What came back from the webhook. Transport errors land in `body` with no status.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub status: Option<u16>,
    pub body: String,
}

impl Delivery {
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }
}

/// POST `message` to the chat webhook. Never fails; see [`Delivery`].
pub async fn post_message(client: &reqwest::Client, url: &str, message: &ChatMessage) -> Delivery {
    let response = match client.post(url).json(message).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Webhook request failed: {}", e);
            return Delivery {
                status: None,
                body: e.to_string(),
            };
        }
    };

    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => e.to_string(),
    };
    if !status.is_success() {
        warn!("Webhook answered {}: {}", status, body);
    }

    Delivery {
        status: Some(status.as_u16()),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{COLOR_GREEN, Embed};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn message() -> ChatMessage {
        ChatMessage {
            content: "API deploy succeeded".to_string(),
            embeds: vec![Embed {
                title: "API deployed successfully".to_string(),
                color: COLOR_GREEN,
                description: "Finished in 45s".to_string(),
                url: None,
                author: None,
            }],
        }
    }

    #[tokio::test]
    async fn posts_json_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({ "content": "API deploy succeeded" })),
                Matcher::Regex("API deployed successfully".to_string()),
            ]))
            .with_status(204)
            .create_async()
            .await;

        let delivery =
            post_message(&reqwest::Client::new(), &format!("{}/hook", server.url()), &message())
                .await;

        mock.assert_async().await;
        assert_eq!(delivery.status, Some(204));
        assert!(delivery.is_success());
    }

    #[tokio::test]
    async fn error_status_surfaces_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/hook")
            .with_status(400)
            .with_body(r#"{"message": "Invalid Form Body"}"#)
            .create_async()
            .await;

        let delivery =
            post_message(&reqwest::Client::new(), &format!("{}/hook", server.url()), &message())
                .await;

        assert_eq!(delivery.status, Some(400));
        assert!(!delivery.is_success());
        assert!(delivery.body.contains("Invalid Form Body"));
    }

    #[tokio::test]
    async fn transport_error_is_text() {
        let delivery =
            post_message(&reqwest::Client::new(), "http://127.0.0.1:1/hook", &message()).await;
        assert_eq!(delivery.status, None);
        assert!(!delivery.body.is_empty());
    }
}
