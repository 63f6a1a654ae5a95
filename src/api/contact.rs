use tracing::{info, instrument};

use super::client::ApiClient;
use crate::error::{RequestError, ValidationError};
use crate::model::ContactMessage;

pub const MESSAGES_ENDPOINT: &str = "/api/messages";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Client for the public contact form.
#[derive(Debug, Clone)]
pub struct ContactClient {
    api: ApiClient,
}

impl ContactClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Validates and posts the message. The reply body is ignored.
    #[instrument(skip(self, message), fields(from = %message.email))]
    pub async fn send(&self, message: &ContactMessage) -> Result<(), ContactError> {
        message.validate()?;
        self.api.post(MESSAGES_ENDPOINT, message, None).await?;
        info!("contact message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use crate::config::AppConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ContactClient {
        let config = AppConfig {
            api_base: server.uri(),
            ..AppConfig::default()
        };
        ContactClient::new(ApiClient::new(&config, Credentials::new()).unwrap())
    }

    #[tokio::test]
    async fn posts_the_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/messages"))
            .and(body_json(json!({
                "name": "Ada", "email": "ada@example.com", "subject": "Hi", "message": "Hello"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_string("queued"))
            .expect(1)
            .mount(&server)
            .await;

        let message = ContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hi".into(),
            message: "Hello".into(),
        };
        client_for(&server).send(&message).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_form_never_hits_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .send(&ContactMessage::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::Validation(_)));
    }
}
