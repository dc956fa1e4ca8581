use async_trait::async_trait;
use gloo_net::http::Request;
use sohbet_core::transport::interpret_response;
use sohbet_core::{ChatTransport, ClientConfig, PayloadShape, SessionId, TransportError};

/// Chat transport backed by `fetch`
pub struct FetchTransport {
    endpoint: String,
    shape: PayloadShape,
}

impl FetchTransport {
    pub fn new(endpoint: impl Into<String>, shape: PayloadShape) -> Self {
        Self {
            endpoint: endpoint.into(),
            shape,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.chat_endpoint.clone(), config.payload_shape)
    }
}

#[async_trait(?Send)]
impl ChatTransport for FetchTransport {
    async fn send(&self, session_id: &SessionId, text: &str) -> Result<String, TransportError> {
        let body = self.shape.body(session_id, text).to_string();

        let response = Request::post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .map_err(|e| TransportError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        log::debug!("Chat reply ({}): {}", status, raw);

        interpret_response(status, &raw)
    }
}
