//! Chat transport capability
//!
//! Both the webhook-style and the session-style backends reduce to a single
//! `send(session_id, text) -> reply` call; only the request body differs and
//! that is selected by [`PayloadShape`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::TransportError;
use crate::reply::extract_reply;
use crate::session::SessionId;

#[async_trait(?Send)]
pub trait ChatTransport {
    /// Perform one request/response exchange and return the reply text
    async fn send(&self, session_id: &SessionId, text: &str) -> Result<String, TransportError>;
}

/// Request body layout expected by the chat endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    /// `{"sessionId": "...", "message": "..."}`
    #[default]
    Session,
    /// `{"input": "..."}`, no session correlation
    Input,
}

impl PayloadShape {
    pub fn body(&self, session_id: &SessionId, text: &str) -> Value {
        match self {
            PayloadShape::Session => json!({
                "sessionId": session_id.as_str(),
                "message": text,
            }),
            PayloadShape::Input => json!({ "input": text }),
        }
    }
}

/// Map a completed HTTP exchange to the transport result
pub fn interpret_response(status: u16, body: &str) -> Result<String, TransportError> {
    if (200..300).contains(&status) {
        Ok(extract_reply(body))
    } else {
        Err(TransportError::Status(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_payload() {
        let id = SessionId::new("s1");
        let body = PayloadShape::Session.body(&id, "selam");
        assert_eq!(body, json!({"sessionId": "s1", "message": "selam"}));
    }

    #[test]
    fn test_input_payload_has_no_session() {
        let id = SessionId::new("s1");
        let body = PayloadShape::Input.body(&id, "selam");
        assert_eq!(body, json!({"input": "selam"}));
    }

    #[test]
    fn test_shape_from_config_name() {
        let shape: PayloadShape = serde_json::from_str(r#""input""#).unwrap();
        assert_eq!(shape, PayloadShape::Input);
    }

    #[test]
    fn test_interpret_success_and_failure() {
        assert_eq!(interpret_response(200, r#"{"response":"ok"}"#), Ok("ok".to_string()));
        assert_eq!(interpret_response(204, ""), Ok(String::new()));
        assert_eq!(interpret_response(500, "boom"), Err(TransportError::Status(500)));
        assert_eq!(interpret_response(302, ""), Err(TransportError::Status(302)));
    }
}
