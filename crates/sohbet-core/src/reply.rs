use serde_json::Value;

/// Extract the displayable reply from a chat endpoint response body.
///
/// JSON bodies are searched for `response`, then `message`, then the
/// provider-style `choices[0].message.content`; blank and `null` fields are
/// skipped. If none is present the whole JSON value is dumped. A body that is
/// not JSON at all is the reply verbatim.
pub fn extract_reply(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => reply_from_value(&value),
        Err(_) => body.to_string(),
    }
}

fn reply_from_value(value: &Value) -> String {
    if let Value::String(text) = value {
        return text.clone();
    }

    field_text(value.get("response"))
        .or_else(|| field_text(value.get("message")))
        .or_else(|| field_text(value.pointer("/choices/0/message/content")))
        .unwrap_or_else(|| value.to_string())
}

fn field_text(field: Option<&Value>) -> Option<String> {
    match field? {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
