//! Status hub wire protocol (SignalR JSON hub protocol, version 1)
//!
//! Records are JSON objects terminated by the ASCII record separator. The
//! first record from the server answers the handshake; after that every
//! record carries an integer `type`.

use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::error::HubError;
use crate::status::{HubEvent, StatusValue};

pub const RECORD_SEPARATOR: char = '\u{1e}';

pub const BUTTON_STATUS_CHANGED: &str = "ButtonStatusChanged";

const INVOCATION: u8 = 1;
const PING: u8 = 6;
const CLOSE: u8 = 7;

fn record(value: Value) -> String {
    let mut text = value.to_string();
    text.push(RECORD_SEPARATOR);
    text
}

pub fn handshake_request() -> String {
    record(json!({ "protocol": "json", "version": 1 }))
}

pub fn ping_record() -> String {
    record(json!({ "type": PING }))
}

pub fn close_record() -> String {
    record(json!({ "type": CLOSE }))
}

/// Non-blank records in one transport frame
pub fn split_records(frame: &str) -> impl Iterator<Item = &str> {
    frame
        .split(RECORD_SEPARATOR)
        .filter(|record| !record.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct HandshakeResponse {
    #[serde(default)]
    error: Option<String>,
}

pub fn parse_handshake(record: &str) -> Result<(), HubError> {
    let response: HandshakeResponse =
        serde_json::from_str(record).map_err(|e| HubError::Malformed(e.to_string()))?;
    match response.error {
        Some(error) => Err(HubError::Handshake(error)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HubRecord {
    Invocation { target: String, arguments: Vec<Value> },
    Ping,
    Close { error: Option<String>, allow_reconnect: bool },
    /// Completions, stream items and other kinds this client never asks for
    Other(u8),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    arguments: Vec<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    allow_reconnect: bool,
}

pub fn parse_record(record: &str) -> Result<HubRecord, HubError> {
    let raw: RawRecord =
        serde_json::from_str(record).map_err(|e| HubError::Malformed(e.to_string()))?;

    Ok(match raw.kind {
        INVOCATION => HubRecord::Invocation {
            target: raw
                .target
                .ok_or_else(|| HubError::Malformed("invocation without target".to_string()))?,
            arguments: raw.arguments,
        },
        PING => HubRecord::Ping,
        CLOSE => HubRecord::Close {
            error: raw.error,
            allow_reconnect: raw.allow_reconnect,
        },
        other => HubRecord::Other(other),
    })
}

impl HubRecord {
    /// Status event carried by this record, if any. Unknown tags yield `None`.
    pub fn status_event(&self) -> Option<HubEvent> {
        let HubRecord::Invocation { target, arguments } = self else {
            return None;
        };
        if !target.eq_ignore_ascii_case(BUTTON_STATUS_CHANGED) {
            return None;
        }
        let tag = arguments.first()?.as_str()?;
        match StatusValue::from_tag(tag) {
            Some(value) => Some(HubEvent::ButtonStatusChanged(value)),
            None => {
                log::warn!("Ignoring unknown button status '{}'", tag);
                None
            }
        }
    }
}

/// Splits incoming frames into records, consuming the handshake response first
#[derive(Debug, Default)]
pub struct HubDecoder {
    handshaken: bool,
}

impl HubDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_handshaken(&self) -> bool {
        self.handshaken
    }

    /// Records in `frame`. A bad handshake is an error; once handshaken,
    /// malformed records are logged and skipped.
    pub fn feed(&mut self, frame: &str) -> Result<Vec<HubRecord>, HubError> {
        let mut records = Vec::new();
        for text in split_records(frame) {
            if !self.handshaken {
                parse_handshake(text)?;
                self.handshaken = true;
                continue;
            }
            match parse_record(text) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping hub record: {}", e),
            }
        }
        Ok(records)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiateResponse {
    #[serde(default)]
    pub connection_id: Option<String>,
    #[serde(default)]
    pub connection_token: Option<String>,
    #[serde(default)]
    pub negotiate_version: u32,
    #[serde(default)]
    pub error: Option<String>,
}

impl NegotiateResponse {
    pub fn parse(body: &str) -> Result<Self, HubError> {
        let response: Self =
            serde_json::from_str(body).map_err(|e| HubError::Negotiate(e.to_string()))?;
        if let Some(error) = &response.error {
            return Err(HubError::Negotiate(error.clone()));
        }
        Ok(response)
    }

    /// Value for the `id` query parameter of the WebSocket URL. Version 0
    /// servers only hand out a connection id.
    pub fn connection_token(&self) -> Result<&str, HubError> {
        let token = if self.negotiate_version >= 1 {
            self.connection_token.as_deref()
        } else {
            self.connection_id.as_deref()
        };
        token.ok_or_else(|| HubError::Negotiate("response carries no connection token".to_string()))
    }
}

/// Resolve `hub_url` against `base` (the page URL) to an absolute `http(s)`
/// URL. `ws(s)` schemes map to their `http(s)` counterparts.
pub fn resolve_http_url(hub_url: &str, base: &str) -> Result<Url, HubError> {
    let mut url = Url::parse(base)
        .and_then(|base| base.join(hub_url.trim()))
        .map_err(|e| HubError::InvalidUrl(format!("{}: {}", hub_url, e)))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "http",
        "https" | "wss" => "https",
        other => {
            return Err(HubError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                hub_url, other
            )))
        }
    };
    set_scheme(&mut url, scheme)?;
    url.set_fragment(None);
    Ok(url)
}

/// `{hub}/negotiate?negotiateVersion=1`, keeping any query the hub URL carries
pub fn negotiate_url(http_url: &Url) -> Result<Url, HubError> {
    let mut url = http_url.clone();
    url.path_segments_mut()
        .map_err(|_| HubError::InvalidUrl(http_url.to_string()))?
        .pop_if_empty()
        .push("negotiate");
    url.query_pairs_mut().append_pair("negotiateVersion", "1");
    Ok(url)
}

/// WebSocket URL for the hub, carrying the negotiated token when there is one
pub fn websocket_url(
    hub_url: &str,
    base: &str,
    connection_token: Option<&str>,
) -> Result<Url, HubError> {
    let mut url = resolve_http_url(hub_url, base)?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    set_scheme(&mut url, scheme)?;

    if let Some(token) = connection_token {
        url.query_pairs_mut().append_pair("id", token);
    }
    Ok(url)
}

fn set_scheme(url: &mut Url, scheme: &str) -> Result<(), HubError> {
    url.set_scheme(scheme)
        .map_err(|_| HubError::InvalidUrl(format!("cannot use scheme '{}' for {}", scheme, url)))
}
