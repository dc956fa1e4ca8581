//! One status hub connection, independent of the socket that carries it
//!
//! The browser side owns the WebSocket and the timers. Everything it decides
//! per frame (which events to publish, when the session is over, when the
//! backoff restarts) and after a session (stop or retry) happens here.

use crate::error::HubError;
use crate::hub_protocol::{self, HubDecoder, HubRecord};
use crate::reconnect::Backoff;
use crate::status::HubEvent;

/// Why a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// The subscription was released
    Cancelled,
    /// The socket closed without a close record
    Dropped,
    /// The hub sent a close record
    Closed {
        error: Option<String>,
        allow_reconnect: bool,
    },
    Failed(HubError),
}

/// Result of feeding one text frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStep {
    pub events: Vec<HubEvent>,
    pub end: Option<SessionEnd>,
}

#[derive(Debug, Default)]
pub struct HubSession {
    decoder: HubDecoder,
}

impl HubSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handshake_request(&self) -> String {
        hub_protocol::handshake_request()
    }

    pub fn is_connected(&self) -> bool {
        self.decoder.is_handshaken()
    }

    /// Ping to send when the keep-alive timer fires. Nothing goes out before
    /// the handshake completes.
    pub fn keep_alive(&self) -> Option<String> {
        self.is_connected().then(hub_protocol::ping_record)
    }

    /// Record to send before closing the socket
    pub fn farewell(&self, end: &SessionEnd) -> Option<String> {
        match end {
            SessionEnd::Cancelled if self.is_connected() => Some(hub_protocol::close_record()),
            _ => None,
        }
    }

    /// Decode a text frame. The handshake answer publishes `Connected` and
    /// restarts `backoff`; records after a close record are not looked at.
    pub fn on_text(&mut self, frame: &str, backoff: &mut Backoff) -> FrameStep {
        let mut step = FrameStep::default();
        let was_connected = self.is_connected();

        let records = match self.decoder.feed(frame) {
            Ok(records) => records,
            Err(e) => {
                step.end = Some(SessionEnd::Failed(e));
                return step;
            }
        };

        if !was_connected && self.is_connected() {
            log::info!("Status hub connected");
            backoff.reset();
            step.events.push(HubEvent::Connected);
        }

        for record in records {
            match record {
                HubRecord::Close {
                    error,
                    allow_reconnect,
                } => {
                    step.end = Some(SessionEnd::Closed {
                        error,
                        allow_reconnect,
                    });
                    break;
                }
                HubRecord::Ping => log::trace!("Hub ping"),
                HubRecord::Other(kind) => log::debug!("Ignoring hub record type {}", kind),
                invocation @ HubRecord::Invocation { .. } => match invocation.status_event() {
                    Some(event) => step.events.push(event),
                    None => log::debug!("Ignoring hub invocation {:?}", invocation),
                },
            }
        }
        step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Stop,
    Retry { delay_ms: u32 },
    GiveUp,
}

/// What the channel does once a session is over
#[derive(Debug, Clone, PartialEq)]
pub struct Followup {
    pub event: Option<HubEvent>,
    pub next: NextStep,
}

pub fn after_session(end: SessionEnd, backoff: &mut Backoff) -> Followup {
    let reason = match end {
        SessionEnd::Cancelled => {
            log::info!("Status hub subscription released");
            return Followup {
                event: None,
                next: NextStep::Stop,
            };
        }
        SessionEnd::Closed {
            error,
            allow_reconnect: false,
        } => {
            log::warn!("Status hub closed the connection and disallowed reconnect");
            return Followup {
                event: Some(HubEvent::Disconnected(error)),
                next: NextStep::Stop,
            };
        }
        SessionEnd::Closed { error, .. } => error.unwrap_or_else(|| "closed by server".to_string()),
        SessionEnd::Dropped => "connection closed".to_string(),
        SessionEnd::Failed(e) => {
            log::error!("Status hub error: {}", e);
            e.to_string()
        }
    };

    let next = match backoff.next_delay() {
        Some(delay_ms) => {
            log::info!(
                "Reconnecting to status hub in {}ms (attempt {})",
                delay_ms,
                backoff.attempt()
            );
            NextStep::Retry { delay_ms }
        }
        None => {
            log::error!(
                "Status hub unreachable after {} attempts, giving up",
                backoff.attempt()
            );
            NextStep::GiveUp
        }
    };

    Followup {
        event: Some(HubEvent::Disconnected(Some(reason))),
        next,
    }
}
