//! Core model for the sohbet chat client
//!
//! Everything here is platform independent: the transcript controller, the
//! session identity provider, reply extraction, the live status state machine
//! and the status hub wire protocol. Browser bindings live in `sohbet-wasm`.

pub mod config;
pub mod error;
pub mod hub_protocol;
pub mod hub_session;
pub mod message;
pub mod reconnect;
pub mod reply;
pub mod session;
pub mod status;
pub mod transcript;
pub mod transport;

pub use config::{ClientConfig, Texts};
pub use error::{ChatError, HubError, Result, TransportError};
pub use hub_session::{after_session, Followup, HubSession, NextStep, SessionEnd};
pub use message::{Message, Role};
pub use reconnect::{Backoff, ReconnectPolicy};
pub use reply::extract_reply;
pub use session::{get_or_create_session_id, MemoryStore, SessionId, SessionStore};
pub use status::{
    ConnectionState, HubEvent, LiveStatus, PushChannel, StatusSubscriber, StatusValue,
    Subscription,
};
pub use transcript::{Notice, NoticeLevel, SubmitOutcome, Transcript};
pub use transport::{ChatTransport, PayloadShape};
