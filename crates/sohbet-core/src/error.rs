use thiserror::Error;

/// Errors raised by the chat side of the client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyInput,

    #[error("a reply is already pending")]
    Busy,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Outcome of a failed chat exchange
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The endpoint answered, but not with a 2xx status
    #[error("server responded with status {0}")]
    Status(u16),

    /// No response at all
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("invalid hub url: {0}")]
    InvalidUrl(String),

    #[error("negotiation failed: {0}")]
    Negotiate(String),

    #[error("handshake rejected: {0}")]
    Handshake(String),

    #[error("malformed hub record: {0}")]
    Malformed(String),

    #[error("hub transport error: {0}")]
    Transport(String),
}

pub type Result<T, E = ChatError> = std::result::Result<T, E>;
