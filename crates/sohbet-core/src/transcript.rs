//! Chat transcript controller
//!
//! Owns the append-only message list, the input buffer and the awaiting
//! flag. A submission is two steps, [`Transcript::begin_submit`] and
//! [`Transcript::complete`], so a UI holding the transcript in a `RefCell`
//! can release its borrow while the request is in flight.

use crate::config::Texts;
use crate::error::{ChatError, TransportError};
use crate::message::Message;
use crate::session::SessionId;
use crate::transport::ChatTransport;

/// How a settled exchange was folded into the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Replied,
    ServerError(u16),
    TransportFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Transient notification for the user (toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    /// Notice for a rejected submission, if the user should see one
    pub fn for_rejection(err: &ChatError, texts: &Texts) -> Option<Self> {
        match err {
            ChatError::EmptyInput => Some(Self::warning(&texts.empty_input_warning)),
            ChatError::Busy => None,
            other => Some(Self::error(other.to_string())),
        }
    }
}

impl SubmitOutcome {
    pub fn notice(&self, texts: &Texts) -> Option<Notice> {
        match self {
            SubmitOutcome::TransportFailed(_) => Some(Notice::error(&texts.transport_error)),
            SubmitOutcome::Replied | SubmitOutcome::ServerError(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
    input: String,
    awaiting: bool,
    texts: Texts,
}

impl Transcript {
    pub fn new(texts: Texts) -> Self {
        Self {
            messages: Vec::new(),
            input: String::new(),
            awaiting: false,
            texts,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    pub fn texts(&self) -> &Texts {
        &self.texts
    }

    /// Validate `text`, append it as a user message, clear the input and raise
    /// the awaiting flag. Returns the text to put on the wire.
    pub fn begin_submit(&mut self, text: &str) -> Result<String, ChatError> {
        if self.awaiting {
            return Err(ChatError::Busy);
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }

        self.messages.push(Message::user(text));
        self.input.clear();
        self.awaiting = true;
        log::debug!("Submitted user message #{}", self.messages.len());

        Ok(text.to_string())
    }

    /// Fold the settled exchange into the transcript and lower the awaiting flag
    pub fn complete(&mut self, result: Result<String, TransportError>) -> SubmitOutcome {
        let (reply, outcome) = match result {
            Ok(reply) => (reply, SubmitOutcome::Replied),
            Err(TransportError::Status(code)) => {
                log::warn!("Chat endpoint returned status {}", code);
                (self.texts.status_error(code), SubmitOutcome::ServerError(code))
            }
            Err(TransportError::Network(reason)) => {
                log::error!("Chat request failed: {}", reason);
                (
                    self.texts.fallback_reply.clone(),
                    SubmitOutcome::TransportFailed(reason),
                )
            }
        };

        self.messages.push(Message::assistant(reply));
        self.awaiting = false;
        outcome
    }

    /// Run a whole exchange against `transport`
    pub async fn submit<T>(
        &mut self,
        transport: &T,
        session_id: &SessionId,
        text: &str,
    ) -> Result<SubmitOutcome, ChatError>
    where
        T: ChatTransport + ?Sized,
    {
        let text = self.begin_submit(text)?;
        let result = transport.send(session_id, &text).await;
        Ok(self.complete(result))
    }

    /// Submit whatever is currently in the input buffer
    pub async fn submit_input<T>(
        &mut self,
        transport: &T,
        session_id: &SessionId,
    ) -> Result<SubmitOutcome, ChatError>
    where
        T: ChatTransport + ?Sized,
    {
        let text = self.input.clone();
        self.submit(transport, session_id, &text).await
    }
}
