#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use sohbet_core::transport::interpret_response;
use sohbet_core::{ChatTransport, HubEvent, PushChannel, SessionId, Subscription, TransportError};

/// Transport double that replays scripted results and records every call
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<String, TransportError>>>,
    pub calls: RefCell<Vec<(String, String)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result the real fetch transport would produce for this response
    pub fn http(self, status: u16, body: &str) -> Self {
        self.replies
            .borrow_mut()
            .push_back(interpret_response(status, body));
        self
    }

    pub fn network_failure(self, reason: &str) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Err(TransportError::Network(reason.to_string())));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[async_trait(?Send)]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, session_id: &SessionId, text: &str) -> Result<String, TransportError> {
        self.calls
            .borrow_mut()
            .push((session_id.as_str().to_string(), text.to_string()));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".to_string())))
    }
}

/// Push channel double. Keeps the subscriber callback around even after the
/// subscription is released, so tests can simulate a push that was already
/// queued when the widget unmounted.
#[derive(Default, Clone)]
pub struct FakeChannel {
    callback: Rc<RefCell<Option<Box<dyn FnMut(HubEvent)>>>>,
    released: Rc<Cell<bool>>,
    subscribe_count: Rc<Cell<usize>>,
}

impl FakeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: HubEvent) {
        if let Some(callback) = self.callback.borrow_mut().as_mut() {
            callback(event);
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.get()
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribe_count.get()
    }
}

impl PushChannel for FakeChannel {
    fn subscribe(&self, on_event: Box<dyn FnMut(HubEvent)>) -> Subscription {
        *self.callback.borrow_mut() = Some(on_event);
        self.subscribe_count.set(self.subscribe_count.get() + 1);
        self.released.set(false);
        let released = self.released.clone();
        Subscription::new(move || released.set(true))
    }
}
