//! Live status subscriber
//!
//! The widget tracks two independent things: the connection state of the push
//! channel and the last button status the hub announced. Push events update
//! the status regardless of what the connection is doing.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::Texts;

pub const PRESSED_TAG: &str = "BASILI";
pub const EMPTY_TAG: &str = "BOS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusValue {
    #[default]
    #[serde(rename = "BOS")]
    Empty,
    #[serde(rename = "BASILI")]
    Pressed,
}

impl StatusValue {
    /// Parse a wire tag. Matching ignores ASCII case and surrounding blanks.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case(PRESSED_TAG) {
            Some(StatusValue::Pressed)
        } else if tag.eq_ignore_ascii_case(EMPTY_TAG) {
            Some(StatusValue::Empty)
        } else {
            None
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            StatusValue::Pressed => PRESSED_TAG,
            StatusValue::Empty => EMPTY_TAG,
        }
    }

    pub fn label<'a>(&self, texts: &'a Texts) -> &'a str {
        match self {
            StatusValue::Pressed => &texts.status_pressed,
            StatusValue::Empty => &texts.status_empty,
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn label<'a>(&self, texts: &'a Texts) -> &'a str {
        match self {
            ConnectionState::Disconnected => &texts.disconnected_label,
            ConnectionState::Connecting => &texts.connecting_label,
            ConnectionState::Connected => &texts.connected_label,
        }
    }
}

/// Everything a push channel can report to its subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    Connecting,
    Connected,
    Disconnected(Option<String>),
    ButtonStatusChanged(StatusValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiveStatus {
    connection: ConnectionState,
    status: StatusValue,
}

impl LiveStatus {
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn status(&self) -> StatusValue {
        self.status
    }

    /// The connectivity flag: true only while the channel reports itself open
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Apply one event, returning whether anything visible changed
    pub fn apply(&mut self, event: &HubEvent) -> bool {
        let before = *self;
        match event {
            HubEvent::Connecting => self.connection = ConnectionState::Connecting,
            HubEvent::Connected => self.connection = ConnectionState::Connected,
            HubEvent::Disconnected(reason) => {
                if let Some(reason) = reason {
                    log::info!("Status hub disconnected: {}", reason);
                }
                self.connection = ConnectionState::Disconnected;
            }
            HubEvent::ButtonStatusChanged(value) => self.status = *value,
        }
        *self != before
    }
}

/// Handle for an active push subscription. Dropping it releases the channel.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Source of live status events, e.g. the SignalR hub or a test double
pub trait PushChannel {
    fn subscribe(&self, on_event: Box<dyn FnMut(HubEvent)>) -> Subscription;
}

/// Mounted status widget model.
///
/// Holds the subscription for as long as it is mounted; `unmount` (or drop)
/// releases it and gates the callback so a push that was already queued
/// cannot touch the state afterwards.
pub struct StatusSubscriber {
    state: Rc<RefCell<LiveStatus>>,
    active: Rc<Cell<bool>>,
    subscription: Option<Subscription>,
}

impl StatusSubscriber {
    pub fn mount<C, F>(channel: &C, mut on_change: F) -> Self
    where
        C: PushChannel + ?Sized,
        F: FnMut(&LiveStatus) + 'static,
    {
        let state = Rc::new(RefCell::new(LiveStatus::default()));
        let active = Rc::new(Cell::new(true));

        let callback_state = state.clone();
        let callback_active = active.clone();
        let subscription = channel.subscribe(Box::new(move |event| {
            if !callback_active.get() {
                log::debug!("Dropping status event after unmount: {:?}", event);
                return;
            }
            let snapshot = {
                let mut state = callback_state.borrow_mut();
                if !state.apply(&event) {
                    return;
                }
                *state
            };
            on_change(&snapshot);
        }));

        Self {
            state,
            active,
            subscription: Some(subscription),
        }
    }

    pub fn snapshot(&self) -> LiveStatus {
        *self.state.borrow()
    }

    pub fn is_mounted(&self) -> bool {
        self.active.get()
    }

    /// Close the channel. Safe to call more than once.
    pub fn unmount(&mut self) {
        self.active.set(false);
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            log::debug!("Status subscriber unmounted");
        }
    }
}

impl Drop for StatusSubscriber {
    fn drop(&mut self) {
        self.unmount();
    }
}
