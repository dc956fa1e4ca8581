//! Status hub push channel over a WebSocket
//!
//! One spawned task per subscription runs negotiate, handshake and the read
//! loop, and reconnects with backoff when the socket drops. Releasing the
//! [`Subscription`] fires a cancel signal that every await in the task races
//! against; the task then sends a close record if the hub is connected,
//! closes the socket and exits.

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{SplitSink, SplitStream};
use futures::{select, SinkExt, StreamExt};
use gloo_net::http::Request;
use gloo_net::websocket::{futures::WebSocket, Message as WsMessage, WebSocketError};
use gloo_timers::future::TimeoutFuture;
use sohbet_core::hub_protocol::{self, NegotiateResponse};
use sohbet_core::{
    after_session, Backoff, ClientConfig, HubError, HubEvent, HubSession, NextStep, PushChannel,
    ReconnectPolicy, SessionEnd, Subscription,
};
use web_sys::RequestCredentials;

use crate::utils::{get_page_url, js_error_text};

type HubSink = SplitSink<WebSocket, WsMessage>;
type HubStream = SplitStream<WebSocket>;

#[derive(Debug, Clone)]
pub struct HubChannel {
    hub_url: String,
    skip_negotiation: bool,
    keep_alive_ms: u32,
    policy: ReconnectPolicy,
}

enum Step {
    Cancel,
    Frame(Option<Result<WsMessage, WebSocketError>>),
    KeepAlive,
}

impl HubChannel {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            hub_url: config.hub_url.clone(),
            skip_negotiation: config.hub_skip_negotiation,
            keep_alive_ms: config.hub_keep_alive_ms,
            policy: config.reconnect,
        }
    }

    async fn run(self, on_event: &mut dyn FnMut(HubEvent), mut cancel: oneshot::Receiver<()>) {
        let mut backoff = Backoff::new(self.policy);

        loop {
            on_event(HubEvent::Connecting);

            let end = self
                .connect(on_event, &mut backoff, &mut cancel)
                .await
                .unwrap_or_else(SessionEnd::Failed);

            let followup = after_session(end, &mut backoff);
            if let Some(event) = followup.event {
                on_event(event);
            }
            let NextStep::Retry { delay_ms } = followup.next else {
                return;
            };

            select! {
                _ = cancel => return,
                _ = TimeoutFuture::new(delay_ms).fuse() => {}
            }
        }
    }

    async fn connect(
        &self,
        on_event: &mut dyn FnMut(HubEvent),
        backoff: &mut Backoff,
        cancel: &mut oneshot::Receiver<()>,
    ) -> Result<SessionEnd, HubError> {
        let page_url = get_page_url().map_err(|e| HubError::Transport(js_error_text(&e)))?;

        let token = if self.skip_negotiation {
            None
        } else {
            select! {
                _ = &mut *cancel => return Ok(SessionEnd::Cancelled),
                token = self.negotiate(&page_url).fuse() => Some(token?),
            }
        };

        let url = hub_protocol::websocket_url(&self.hub_url, &page_url, token.as_deref())?;
        log::info!("Connecting to status hub: {}", url);
        let ws = WebSocket::open(url.as_str()).map_err(|e| HubError::Transport(e.to_string()))?;
        let (mut sink, mut stream) = ws.split();

        let mut session = HubSession::new();
        let end = self
            .drive(&mut session, &mut sink, &mut stream, on_event, backoff, cancel)
            .await;

        if let Some(record) = session.farewell(&end) {
            let _ = sink.send(WsMessage::Text(record)).await;
        }
        close_socket(sink, stream);

        Ok(end)
    }

    /// Handshake and read loop for one open socket. Every exit path returns
    /// to `connect`, which closes the socket.
    async fn drive(
        &self,
        session: &mut HubSession,
        sink: &mut HubSink,
        stream: &mut HubStream,
        on_event: &mut dyn FnMut(HubEvent),
        backoff: &mut Backoff,
        cancel: &mut oneshot::Receiver<()>,
    ) -> SessionEnd {
        // The sink holds the handshake until the socket opens
        let sent = select! {
            _ = &mut *cancel => return SessionEnd::Cancelled,
            sent = sink.send(WsMessage::Text(session.handshake_request())).fuse() => sent,
        };
        if let Err(e) = sent {
            return SessionEnd::Failed(HubError::Transport(e.to_string()));
        }

        let mut keep_alive = self.keep_alive_timer();

        loop {
            let step = select! {
                _ = &mut *cancel => Step::Cancel,
                frame = stream.next().fuse() => Step::Frame(frame),
                _ = keep_alive => Step::KeepAlive,
            };

            match step {
                Step::Cancel => return SessionEnd::Cancelled,
                Step::KeepAlive => {
                    if let Some(ping) = session.keep_alive() {
                        if let Err(e) = sink.send(WsMessage::Text(ping)).await {
                            return SessionEnd::Failed(HubError::Transport(e.to_string()));
                        }
                    }
                    keep_alive = self.keep_alive_timer();
                }
                Step::Frame(None) => return SessionEnd::Dropped,
                Step::Frame(Some(Err(e))) => {
                    return SessionEnd::Failed(HubError::Transport(e.to_string()))
                }
                Step::Frame(Some(Ok(WsMessage::Bytes(_)))) => {
                    log::warn!("Received unexpected binary message");
                }
                Step::Frame(Some(Ok(WsMessage::Text(text)))) => {
                    log::debug!("Hub frame: {}", text.escape_debug());
                    let frame = session.on_text(&text, backoff);
                    for event in frame.events {
                        on_event(event);
                    }
                    if let Some(end) = frame.end {
                        return end;
                    }
                }
            }
        }
    }

    async fn negotiate(&self, page_url: &str) -> Result<String, HubError> {
        let url = hub_protocol::negotiate_url(&hub_protocol::resolve_http_url(
            &self.hub_url,
            page_url,
        )?)?;
        log::debug!("Negotiating status hub connection: {}", url);

        let response = Request::post(url.as_str())
            .credentials(RequestCredentials::Include)
            .send()
            .await
            .map_err(|e| HubError::Negotiate(e.to_string()))?;
        if !response.ok() {
            return Err(HubError::Negotiate(format!("status {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| HubError::Negotiate(e.to_string()))?;
        let negotiated = NegotiateResponse::parse(&body)?;
        negotiated.connection_token().map(str::to_string)
    }

    fn keep_alive_timer(&self) -> futures::future::Fuse<LocalBoxFuture<'static, ()>> {
        TimeoutFuture::new(self.keep_alive_ms).boxed_local().fuse()
    }
}

/// Close the socket whatever state it is in; a socket still connecting is
/// abandoned by the browser.
fn close_socket(sink: HubSink, stream: HubStream) {
    match sink.reunite(stream) {
        Ok(ws) => {
            if let Err(e) = ws.close(Some(1000), None) {
                log::debug!("Closing status hub socket failed: {}", e);
            }
        }
        Err(_) => log::debug!("Status hub socket halves did not match"),
    }
}

impl PushChannel for HubChannel {
    fn subscribe(&self, mut on_event: Box<dyn FnMut(HubEvent)>) -> Subscription {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let hub = self.clone();

        wasm_bindgen_futures::spawn_local(async move {
            hub.run(on_event.as_mut(), cancel_rx).await;
        });

        Subscription::new(move || {
            let _ = cancel_tx.send(());
        })
    }
}
