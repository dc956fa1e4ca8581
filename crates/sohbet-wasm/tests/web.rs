#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use gloo_timers::future::TimeoutFuture;
use sohbet_core::{
    get_or_create_session_id, ChatTransport, SessionId, SessionStore, Texts, TransportError,
};
use sohbet_wasm::{render_markdown, ChatApp, LocalStorage};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlTextAreaElement, KeyboardEvent,
    KeyboardEventInit,
};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

/// Replies "tamam" at once, or waits for the gate when one is armed
#[derive(Default)]
struct GatedTransport {
    gate: RefCell<Option<oneshot::Receiver<String>>>,
    sent: RefCell<Vec<String>>,
}

impl GatedTransport {
    fn armed() -> (Rc<Self>, oneshot::Sender<String>) {
        let (tx, rx) = oneshot::channel();
        let transport = Self {
            gate: RefCell::new(Some(rx)),
            ..Default::default()
        };
        (Rc::new(transport), tx)
    }
}

#[async_trait(?Send)]
impl ChatTransport for GatedTransport {
    async fn send(&self, _session_id: &SessionId, text: &str) -> Result<String, TransportError> {
        self.sent.borrow_mut().push(text.to_string());
        let gate = self.gate.borrow_mut().take();
        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| TransportError::Network("gate dropped".to_string())),
            None => Ok("tamam".to_string()),
        }
    }
}

struct Page {
    document: Document,
    root: Element,
}

impl Page {
    fn new() -> Self {
        let document = web_sys::window().unwrap().document().unwrap();
        let root = document.create_element("div").unwrap();
        root.set_inner_html(
            r#"<h1 id="chatTitle"></h1>
<div id="messagesContainer" style="height: 40px; overflow-y: auto;"></div>
<div id="loadingIndicator" style="display: none;"></div>
<textarea id="messageInput"></textarea>
<button id="sendButton"></button>
<div id="notifications"></div>"#,
        );
        document.body().unwrap().append_child(&root).unwrap();
        Self { document, root }
    }

    fn mount(&self, transport: Rc<GatedTransport>) -> ChatApp {
        ChatApp::mount(
            self.document.clone(),
            SessionId::new("web-test"),
            transport,
            Texts::default(),
        )
        .unwrap()
    }

    fn by_id<T: JsCast>(&self, id: &str) -> T {
        self.document.get_element_by_id(id).unwrap().dyn_into::<T>().unwrap()
    }

    fn input(&self) -> HtmlTextAreaElement {
        self.by_id("messageInput")
    }

    fn button(&self) -> HtmlButtonElement {
        self.by_id("sendButton")
    }

    fn messages(&self) -> HtmlElement {
        self.by_id("messagesContainer")
    }

    fn press_enter(&self, shift: bool) {
        let init = KeyboardEventInit::new();
        init.set_key("Enter");
        init.set_shift_key(shift);
        init.set_cancelable(true);
        let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
        self.input().dispatch_event(&event).unwrap();
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.root.remove();
    }
}

async fn settle() {
    TimeoutFuture::new(0).await;
}

#[wasm_bindgen_test]
async fn send_button_is_disabled_while_awaiting_and_view_scrolls() {
    let page = Page::new();
    let (transport, gate) = GatedTransport::armed();
    let app = page.mount(transport.clone());

    page.input().set_value("bir\niki\nüç\ndört\nbeş\naltı");
    page.button().click();
    settle().await;

    assert!(page.button().disabled());
    assert_eq!(page.input().value(), "");
    assert_eq!(transport.sent.borrow().len(), 1);
    assert_eq!(page.messages().child_element_count(), 1);
    assert!(page.messages().scroll_top() > 0);

    let scrolled = page.messages().scroll_top();
    gate.send("cevap\n\nikinci satır\n\nüçüncü".to_string()).unwrap();
    settle().await;

    assert!(!page.button().disabled());
    assert_eq!(app.message_count(), 2);
    assert_eq!(page.messages().child_element_count(), 2);
    assert!(page.messages().scroll_top() > scrolled);
}

#[wasm_bindgen_test]
async fn enter_submits_and_shift_enter_does_not() {
    let page = Page::new();
    let transport = Rc::new(GatedTransport::default());
    let app = page.mount(transport.clone());

    page.input().set_value("selam");
    page.press_enter(true);
    settle().await;
    assert!(transport.sent.borrow().is_empty());
    assert_eq!(app.message_count(), 0);

    page.press_enter(false);
    settle().await;
    assert_eq!(*transport.sent.borrow(), vec!["selam".to_string()]);
    assert_eq!(app.message_count(), 2);
    assert_eq!(page.input().value(), "");
}

#[wasm_bindgen_test]
fn local_storage_session_id_survives_reopen() {
    let key = "sohbetTestSessionId";
    let mut store = LocalStorage::open().unwrap();
    let first = get_or_create_session_id(&mut store, key).unwrap();

    let mut reopened = LocalStorage::open().unwrap();
    let second = get_or_create_session_id(&mut reopened, key).unwrap();

    assert_eq!(first, second);
    assert_eq!(reopened.load(key).unwrap().as_deref(), Some(first.as_str()));
}

#[wasm_bindgen_test]
fn raw_html_in_replies_passes_through() {
    let html = render_markdown("<span class=\"x\">merhaba</span>");
    assert!(html.contains("<span class=\"x\">merhaba</span>"));
}
