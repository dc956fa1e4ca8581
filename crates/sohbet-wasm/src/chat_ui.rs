use std::cell::RefCell;
use std::rc::Rc;

use sohbet_core::{ChatTransport, Message, Notice, SessionId, Texts, Transcript};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, KeyboardEvent};

use crate::dom::{self, Listener};
use crate::markdown;
use crate::toast;
use crate::utils::js_error_text;

const MESSAGES_ID: &str = "messagesContainer";
const INPUT_ID: &str = "messageInput";
const SEND_ID: &str = "sendButton";
const LOADING_ID: &str = "loadingIndicator";

pub struct ChatApp {
    ctx: Rc<ChatContext>,
    _listeners: Vec<Listener>,
}

struct ChatContext {
    document: Document,
    session_id: SessionId,
    transport: Rc<dyn ChatTransport>,
    texts: Texts,
    state: RefCell<ChatState>,
}

struct ChatState {
    transcript: Transcript,
    /// How many transcript entries are already in the DOM
    rendered: usize,
}

impl ChatApp {
    pub fn mount(
        document: Document,
        session_id: SessionId,
        transport: Rc<dyn ChatTransport>,
        texts: Texts,
    ) -> Result<Self, JsValue> {
        let ctx = Rc::new(ChatContext {
            document,
            session_id,
            transport,
            state: RefCell::new(ChatState {
                transcript: Transcript::new(texts.clone()),
                rendered: 0,
            }),
            texts,
        });

        ctx.apply_texts()?;
        ctx.set_loading(false);
        let listeners = ctx.setup_listeners()?;
        log::info!("Chat mounted for session {}", ctx.session_id);

        Ok(Self {
            ctx,
            _listeners: listeners,
        })
    }

    pub fn message_count(&self) -> usize {
        self.ctx.state.borrow().transcript.len()
    }
}

impl ChatContext {
    fn apply_texts(&self) -> Result<(), JsValue> {
        dom::set_text_by_id(&self.document, "chatTitle", &self.texts.title);
        dom::get_textarea_by_id(&self.document, INPUT_ID)?
            .set_placeholder(&self.texts.input_placeholder);
        dom::get_button_by_id(&self.document, SEND_ID)?
            .set_text_content(Some(&self.texts.send_label));
        Ok(())
    }

    fn setup_listeners(self: &Rc<Self>) -> Result<Vec<Listener>, JsValue> {
        let send_btn = dom::get_button_by_id(&self.document, SEND_ID)?;
        let input = dom::get_textarea_by_id(&self.document, INPUT_ID)?;

        let ctx = self.clone();
        let click = Listener::new(&send_btn, "click", move |_event| {
            spawn_submit(ctx.clone());
        })?;

        // Enter sends, Shift+Enter inserts a newline
        let ctx = self.clone();
        let keydown = Listener::new(&input, "keydown", move |event| {
            let Some(key_event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if key_event.key() == "Enter" && !key_event.shift_key() {
                event.prevent_default();
                spawn_submit(ctx.clone());
            }
        })?;

        let ctx = self.clone();
        let input_clone = input.clone();
        let typing = Listener::new(&input, "input", move |_event| {
            ctx.state
                .borrow_mut()
                .transcript
                .set_input(input_clone.value());
        })?;

        Ok(vec![click, keydown, typing])
    }

    async fn submit(&self) -> Result<(), JsValue> {
        let input = dom::get_textarea_by_id(&self.document, INPUT_ID)?;

        let begun = self
            .state
            .borrow_mut()
            .transcript
            .begin_submit(&input.value());
        let text = match begun {
            Ok(text) => text,
            Err(err) => {
                log::debug!("Submission rejected: {}", err);
                if let Some(notice) = Notice::for_rejection(&err, &self.texts) {
                    toast::show_notice(&self.document, &notice)?;
                }
                return Ok(());
            }
        };

        input.set_value("");
        self.render_messages();
        self.set_loading(true);

        let result = self.transport.send(&self.session_id, &text).await;
        let outcome = self.state.borrow_mut().transcript.complete(result);

        self.render_messages();
        self.set_loading(false);

        if let Some(notice) = outcome.notice(&self.texts) {
            toast::show_notice(&self.document, &notice)?;
        }

        Ok(())
    }

    /// Append transcript entries not yet in the DOM, then scroll to the newest
    fn render_messages(&self) {
        if let Err(e) = self.try_render_messages() {
            log::error!("Failed to render messages: {}", js_error_text(&e));
        }
    }

    fn try_render_messages(&self) -> Result<(), JsValue> {
        let container = dom::get_element_by_id(&self.document, MESSAGES_ID)?;

        let mut state = self.state.borrow_mut();
        let ChatState {
            transcript,
            rendered,
        } = &mut *state;

        let pending = &transcript.messages()[*rendered..];
        if pending.is_empty() {
            return Ok(());
        }
        for msg in pending {
            let msg_div = render_message(&self.document, msg)?;
            container.append_child(&msg_div)?;
            *rendered += 1;
        }

        dom::scroll_to_bottom(&container);
        Ok(())
    }

    fn set_loading(&self, loading: bool) {
        if let Ok(button) = dom::get_button_by_id(&self.document, SEND_ID) {
            button.set_disabled(loading);
        }
        if let Ok(indicator) = dom::get_html_element_by_id(&self.document, LOADING_ID) {
            if loading {
                dom::show_element(&indicator);
            } else {
                dom::hide_element(&indicator);
            }
        }
        if loading {
            if let Ok(container) = dom::get_element_by_id(&self.document, MESSAGES_ID) {
                dom::scroll_to_bottom(&container);
            }
        }
    }
}

fn spawn_submit(ctx: Rc<ChatContext>) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = ctx.submit().await {
            log::error!("Failed to send message: {}", js_error_text(&e));
        }
    });
}

fn render_message(document: &Document, msg: &Message) -> Result<Element, JsValue> {
    let msg_div = dom::create_element_with_class(
        document,
        "div",
        &format!("message {}", msg.role.as_str()),
    )?;

    let markdown_class = if msg.is_user() { "" } else { " markdown" };
    let html = format!(
        r#"<div class="message-content{}">{}</div>"#,
        markdown_class,
        markdown::render_message_content(msg)
    );
    msg_div.set_inner_html(&html);

    Ok(msg_div)
}
