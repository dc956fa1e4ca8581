use std::rc::Rc;

use sohbet_core::{
    get_or_create_session_id, ChatTransport, ClientConfig, MemoryStore, SessionId,
};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod chat_ui;
mod dom;
mod hub;
mod markdown;
mod status_widget;
mod storage;
mod toast;
mod transport;
mod utils;

pub use chat_ui::ChatApp;
pub use hub::HubChannel;
pub use markdown::{render_markdown, render_message_content};
pub use storage::LocalStorage;
pub use transport::FetchTransport;

use status_widget::StatusWidget;

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging; `mount_chat_app` narrows the level from config
    wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));

    log::info!("Sohbet WASM initialized");
}

/// Handle to a mounted chat page. Dropping it (or calling `unmount`) removes
/// the event listeners and closes the status hub connection.
#[wasm_bindgen]
pub struct MountedApp {
    session_id: SessionId,
    chat: Option<ChatApp>,
    status: Option<StatusWidget>,
}

#[wasm_bindgen]
impl MountedApp {
    #[wasm_bindgen(getter, js_name = sessionId)]
    pub fn session_id(&self) -> String {
        self.session_id.to_string()
    }

    #[wasm_bindgen(getter, js_name = messageCount)]
    pub fn message_count(&self) -> usize {
        self.chat.as_ref().map_or(0, ChatApp::message_count)
    }

    pub fn unmount(&mut self) {
        if let Some(mut status) = self.status.take() {
            status.unmount();
        }
        if self.chat.take().is_some() {
            log::info!("Chat unmounted");
        }
    }
}

/// Mount the chat page. `config_json` overrides any subset of the defaults.
#[wasm_bindgen]
pub fn mount_chat_app(config_json: Option<String>) -> Result<MountedApp, JsValue> {
    let config = match config_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => ClientConfig::from_json(json).map_err(to_js)?,
        _ => ClientConfig::default(),
    };
    log::set_max_level(config.level_filter().map_err(to_js)?);

    // Obtained once and threaded through; nothing reads storage after this
    let session_id = load_session_id(&config.storage_key)?;
    let document = document()?;

    let transport: Rc<dyn ChatTransport> = Rc::new(FetchTransport::from_config(&config));
    let chat = ChatApp::mount(
        document.clone(),
        session_id.clone(),
        transport,
        config.texts.clone(),
    )?;

    let channel = HubChannel::from_config(&config);
    let status = StatusWidget::mount(&document, &channel, config.texts.clone())?;

    Ok(MountedApp {
        session_id,
        chat: Some(chat),
        status: Some(status),
    })
}

fn load_session_id(storage_key: &str) -> Result<SessionId, JsValue> {
    match LocalStorage::open() {
        Ok(mut store) => get_or_create_session_id(&mut store, storage_key).map_err(to_js),
        Err(e) => {
            log::warn!("{}; session id will not survive a reload", e);
            get_or_create_session_id(&mut MemoryStore::new(), storage_key).map_err(to_js)
        }
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
