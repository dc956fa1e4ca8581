use gloo_timers::future::TimeoutFuture;
use sohbet_core::{Notice, NoticeLevel};
use wasm_bindgen::JsValue;
use web_sys::Document;

use crate::dom;

const TOAST_MS: u32 = 3_000;

/// Show a transient notification that removes itself after a few seconds
pub fn show_notice(document: &Document, notice: &Notice) -> Result<(), JsValue> {
    let container = dom::get_element_by_id(document, "notifications")?;
    let class = match notice.level {
        NoticeLevel::Warning => "toast warning",
        NoticeLevel::Error => "toast error",
    };

    let toast = dom::create_element_with_class(document, "div", class)?;
    toast.set_text_content(Some(&notice.text));
    container.append_child(&toast)?;

    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(TOAST_MS).await;
        toast.remove();
    });

    Ok(())
}
