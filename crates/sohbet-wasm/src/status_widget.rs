use sohbet_core::{ConnectionState, LiveStatus, PushChannel, StatusSubscriber, StatusValue, Texts};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::dom;

/// Side widget showing the live button status and hub connectivity
pub struct StatusWidget {
    subscriber: StatusSubscriber,
}

impl StatusWidget {
    pub fn mount(
        document: &Document,
        channel: &dyn PushChannel,
        texts: Texts,
    ) -> Result<Self, JsValue> {
        let value_element = dom::get_element_by_id(document, "statusValue")?;
        let connection_element = dom::get_element_by_id(document, "connectionStatus")?;
        dom::set_text_by_id(document, "statusTitle", &texts.status_title);

        render(&value_element, &connection_element, &texts, &LiveStatus::default());

        let subscriber = StatusSubscriber::mount(channel, move |live: &LiveStatus| {
            render(&value_element, &connection_element, &texts, live);
        });

        Ok(Self { subscriber })
    }

    pub fn unmount(&mut self) {
        self.subscriber.unmount();
    }
}

fn render(value_element: &Element, connection_element: &Element, texts: &Texts, live: &LiveStatus) {
    let status = live.status();
    value_element.set_text_content(Some(status.label(texts)));
    value_element.set_class_name(match status {
        StatusValue::Pressed => "status-value pressed",
        StatusValue::Empty => "status-value empty",
    });

    let connection = live.connection();
    connection_element.set_text_content(Some(connection.label(texts)));
    connection_element.set_class_name(match connection {
        ConnectionState::Connected => "connection-status connected",
        ConnectionState::Connecting => "connection-status connecting",
        ConnectionState::Disconnected => "connection-status disconnected",
    });
}
