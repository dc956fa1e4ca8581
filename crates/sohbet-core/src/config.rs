//! Client configuration
//!
//! Every field has a default, so a page can mount the client with no
//! configuration at all or override only the endpoints.

use std::str::FromStr;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};
use crate::reconnect::ReconnectPolicy;
use crate::session::DEFAULT_STORAGE_KEY;
use crate::transport::PayloadShape;

const CODE_PLACEHOLDER: &str = "{code}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub chat_endpoint: String,
    pub payload_shape: PayloadShape,
    /// Absolute `http(s)`/`ws(s)` URL, or a path relative to the page origin
    pub hub_url: String,
    pub hub_skip_negotiation: bool,
    pub hub_keep_alive_ms: u32,
    pub reconnect: ReconnectPolicy,
    pub storage_key: String,
    pub log_level: String,
    pub texts: Texts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chat_endpoint: "/api/chat".to_string(),
            payload_shape: PayloadShape::Session,
            hub_url: "/buttonHub".to_string(),
            hub_skip_negotiation: false,
            hub_keep_alive_ms: 15_000,
            reconnect: ReconnectPolicy::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "info".to_string(),
            texts: Texts::default(),
        }
    }
}

impl ClientConfig {
    /// Parse a JSON override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ChatError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chat_endpoint.trim().is_empty() {
            return Err(ChatError::Config("chat_endpoint is empty".to_string()));
        }
        if self.hub_url.trim().is_empty() {
            return Err(ChatError::Config("hub_url is empty".to_string()));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ChatError::Config("storage_key is empty".to_string()));
        }
        if self.hub_keep_alive_ms == 0 {
            return Err(ChatError::Config("hub_keep_alive_ms must be positive".to_string()));
        }
        if self.reconnect.initial_delay_ms == 0 {
            return Err(ChatError::Config(
                "reconnect.initial_delay_ms must be positive".to_string(),
            ));
        }
        if !self.texts.status_error_template.contains(CODE_PLACEHOLDER) {
            return Err(ChatError::Config(format!(
                "status_error_template must contain {}",
                CODE_PLACEHOLDER
            )));
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ChatError::Config(format!("unknown log level '{}'", self.log_level)))
    }
}

/// User-visible strings. Defaults are Turkish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Texts {
    pub title: String,
    pub input_placeholder: String,
    pub send_label: String,
    pub empty_input_warning: String,
    pub transport_error: String,
    pub fallback_reply: String,
    pub status_error_template: String,
    pub status_title: String,
    pub status_pressed: String,
    pub status_empty: String,
    pub connected_label: String,
    pub connecting_label: String,
    pub disconnected_label: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            title: "Sohbet".to_string(),
            input_placeholder: "Mesajınızı yazın...".to_string(),
            send_label: "Gönder".to_string(),
            empty_input_warning: "Lütfen bir mesaj girin.".to_string(),
            transport_error: "Bir hata oluştu.".to_string(),
            fallback_reply: "Üzgünüm, şu anda yanıt veremiyorum. Lütfen daha sonra tekrar deneyin."
                .to_string(),
            status_error_template: "⚠️ Sunucu hatası ({code})".to_string(),
            status_title: "Buton Durumu".to_string(),
            status_pressed: "BASILI".to_string(),
            status_empty: "BOŞ".to_string(),
            connected_label: "Bağlı".to_string(),
            connecting_label: "Bağlanıyor...".to_string(),
            disconnected_label: "Bağlantı yok".to_string(),
        }
    }
}

impl Texts {
    /// Assistant placeholder for a non-success HTTP status
    pub fn status_error(&self, code: u16) -> String {
        self.status_error_template
            .replace(CODE_PLACEHOLDER, &code.to_string())
    }
}
