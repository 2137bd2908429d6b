//! Outbound chat messages.

use serde::Serialize;

use crate::error::Result;

/// Body of the bot API `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
}

impl OutboundMessage {
    pub fn html(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        }
    }
}

/// Bot API endpoint for `sendMessage`.
pub fn send_message_url(bot_token: &str) -> String {
    format!("https://api.telegram.org/bot{}/sendMessage", bot_token)
}

/// Delivers messages to a chat. The deployment wires this to the bot API.
pub trait Messenger {
    fn send(&mut self, message: &OutboundMessage) -> Result<()>;
}

/// Keeps every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    pub sent: Vec<OutboundMessage>,
    /// When set, every send fails with this reason.
    pub fail_with: Option<String>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Messenger for RecordingMessenger {
    fn send(&mut self, message: &OutboundMessage) -> Result<()> {
        if let Some(reason) = &self.fail_with {
            return Err(crate::error::BridgeError::Send(reason.clone()));
        }
        self.sent.push(message.clone());
        Ok(())
    }
}

/// Escape text interpolated into an HTML-mode message.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
