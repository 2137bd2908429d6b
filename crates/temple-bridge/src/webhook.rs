//! `POST /api/webhook`: bot update intake.
//!
//! A start command mints a one-shot token, stores it against the chat and
//! replies with the game link. Every update is acknowledged with
//! `{ok: true}` so the bot API never retries.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::messenger::{Messenger, OutboundMessage};
use crate::response::HttpResponse;
use crate::store::{SessionRecord, SessionStore};
use crate::BridgeEnv;

#[derive(Debug, Deserialize)]
struct Update {
    message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: serde_json::Value,
}

/// `/start`, `/start@bot`, `/start payload`, bare `start` or `/link`, any case.
pub fn is_start_command(text: &str) -> bool {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    if lower == "start" || lower == "/link" {
        return true;
    }
    match lower.strip_prefix("/start") {
        Some(rest) => rest.is_empty() || rest.starts_with('@') || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// 32 hex characters from a random v4 UUID.
pub fn mint_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// `<game_url>?tg=<token>`, tolerating a trailing slash on the base URL.
pub fn deep_link(game_url: &str, token: &str) -> String {
    format!("{}?tg={}", game_url.strip_suffix('/').unwrap_or(game_url), token)
}

/// Android intent that opens `link` in Chrome instead of the in-app browser.
pub fn chrome_intent(link: &str) -> String {
    let bare = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .unwrap_or(link);
    format!("intent://{}#Intent;scheme=https;package=com.android.chrome;end", bare)
}

fn link_message(link: &str) -> String {
    format!(
        "🏛 <b>Mystery Temple</b>\n\nHere is your game link:\n{}\n\n<b>Open in Android Chrome (try this):</b>\n{}\n\nCheck <b>Telegram</b> when you finish the game.",
        link,
        chrome_intent(link)
    )
}

fn chat_id_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn handle_webhook<S: SessionStore, M: Messenger>(
    env: &mut BridgeEnv<S, M>,
    body: &str,
    now_ms: i64,
) -> HttpResponse {
    let ack = HttpResponse::json(&json!({ "ok": true }), 200);

    let update: Update = match serde_json::from_str(body) {
        Ok(u) => u,
        Err(e) => {
            log::warn!("webhook: unreadable update: {}", e);
            return ack;
        }
    };
    let Some(message) = update.message else {
        return ack;
    };
    let text = message.text.unwrap_or_default();
    if !is_start_command(&text) {
        return ack;
    }

    let chat_id = chat_id_string(&message.chat.id);
    let token = mint_token();
    if let Err(e) = env.store.upsert(SessionRecord::new(token.clone(), chat_id.clone(), now_ms)) {
        log::error!("webhook: could not store session for chat {}: {}", chat_id, e);
        return ack;
    }

    let link = deep_link(&env.game_url, &token);
    if let Err(e) = env.messenger.send(&OutboundMessage::html(chat_id.clone(), link_message(&link))) {
        log::warn!("webhook: link reply to chat {} failed: {}", chat_id, e);
    } else {
        log::info!("webhook: minted link for chat {}", chat_id);
    }
    ack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::RecordingMessenger;
    use crate::store::MemorySessionStore;

    fn env() -> BridgeEnv<MemorySessionStore, RecordingMessenger> {
        BridgeEnv::new(MemorySessionStore::new(), RecordingMessenger::new(), "https://temple.example/")
    }

    #[test]
    fn start_variants() {
        for t in ["/start", "/START", "/start@TempleBot", "/start abc", "start", " Start ", "/link"] {
            assert!(is_start_command(t), "{t}");
        }
        for t in ["/started", "restart", "hello", "", "/linked"] {
            assert!(!is_start_command(t), "{t}");
        }
    }

    #[test]
    fn links_strip_slash_and_scheme() {
        assert_eq!(deep_link("https://g.example/", "t1"), "https://g.example?tg=t1");
        assert_eq!(deep_link("https://g.example", "t1"), "https://g.example?tg=t1");
        assert_eq!(
            chrome_intent("https://g.example?tg=t1"),
            "intent://g.example?tg=t1#Intent;scheme=https;package=com.android.chrome;end"
        );
    }

    #[test]
    fn tokens_are_dashless_and_fresh() {
        let a = mint_token();
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
        assert_ne!(a, mint_token());
    }

    #[test]
    fn start_persists_token_and_replies_with_link() {
        let mut env = env();
        let res = handle_webhook(&mut env, r#"{"message":{"chat":{"id":555},"text":"/start"}}"#, 1_000);
        assert_eq!(res.status, 200);
        assert_eq!(res.body_json().unwrap()["ok"], true);

        let record = env.store.records().next().cloned().unwrap();
        assert_eq!(record.chat_id, "555");
        assert_eq!(record.created_at, 1_000);
        assert!(!record.used);

        assert_eq!(env.messenger.sent.len(), 1);
        let sent = &env.messenger.sent[0];
        assert_eq!(sent.chat_id, "555");
        assert!(sent.text.contains(&format!("https://temple.example?tg={}", record.token)));
    }

    #[test]
    fn other_updates_are_acknowledged_silently() {
        let mut env = env();
        for body in ["not json", "{}", r#"{"message":{"chat":{"id":1},"text":"hi"}}"#, r#"{"message":{"chat":{"id":1}}}"#] {
            let res = handle_webhook(&mut env, body, 0);
            assert_eq!(res.status, 200);
            assert_eq!(res.body_json().unwrap()["ok"], true);
        }
        assert!(env.store.is_empty());
        assert!(env.messenger.sent.is_empty());
    }
}
