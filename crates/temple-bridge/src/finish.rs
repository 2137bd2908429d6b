//! `POST /api/finish`: the game page reports a finished run.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{BridgeError, Result};
use crate::messenger::{escape_html, Messenger, OutboundMessage};
use crate::response::HttpResponse;
use crate::store::SessionStore;
use crate::BridgeEnv;

/// Completion payload sent by the game page.
///
/// `score` and `level` are accepted as numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishRequest {
    #[serde(default)]
    pub tg: Value,
    #[serde(default)]
    pub answer: Value,
    #[serde(default)]
    pub score: Value,
    #[serde(default)]
    pub level: Value,
}

impl FinishRequest {
    pub fn new(tg: &str, answer: &str, score: u64, level: u32) -> Self {
        Self {
            tg: Value::from(tg),
            answer: Value::from(answer),
            score: Value::from(score),
            level: Value::from(level),
        }
    }

    /// The link token, or empty when missing or blank.
    pub fn token(&self) -> String {
        text_or(&self.tg, "")
    }

    pub fn answer_text(&self) -> String {
        text_or(&self.answer, "N/A")
    }

    pub fn score_text(&self) -> String {
        present_or(&self.score, "?")
    }

    pub fn level_text(&self) -> String {
        present_or(&self.level, "?")
    }
}

/// String form of a JSON value, falling back when it is falsy.
fn text_or(value: &Value, fallback: &str) -> String {
    match value {
        Value::Null | Value::Bool(false) => fallback.to_owned(),
        Value::String(s) if s.is_empty() => fallback.to_owned(),
        Value::Number(n) if n.as_f64() == Some(0.0) => fallback.to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// String form of a JSON value, falling back only when it is absent.
fn present_or(value: &Value, fallback: &str) -> String {
    match value {
        Value::Null => fallback.to_owned(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn finish_message(request: &FinishRequest) -> String {
    format!(
        "✅ <b>Game Finished</b>\n\nAnswer: <b>{}</b>\nScore: <b>{}</b>\nLevel: <b>{}</b>",
        escape_html(&request.answer_text()),
        escape_html(&request.score_text()),
        escape_html(&request.level_text()),
    )
}

/// Outcome of a well-formed finish request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishOutcome {
    Sent,
    AlreadyUsed,
}

fn parse_request(body: &str) -> Result<FinishRequest> {
    let value: Value = serde_json::from_str(body).map_err(|_| BridgeError::BadJson)?;
    if !value.is_object() {
        return Err(BridgeError::BadJson);
    }
    serde_json::from_value(value).map_err(|_| BridgeError::BadJson)
}

/// Look up the session, notify its chat once and consume the token.
pub fn finish<S: SessionStore, M: Messenger>(env: &mut BridgeEnv<S, M>, body: &str) -> Result<FinishOutcome> {
    let request = parse_request(body)?;
    let token = request.token();
    if token.is_empty() {
        return Err(BridgeError::MissingToken);
    }

    let record = env.store.find(&token)?.ok_or(BridgeError::UnknownToken)?;
    if record.used {
        return Ok(FinishOutcome::AlreadyUsed);
    }

    env.messenger.send(&OutboundMessage::html(record.chat_id.clone(), finish_message(&request)))?;
    env.store.mark_used(&token)?;
    log::info!("finish: notified chat {}", record.chat_id);
    Ok(FinishOutcome::Sent)
}

pub fn handle_finish<S: SessionStore, M: Messenger>(env: &mut BridgeEnv<S, M>, body: &str) -> HttpResponse {
    let response = match finish(env, body) {
        Ok(FinishOutcome::Sent) => HttpResponse::json(&json!({ "ok": true }), 200),
        Ok(FinishOutcome::AlreadyUsed) => HttpResponse::json(&json!({ "ok": true, "already": true }), 200),
        Err(e) => {
            if e.status() >= 500 {
                log::error!("finish: {}", e);
            } else {
                log::warn!("finish: rejected: {}", e);
            }
            HttpResponse::json(&json!({ "ok": false, "error": e.public_message() }), e.status())
        }
    };
    response.with_cors()
}

pub fn handle_finish_options() -> HttpResponse {
    HttpResponse::preflight()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::RecordingMessenger;
    use crate::store::{MemorySessionStore, SessionRecord};

    fn env_with_session() -> BridgeEnv<MemorySessionStore, RecordingMessenger> {
        let mut store = MemorySessionStore::new();
        store.upsert(SessionRecord::new("tok1", "777", 0)).unwrap();
        BridgeEnv::new(store, RecordingMessenger::new(), "https://g.example")
    }

    #[test]
    fn replay_sends_once() {
        let mut env = env_with_session();
        let body = r#"{"tg":"tok1","answer":"YES","score":1234,"level":5}"#;

        let first = handle_finish(&mut env, body);
        assert_eq!(first.status, 200);
        assert_eq!(first.body_json().unwrap(), json!({"ok": true}));
        assert_eq!(env.messenger.sent.len(), 1);
        assert!(env.store.find("tok1").unwrap().unwrap().used);

        let second = handle_finish(&mut env, body);
        assert_eq!(second.status, 200);
        assert_eq!(second.body_json().unwrap(), json!({"ok": true, "already": true}));
        assert_eq!(env.messenger.sent.len(), 1);
    }

    #[test]
    fn message_carries_fields_and_defaults() {
        let mut env = env_with_session();
        handle_finish(&mut env, r#"{"tg":"tok1"}"#);
        let text = &env.messenger.sent[0].text;
        assert!(text.contains("Answer: <b>N/A</b>"));
        assert!(text.contains("Score: <b>?</b>"));
        assert!(text.contains("Level: <b>?</b>"));
        assert_eq!(env.messenger.sent[0].chat_id, "777");
    }

    #[test]
    fn rejects_malformed_requests() {
        let mut env = env_with_session();
        let cases = [
            ("nope", "bad json"),
            ("null", "bad json"),
            (r#"{"answer":"YES"}"#, "missing token"),
            (r#"{"tg":""}"#, "missing token"),
            (r#"{"tg":"other"}"#, "unknown token"),
        ];
        for (body, error) in cases {
            let res = handle_finish(&mut env, body);
            assert_eq!(res.status, 400, "{body}");
            assert_eq!(res.body_json().unwrap()["error"], error);
            assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
        }
        assert!(env.messenger.sent.is_empty());
    }

    #[test]
    fn failed_send_keeps_token_usable() {
        let mut env = env_with_session();
        env.messenger.fail_with = Some("timeout".into());
        let res = handle_finish(&mut env, r#"{"tg":"tok1","answer":"YES"}"#);
        assert_eq!(res.status, 502);
        assert!(!env.store.find("tok1").unwrap().unwrap().used);
    }

    #[test]
    fn string_scores_pass_through() {
        let req: FinishRequest = serde_json::from_str(r#"{"tg":"t","score":"900","level":3}"#).unwrap();
        assert_eq!(req.score_text(), "900");
        assert_eq!(req.level_text(), "3");
    }
}
