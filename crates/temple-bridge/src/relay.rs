//! Client side of the finish report: post to the endpoint, fall back to a
//! fire-and-forget beacon if the request cannot be made at all.

use serde_json::Value;

use crate::error::RelayError;
use crate::finish::FinishRequest;

pub const FINISH_ENDPOINT: &str = "/api/finish";

/// The page's network primitives.
pub trait Transport {
    /// POST JSON and return the status and parsed body (`{}` when unparsable).
    fn post_json(&mut self, url: &str, body: &str) -> Result<(u16, Value), String>;

    /// Queue a fire-and-forget POST. Returns false if the beacon was refused.
    fn beacon(&mut self, url: &str, body: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelayOutcome {
    Delivered(Value),
    /// Handed to the beacon; no response is available.
    Beacon,
}

/// Send the completion report for the linked session.
pub fn notify_finish<T: Transport>(
    transport: &mut T,
    token: Option<&str>,
    answer: &str,
    score: u64,
    level: u32,
) -> Result<RelayOutcome, RelayError> {
    let token = token.filter(|t| !t.is_empty()).ok_or(RelayError::NotLinked)?;
    let answer = if answer.is_empty() { "N/A" } else { answer };
    let payload = FinishRequest::new(token, answer, score, level);
    let body = serde_json::to_string(&payload).map_err(|e| RelayError::Transport(e.to_string()))?;

    match transport.post_json(FINISH_ENDPOINT, &body) {
        Ok((status, data)) => {
            if (200..300).contains(&status) && data.get("ok") == Some(&Value::Bool(true)) {
                Ok(RelayOutcome::Delivered(data))
            } else {
                Err(RelayError::Rejected { status, body: data })
            }
        }
        Err(reason) => {
            log::warn!("finish relay: request failed ({}), trying beacon", reason);
            if transport.beacon(FINISH_ENDPOINT, &body) {
                Ok(RelayOutcome::Beacon)
            } else {
                Err(RelayError::Transport(reason))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct FakeTransport {
        response: Option<(u16, Value)>,
        beacon_ok: bool,
        posts: Vec<String>,
        beacons: Vec<String>,
    }

    impl Transport for FakeTransport {
        fn post_json(&mut self, _url: &str, body: &str) -> Result<(u16, Value), String> {
            self.posts.push(body.to_owned());
            self.response.clone().ok_or_else(|| "offline".to_owned())
        }

        fn beacon(&mut self, _url: &str, body: &str) -> bool {
            self.beacons.push(body.to_owned());
            self.beacon_ok
        }
    }

    #[test]
    fn unlinked_session_sends_nothing() {
        let mut t = FakeTransport::default();
        let err = notify_finish(&mut t, None, "YES", 10, 5).unwrap_err();
        assert!(matches!(err, RelayError::NotLinked));
        assert!(t.posts.is_empty() && t.beacons.is_empty());
    }

    #[test]
    fn successful_post_returns_body() {
        let mut t = FakeTransport { response: Some((200, json!({"ok": true}))), ..Default::default() };
        let out = notify_finish(&mut t, Some("tok"), "YES", 10, 5).unwrap();
        assert_eq!(out, RelayOutcome::Delivered(json!({"ok": true})));
        let sent: Value = serde_json::from_str(&t.posts[0]).unwrap();
        assert_eq!(sent, json!({"tg": "tok", "answer": "YES", "score": 10, "level": 5}));
    }

    #[test]
    fn network_failure_falls_back_to_beacon() {
        let mut t = FakeTransport { beacon_ok: true, ..Default::default() };
        assert_eq!(notify_finish(&mut t, Some("tok"), "", 1, 1).unwrap(), RelayOutcome::Beacon);
        assert!(t.beacons[0].contains("N/A"));
    }

    #[test]
    fn rejection_is_not_retried_by_beacon() {
        let mut t = FakeTransport {
            response: Some((400, json!({"ok": false, "error": "unknown token"}))),
            beacon_ok: true,
            ..Default::default()
        };
        let err = notify_finish(&mut t, Some("tok"), "YES", 1, 1).unwrap_err();
        assert!(matches!(err, RelayError::Rejected { status: 400, .. }));
        assert!(t.beacons.is_empty());
    }
}
