use serde_json::Value;

/// A framework-neutral HTTP response produced by the endpoint handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn json(data: &Value, status: u16) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", "application/json".to_owned())],
            body: Some(data.to_string()),
        }
    }

    /// Allow the game page to call the endpoint from any origin.
    pub fn with_cors(mut self) -> Self {
        self.headers.push(("Access-Control-Allow-Origin", "*".to_owned()));
        self.headers.push(("Access-Control-Allow-Methods", "POST, OPTIONS".to_owned()));
        self.headers.push(("Access-Control-Allow-Headers", "Content-Type".to_owned()));
        self
    }

    /// Empty 204 answer to a CORS preflight.
    pub fn preflight() -> Self {
        Self { status: 204, headers: Vec::new(), body: None }.with_cors()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed JSON body, if any.
    pub fn body_json(&self) -> Option<Value> {
        self.body.as_deref().and_then(|b| serde_json::from_str(b).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preflight_is_204_with_cors() {
        let res = HttpResponse::preflight();
        assert_eq!(res.status, 204);
        assert!(res.body.is_none());
        assert_eq!(res.header("access-control-allow-origin"), Some("*"));
    }

    #[test]
    fn json_body_round_trips() {
        let res = HttpResponse::json(&json!({"ok": true}), 200);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        assert_eq!(res.body_json().unwrap()["ok"], true);
    }
}
