use async_trait::async_trait;
use serde_json::Value;
use crate::BoxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// One call to the booking backend.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: HttpMethod,
    /// Path relative to the backend base URL, e.g. `/api/v1/car/`.
    pub path: String,
    pub body: Option<Value>,
    /// Raw bearer token forwarded from the caller, without the `Bearer ` prefix.
    pub bearer: Option<String>,
}

impl UpstreamRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, bearer: None }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self { method: HttpMethod::Get, path: path.into(), body: None, bearer: None }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self { method: HttpMethod::Post, path: path.into(), body: Some(body), bearer: None }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, bearer: Option<String>) -> Self {
        self.bearer = bearer;
        self
    }
}

/// Whatever the backend answered, before any interpretation.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamReply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content-type sniffing, done before any attempt to parse.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }

    /// Parsed body when the reply claims to be JSON and actually is.
    pub fn json_body(&self) -> Option<Value> {
        if !self.is_json() {
            return None;
        }
        if self.body.is_empty() {
            return Some(Value::Null);
        }
        serde_json::from_slice(&self.body).ok()
    }

    /// First `max_chars` characters of the body, lossily decoded.
    pub fn preview(&self, max_chars: usize) -> String {
        String::from_utf8_lossy(&self.body).chars().take(max_chars).collect()
    }
}

/// Transport to the external booking backend.
///
/// `Err` means the request never produced an HTTP response; any status
/// code, including 5xx, comes back as `Ok`.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamReply, BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_reply_is_detected_and_parsed() {
        let reply = UpstreamReply::json(201, &json!({"id": 7}));
        assert!(reply.is_success());
        assert!(reply.is_json());
        assert_eq!(reply.json_body(), Some(json!({"id": 7})));
    }

    #[test]
    fn test_html_reply_is_not_parsed() {
        let reply = UpstreamReply {
            status: 500,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: b"<html><body>Server Error (500)</body></html>".to_vec(),
        };
        assert!(!reply.is_success());
        assert!(reply.json_body().is_none());
        assert_eq!(reply.preview(12), "<html><body>");
    }

    #[test]
    fn test_mislabelled_json_returns_none() {
        let reply = UpstreamReply {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: b"not json".to_vec(),
        };
        assert!(reply.json_body().is_none());
    }
}
