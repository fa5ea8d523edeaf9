// API response value
// A status code and message pair, serialized as the JSON body of every API reply

use hyper::StatusCode;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

/// Outcome of an API action: status code, human readable message and
/// optional structured content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    code: StatusCode,
    message: String,
    content: Option<Value>,
}

impl ApiResponse {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            content: None,
        }
    }

    /// 200 OK
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, message)
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, message)
    }

    /// 413 Payload Too Large
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    /// Attach structured content to the response body
    #[must_use]
    pub fn with_content(mut self, content: Value) -> Self {
        self.content = Some(content);
        self
    }

    #[must_use]
    pub const fn code(&self) -> StatusCode {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    /// JSON text of the response body
    pub fn serialize(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for ApiResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.content.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("ApiResponse", len)?;
        state.serialize_field("code", &self.code.as_u16())?;
        state.serialize_field("message", &self.message)?;
        if let Some(content) = &self.content {
            state.serialize_field("content", content)?;
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_without_content() {
        let resp = ApiResponse::bad_request("Missing required request body parameter: name");
        let value: Value = serde_json::from_str(&resp.serialize().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"code": 400, "message": "Missing required request body parameter: name"})
        );
    }

    #[test]
    fn test_serialize_with_content() {
        let resp = ApiResponse::ok("Login with GitHub")
            .with_content(json!({"provider": "github"}));
        let value: Value = serde_json::from_str(&resp.serialize().unwrap()).unwrap();
        assert_eq!(value["code"], 200);
        assert_eq!(value["content"]["provider"], "github");
    }

    #[test]
    fn test_accessors() {
        let resp = ApiResponse::not_found("Unknown endpoint: /api/nope");
        assert_eq!(resp.code(), StatusCode::NOT_FOUND);
        assert_eq!(resp.message(), "Unknown endpoint: /api/nope");
        assert!(resp.content().is_none());
    }
}
