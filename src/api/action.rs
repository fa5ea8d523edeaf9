//! Action handler module
//!
//! Base for JSON-over-HTTP API actions. An [`ActionHandler`] is built once per
//! request from the raw body and query string, validates parameters, and
//! produces exactly one JSON response through [`ActionHandler::respond`].

use std::collections::HashMap;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::query::parse_query;
use super::response::ApiResponse;
use crate::logger::Logger;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Fixed body sent when a response cannot be serialized
const SERIALIZE_FAILURE_BODY: &str =
    r#"{"code":500,"message":"Failed to serialize response"}"#;

/// Result of an action: `Ok` is the success response, `Err` an early exit.
/// Both sides are sent the same way.
pub type ActionResult = Result<ApiResponse, ApiResponse>;

/// Request-specific logic run against a parsed request
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    fn handle(&self, handler: &ActionHandler) -> ActionResult;
}

/// Parsed view of one API request
pub struct ActionHandler {
    logger: Arc<dyn Logger>,
    body: Option<Map<String, Value>>,
    query: HashMap<String, String>,
}

impl ActionHandler {
    /// Parse the raw request payload and query string.
    ///
    /// Never fails: an empty, malformed or non-object payload leaves the body
    /// empty, so any later [`require_param`](Self::require_param) answers 400.
    ///
    /// # Arguments
    ///
    /// * `logger` - Audit logger used for parse warnings and the final response line
    /// * `raw_body` - Request payload exactly as received
    /// * `raw_query` - URL query string without the leading `?`, if any
    pub fn new(logger: Arc<dyn Logger>, raw_body: &[u8], raw_query: Option<&str>) -> Self {
        let body = parse_body(logger.as_ref(), raw_body);
        let query = raw_query.map(parse_query).unwrap_or_default();
        Self {
            logger,
            body,
            query,
        }
    }

    /// Parsed JSON body, `None` when absent or unusable
    #[must_use]
    pub const fn body(&self) -> Option<&Map<String, Value>> {
        self.body.as_ref()
    }

    #[must_use]
    pub const fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.body.as_ref()?.get(name)
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Require `name` to be a key of the request body.
    ///
    /// A JSON `null` counts as present. On absence the error carries a
    /// 400 response with `message`, or a default naming the parameter.
    pub fn require_param(&self, name: &str, message: Option<&str>) -> Result<&Value, ApiResponse> {
        self.param(name).ok_or_else(|| {
            let message = message.map_or_else(
                || format!("Missing required request body parameter: {name}"),
                ToString::to_string,
            );
            ApiResponse::bad_request(message)
        })
    }

    /// Deserialize the whole body into a typed record.
    ///
    /// Errors name the offending JSON path.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiResponse> {
        let value = Value::Object(self.body.clone().unwrap_or_default());
        serde_path_to_error::deserialize(value).map_err(|e| {
            let path = e.path().to_string();
            ApiResponse::bad_request(format!("Invalid request body at '{path}': {}", e.inner()))
        })
    }

    /// Send `response` to the client.
    ///
    /// Consumes the handler: nothing can run against this request afterwards.
    ///
    /// # Arguments
    ///
    /// * `response` - Status code and message to send
    ///
    /// # Returns
    ///
    /// A JSON response carrying `response`'s status, or a fixed 500 body when
    /// `response` cannot be serialized
    pub fn respond(self, response: &ApiResponse) -> Response<Full<Bytes>> {
        self.logger.info(&format!(
            "Sending HTTP response: {}: {}",
            response.code().as_u16(),
            response.message()
        ));

        let (status, body) = match response.serialize() {
            Ok(json) => (response.code(), Bytes::from(json)),
            Err(e) => {
                self.logger.error(&format!("Failed to serialize response: {e}"));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Bytes::from_static(SERIALIZE_FAILURE_BODY.as_bytes()),
                )
            }
        };

        let mut resp = Response::new(Full::new(body));
        resp.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        *resp.status_mut() = status;
        resp
    }
}

/// Run `action` and send whichever response it produced
pub fn run_action(handler: ActionHandler, action: &dyn Action) -> Response<Full<Bytes>> {
    handler.logger.info(&format!("Running action {}", action.name()));
    let response = action.handle(&handler).unwrap_or_else(|early| early);
    handler.respond(&response)
}

fn parse_body(logger: &dyn Logger, raw: &[u8]) -> Option<Map<String, Value>> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            logger.warn(&format!(
                "Request body is JSON but not an object ({}), ignoring it",
                json_kind(&other)
            ));
            None
        }
        Err(e) => {
            logger.warn(&format!("Request body is not valid JSON: {e}"));
            None
        }
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
