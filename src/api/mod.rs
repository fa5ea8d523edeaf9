// API module entry
// Maps requests to actions; every reply leaves through ActionHandler::respond

mod action;
mod login;
mod query;
mod response;

use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH};
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::logger::Logger;

// Re-export public types
pub use action::{run_action, Action, ActionHandler, ActionResult, JSON_CONTENT_TYPE};
pub use login::{LoginAction, PROVIDERS};
pub use query::parse_query;
pub use response::ApiResponse;

/// Liveness probe
struct HealthAction;

impl Action for HealthAction {
    fn name(&self) -> &'static str {
        "health"
    }

    fn handle(&self, _handler: &ActionHandler) -> ActionResult {
        Ok(ApiResponse::ok("ok"))
    }
}

/// Known endpoints and the single method each accepts
fn route(path: &str) -> Option<Method> {
    match path {
        "/api/login" => Some(Method::POST),
        "/healthz" => Some(Method::GET),
        _ => None,
    }
}

/// Main entry point for HTTP request handling
///
/// Collects the body up to `http.max_body_size` before dispatching.
///
/// # Arguments
///
/// * `req` - Inbound request; any body yielding `Bytes` frames
/// * `state` - Shared application state
///
/// # Returns
///
/// Always `Ok`: oversized or unreadable bodies are answered with a 413 or
/// 400 JSON response
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    let max_body_size = state.config.http.max_body_size;

    let declared = declared_length(&parts.headers, state.logger.as_ref());
    if declared.is_some_and(|len| len > max_body_size) {
        return Ok(too_large(&state, max_body_size));
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let raw_body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            return Ok(too_large(&state, max_body_size));
        }
        Err(e) => {
            state.logger.warn(&format!("Failed to read request body: {e}"));
            let handler = ActionHandler::new(Arc::clone(&state.logger), &[], None);
            return Ok(handler.respond(&ApiResponse::bad_request("Failed to read request body")));
        }
    };

    Ok(dispatch(
        &parts.method,
        parts.uri.path(),
        parts.uri.query(),
        &raw_body,
        &state,
    ))
}

/// Route an already-read request to its action
pub fn dispatch(
    method: &Method,
    path: &str,
    query: Option<&str>,
    raw_body: &[u8],
    state: &AppState,
) -> Response<Full<Bytes>> {
    let handler = ActionHandler::new(Arc::clone(&state.logger), raw_body, query);

    let Some(allowed) = route(path) else {
        return handler.respond(&ApiResponse::not_found(format!("Unknown endpoint: {path}")));
    };

    if *method != allowed {
        let mut resp = handler.respond(&ApiResponse::method_not_allowed(format!(
            "Method {method} not allowed on {path}"
        )));
        if let Ok(value) = HeaderValue::from_str(allowed.as_str()) {
            resp.headers_mut().insert(ALLOW, value);
        }
        return resp;
    }

    match path {
        "/api/login" => run_action(handler, &LoginAction::new(state.config.site.base_url.as_str())),
        _ => run_action(handler, &HealthAction),
    }
}

fn declared_length(headers: &hyper::HeaderMap, logger: &dyn Logger) -> Option<u64> {
    let value = headers.get(CONTENT_LENGTH)?;
    let len = value.to_str().ok().and_then(|s| s.trim().parse::<u64>().ok());
    if len.is_none() {
        logger.warn("Invalid Content-Length header, skipping size check");
    }
    len
}

fn too_large(state: &AppState, max_body_size: u64) -> Response<Full<Bytes>> {
    state
        .logger
        .error(&format!("Request body too large (max: {max_body_size} bytes)"));
    let handler = ActionHandler::new(Arc::clone(&state.logger), &[], None);
    handler.respond(&ApiResponse::payload_too_large(format!(
        "Request body exceeds {max_body_size} bytes"
    )))
}
