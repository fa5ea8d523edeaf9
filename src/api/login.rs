// Login action
// Resolves the identity provider chosen on the login page to its auth URL

use serde_json::json;

use super::action::{Action, ActionHandler, ActionResult};
use super::response::ApiResponse;

/// Identity providers offered on the login page, as (id, display name)
pub const PROVIDERS: [(&str, &str); 4] = [
    ("onid", "ONID"),
    ("google", "Google"),
    ("microsoft", "Microsoft"),
    ("github", "GitHub"),
];

/// `POST /api/login` with body `{"provider": "<id>"}`
pub struct LoginAction {
    base_url: String,
}

impl LoginAction {
    /// `base_url` must end with `/`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn auth_url(&self, provider: &str, redirect: Option<&str>) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("provider", provider);
        if let Some(redirect) = redirect {
            query.append_pair("redirect", redirect);
        }
        format!("{}auth/index.php?{}", self.base_url, query.finish())
    }
}

fn find_provider(requested: &str) -> Option<(&'static str, &'static str)> {
    PROVIDERS
        .iter()
        .copied()
        .find(|(id, _)| id.eq_ignore_ascii_case(requested))
}

impl Action for LoginAction {
    fn name(&self) -> &'static str {
        "login"
    }

    fn handle(&self, handler: &ActionHandler) -> ActionResult {
        let requested = handler
            .require_param("provider", None)?
            .as_str()
            .ok_or_else(|| ApiResponse::bad_request("Login provider must be a string"))?;

        let (id, display) = find_provider(requested).ok_or_else(|| {
            ApiResponse::bad_request(format!("Unsupported login provider: {requested}"))
        })?;

        let url = self.auth_url(id, handler.query_param("redirect"));
        Ok(ApiResponse::ok(format!("Login with {display}"))
            .with_content(json!({ "provider": id, "url": url })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::testing::RecordingLogger;
    use hyper::StatusCode;
    use std::sync::Arc;

    fn run(body: &str, query: Option<&str>) -> ActionResult {
        let handler = ActionHandler::new(Arc::new(RecordingLogger::default()), body.as_bytes(), query);
        LoginAction::new("https://portal.example.edu/").handle(&handler)
    }

    #[test]
    fn test_known_provider() {
        let resp = run(r#"{"provider": "github"}"#, None).unwrap();
        assert_eq!(resp.code(), StatusCode::OK);
        assert_eq!(resp.message(), "Login with GitHub");
        let content = resp.content().unwrap();
        assert_eq!(content["provider"], "github");
        assert_eq!(
            content["url"],
            "https://portal.example.edu/auth/index.php?provider=github"
        );
    }

    #[test]
    fn test_provider_match_ignores_case() {
        let resp = run(r#"{"provider": "ONID"}"#, None).unwrap();
        assert_eq!(resp.content().unwrap()["provider"], "onid");
    }

    #[test]
    fn test_redirect_is_encoded() {
        let resp = run(r#"{"provider": "google"}"#, Some("redirect=%2Fpages%2FmyProfile.php")).unwrap();
        assert_eq!(
            resp.content().unwrap()["url"],
            "https://portal.example.edu/auth/index.php?provider=google&redirect=%2Fpages%2FmyProfile.php"
        );
    }

    #[test]
    fn test_missing_provider() {
        let err = run("{}", None).unwrap_err();
        assert_eq!(err.code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Missing required request body parameter: provider");
    }

    #[test]
    fn test_provider_not_a_string() {
        let err = run(r#"{"provider": 3}"#, None).unwrap_err();
        assert_eq!(err.message(), "Login provider must be a string");
    }

    #[test]
    fn test_unknown_provider() {
        let err = run(r#"{"provider": "myspace"}"#, None).unwrap_err();
        assert_eq!(err.code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Unsupported login provider: myspace");
    }
}
