use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::errors::ApiError;
use crate::api::traits::{ActionOutcome, MiningAction, MiningApi};
use crate::config::CoinsConfig;
use crate::mining::types::{CollegeId, Dashboard};
use crate::mining::validation::parse_dashboard;

/// Longest server error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 200;

/// `reqwest`-backed client for the platform's REST API.
#[derive(Debug, Clone)]
pub struct HttpMiningApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpMiningApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl {
            url: base_url.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url.to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &CoinsConfig) -> Result<Self, ApiError> {
        Self::new(config.base_url(), config.request_timeout())
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }

        let json: Option<Value> = serde_json::from_str(&body).ok();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: json
                    .as_ref()
                    .and_then(error_message)
                    .unwrap_or_else(|| truncate_body(&body)),
            });
        }

        json.ok_or_else(|| {
            ApiError::from(crate::mining::errors::PayloadError::NotAnObject {
                context: "response",
            })
        })
    }

    async fn action(
        &self,
        action: MiningAction,
        token: &str,
        college: &CollegeId,
    ) -> Result<ActionOutcome, ApiError> {
        let action_segment = action.to_string();
        let url = self.endpoint(&["mining", action_segment.as_str(), college.as_str()])?;
        info!(
            event = "core.api.action_started",
            action = %action,
            college = %college,
        );

        let result = self
            .send(self.client.post(url).bearer_auth(token))
            .await
            .and_then(|body| parse_envelope(&body));

        match &result {
            Ok(_) => info!(
                event = "core.api.action_completed",
                action = %action,
                college = %college,
            ),
            Err(e) => warn!(
                event = "core.api.action_failed",
                action = %action,
                college = %college,
                error = %e,
            ),
        }
        result
    }
}

impl MiningApi for HttpMiningApi {
    async fn fetch_dashboard(&self, token: &str) -> Result<Dashboard, ApiError> {
        let url = self.endpoint(&["student", "dashboard"])?;
        debug!(event = "core.api.dashboard_fetch_started", url = %url);

        let body = self.send(self.client.get(url).bearer_auth(token)).await?;
        let dashboard = parse_dashboard(&body)?;

        debug!(
            event = "core.api.dashboard_fetch_completed",
            colleges = dashboard.mining_colleges.len(),
            sessions = dashboard.active_sessions.len(),
        );
        Ok(dashboard)
    }

    async fn start_mining(
        &self,
        token: &str,
        college: &CollegeId,
    ) -> Result<ActionOutcome, ApiError> {
        self.action(MiningAction::Start, token, college).await
    }

    async fn stop_mining(
        &self,
        token: &str,
        college: &CollegeId,
    ) -> Result<ActionOutcome, ApiError> {
        self.action(MiningAction::Stop, token, college).await
    }
}

/// Interpret a `{ success, message }` envelope.
///
/// A 2xx body without a `success` flag counts as success.
pub fn parse_envelope(body: &Value) -> Result<ActionOutcome, ApiError> {
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    match body.get("success").and_then(Value::as_bool) {
        Some(false) => Err(ApiError::ActionRejected {
            message: message
                .or_else(|| error_message(body))
                .unwrap_or_else(|| "request rejected".to_string()),
        }),
        _ => Ok(ActionOutcome { message }),
    }
}

/// Extract a message from `{ message }` or `{ error: { message } }` bodies.
fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("message"))
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_ERROR_BODY {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(MAX_ERROR_BODY).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn api(base: &str) -> HttpMiningApi {
        HttpMiningApi::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = api("http://localhost:1337/api/");
        assert_eq!(
            api.endpoint(&["mining", "start", "7"]).unwrap().as_str(),
            "http://localhost:1337/api/mining/start/7"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = api("http://localhost:1337/api");
        assert_eq!(
            api.endpoint(&["mining", "stop", "a/b c"]).unwrap().as_str(),
            "http://localhost:1337/api/mining/stop/a%2Fb%20c"
        );
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            HttpMiningApi::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpMiningApi::new("mailto:someone@example.org", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_parse_envelope_success() {
        let outcome = parse_envelope(&json!({ "success": true, "message": "Mining started" })).unwrap();
        assert_eq!(outcome.message.as_deref(), Some("Mining started"));
        assert!(parse_envelope(&json!({})).is_ok());
    }

    #[test]
    fn test_parse_envelope_rejection() {
        let err = parse_envelope(&json!({ "success": false, "message": "Already mining" })).unwrap_err();
        assert!(matches!(err, ApiError::ActionRejected { ref message } if message == "Already mining"));

        let err = parse_envelope(&json!({ "success": false })).unwrap_err();
        assert_eq!(err.to_string(), "Request rejected: request rejected");
    }

    #[test]
    fn test_error_message_prefers_nested_error() {
        let body = json!({ "error": { "message": "Forbidden college" }, "message": "outer" });
        assert_eq!(error_message(&body).as_deref(), Some("Forbidden college"));
    }

    #[test]
    fn test_truncate_body_limits_length() {
        let long = "x".repeat(500);
        let cut = truncate_body(&long);
        assert_eq!(cut.len(), MAX_ERROR_BODY + 3);
        assert_eq!(truncate_body("  short  "), "short");
    }
}
