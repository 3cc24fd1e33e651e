// crates/truth-gate-inference/src/http.rs
// ============================================================================
// Module: HTTP Strategy Advisor
// Description: Bounded HTTP client for an external inference endpoint.
// Purpose: Fetch schema-validated strategy advice with strict limits.
// Dependencies: jsonschema, reqwest, serde_json, truth-gate-core, url
// ============================================================================

//! ## Overview
//! The HTTP advisor POSTs the strategy context to a configured endpoint and
//! expects a JSON body matching the advice schema. It enforces scheme
//! restrictions, an optional host allowlist, redirects disabled, and a hard
//! response size limit. Every failure maps to [`InferenceError`]; the
//! decision engine converts that into the static fallback, so a hostile or
//! broken endpoint can never stall or steer an audit beyond advice.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::io::Read;
use std::time::Duration;

use jsonschema::Validator;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde_json::Value;
use serde_json::json;
use url::Url;

use truth_gate_core::InferenceError;
use truth_gate_core::StrategyAdvice;
use truth_gate_core::StrategyAdvisor;
use truth_gate_core::StrategyContext;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the HTTP advisor.
///
/// # Invariants
/// - `allow_http = false` blocks cleartext `http://` endpoints.
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - If `allowed_hosts` is set, only listed hosts are permitted.
/// - `timeout_ms` applies to the full request lifecycle and should sit
///   below the decision engine's consultation deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpAdvisorConfig {
    /// Inference endpoint URL.
    pub endpoint: Url,
    /// Allow cleartext HTTP (disabled by default).
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// Optional host allowlist.
    pub allowed_hosts: Option<BTreeSet<String>>,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl HttpAdvisorConfig {
    /// Creates a configuration with default limits for an endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            allow_http: false,
            timeout_ms: 1_500,
            max_response_bytes: 64 * 1024,
            allowed_hosts: None,
            user_agent: "truth-gate/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Advice Schema
// ============================================================================

/// JSON schema every advice response must satisfy before deserialization.
fn advice_schema() -> Value {
    json!({
        "type": "object",
        "required": ["recommended_weights", "risk_score"],
        "additionalProperties": false,
        "properties": {
            "recommended_weights": {
                "type": "object",
                "additionalProperties": { "type": "number" }
            },
            "risk_score": { "type": "number" }
        }
    })
}

// ============================================================================
// SECTION: Advisor
// ============================================================================

/// Strategy advisor backed by an external HTTP inference endpoint.
///
/// # Invariants
/// - Redirects are never followed.
/// - Responses exceeding configured limits fail closed.
pub struct HttpAdvisor {
    /// Advisor configuration, including limits and policy.
    config: HttpAdvisorConfig,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Compiled advice response schema.
    schema: Validator,
}

impl HttpAdvisor {
    /// Creates an advisor, validating endpoint policy up front.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::Unavailable`] when the endpoint violates
    /// policy or the HTTP client cannot be built.
    pub fn new(config: HttpAdvisorConfig) -> Result<Self, InferenceError> {
        validate_endpoint(&config)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|_| InferenceError::Unavailable("http client build failed".to_string()))?;
        let schema = jsonschema::validator_for(&advice_schema())
            .map_err(|err| InferenceError::Unavailable(format!("schema compile failed: {err}")))?;
        Ok(Self {
            config,
            client,
            schema,
        })
    }
}

impl StrategyAdvisor for HttpAdvisor {
    fn advise(&self, ctx: &StrategyContext) -> Result<StrategyAdvice, InferenceError> {
        let body = serde_json::to_vec(ctx)
            .map_err(|err| InferenceError::Unavailable(format!("context encode failed: {err}")))?;
        let response = self
            .client
            .post(self.config.endpoint.as_str())
            .header("content-type", "application/json")
            .body(body)
            .send()
            .map_err(|err| InferenceError::Unavailable(err.to_string()))?;
        if response.url() != &self.config.endpoint {
            return Err(InferenceError::Unavailable("redirect not allowed".to_string()));
        }
        if !response.status().is_success() {
            return Err(InferenceError::Unavailable(format!(
                "endpoint returned {}",
                response.status()
            )));
        }
        let body = read_limited(response, self.config.max_response_bytes)?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|err| InferenceError::InvalidResponse(err.to_string()))?;
        if let Err(err) = self.schema.validate(&value) {
            return Err(InferenceError::InvalidResponse(err.to_string()));
        }
        let advice: StrategyAdvice = serde_json::from_value(value)
            .map_err(|err| InferenceError::InvalidResponse(err.to_string()))?;
        if !advice.is_valid() {
            return Err(InferenceError::InvalidResponse(
                "advice values out of range".to_string(),
            ));
        }
        Ok(advice)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates endpoint scheme, credentials, and allowlist policy.
fn validate_endpoint(config: &HttpAdvisorConfig) -> Result<(), InferenceError> {
    let url = &config.endpoint;
    match url.scheme() {
        "https" => {}
        "http" if config.allow_http => {}
        _ => {
            return Err(InferenceError::Unavailable("unsupported url scheme".to_string()));
        }
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(InferenceError::Unavailable(
            "url credentials are not allowed".to_string(),
        ));
    }
    if let Some(allowlist) = &config.allowed_hosts {
        let host = url
            .host_str()
            .ok_or_else(|| InferenceError::Unavailable("url host required".to_string()))?
            .to_ascii_lowercase();
        let allowed = allowlist.iter().any(|entry| entry.to_ascii_lowercase() == host);
        if !allowed {
            return Err(InferenceError::Unavailable("url host not allowed".to_string()));
        }
    }
    Ok(())
}

/// Reads the response body while enforcing a byte limit.
fn read_limited(
    response: reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, InferenceError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| InferenceError::InvalidResponse("size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(InferenceError::InvalidResponse(
            "response exceeds size limit".to_string(),
        ));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle
        .read_to_end(&mut buf)
        .map_err(|_| InferenceError::Unavailable("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(InferenceError::InvalidResponse(
            "response exceeds size limit".to_string(),
        ));
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
