//! HTTP transport for the Iugu API
//!
//! Resolves a path against the endpoint template, attaches the default headers,
//! encodes the body (query string for GET, JSON for POST) and decodes the JSON reply.
//! One request per call; nothing is retried.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::{IuguConfig, PATH_PLACEHOLDER};
use crate::error::{IuguError, IuguResult};
use crate::payments::types::GatewayResponse;

/// Headers sent with every request, before per-call extras
pub const DEFAULT_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json; charset=utf-8"),
    ("Accept", "*/*"),
    ("Accept-Language", "pt-br;q=0.9,pt-BR"),
    ("Connection", "keep-alive"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &IuguConfig) -> IuguResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        if config.accept_invalid_certs {
            warn!("Building Iugu transport with TLS certificate verification disabled");
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("iugu-gateway/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| IuguError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout,
        })
    }

    /// Substitutes `path` into the endpoint template. `path` may carry its own query.
    pub fn resolve_url(&self, path: &str) -> IuguResult<Url> {
        if path.trim().is_empty() {
            return Err(IuguError::invalid_request_path(path));
        }

        Url::parse(&self.endpoint.replace(PATH_PLACEHOLDER, path))
            .map_err(|_| IuguError::invalid_request_path(path))
    }

    pub async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: &Value,
        extra_headers: &[(&str, String)],
    ) -> IuguResult<GatewayResponse> {
        let mut url = self.resolve_url(path)?;

        if method == HttpMethod::Get {
            let pairs = query_pairs(body);
            if !pairs.is_empty() {
                url.query_pairs_mut().extend_pairs(pairs);
            }
        }

        debug!("Sending {:?} request to {}", method, url.path());

        let mut request = self.client.request(method.into(), url.clone());
        for (name, value) in DEFAULT_HEADERS {
            request = request.header(name, value);
        }
        for (name, value) in extra_headers {
            request = request.header(*name, value.as_str());
        }
        if method == HttpMethod::Post {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.request_error(url.path(), e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.request_error(url.path(), e))?;

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            error!(
                "Failed to parse Iugu response from {} (HTTP {}): {}",
                url.path(),
                status,
                e
            );
            IuguError::serialization(format!("Invalid response format: {}", e))
        })?;

        if status.is_success() {
            debug!("Iugu responded HTTP {} for {}", status, url.path());
        } else {
            warn!("Iugu responded HTTP {} for {}", status, url.path());
        }

        Ok(GatewayResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Maps a reqwest failure without its URL, which may carry the `api_token` query.
    fn request_error(&self, path: &str, err: reqwest::Error) -> IuguError {
        let err = err.without_url();
        error!("Iugu request to {} failed: {}", path, err);
        if err.is_timeout() {
            IuguError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            IuguError::from(err)
        }
    }
}

/// Flattens a JSON object into form pairs: nested objects as `a[b]`, arrays as
/// `a[0]`, booleans as `1`/`0`. Nulls are skipped.
pub fn query_pairs(body: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Value::Object(map) = body {
        for (key, value) in map {
            flatten_into(key.clone(), value, &mut pairs);
        }
    }
    pairs
}

fn flatten_into(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => pairs.push((prefix, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => pairs.push((prefix, n.to_string())),
        Value::String(s) => pairs.push((prefix, s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", prefix, index), item, pairs);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(format!("{}[{}]", prefix, key), item, pairs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport() -> HttpTransport {
        HttpTransport::new(&IuguConfig::new("acc", "t", "p")).unwrap()
    }

    #[test]
    fn test_resolve_url_substitutes_path() {
        let url = transport().resolve_url("invoices?api_token=abc").unwrap();
        assert_eq!(url.as_str(), "https://api.iugu.com/v1/invoices?api_token=abc");

        let url = transport().resolve_url("acc123/api_tokens").unwrap();
        assert_eq!(url.path(), "/v1/acc123/api_tokens");
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(matches!(
            transport().resolve_url(""),
            Err(IuguError::InvalidRequestPath { .. })
        ));
        assert!(transport().resolve_url("   ").is_err());
    }

    #[test]
    fn test_query_pairs_follow_form_conventions() {
        let pairs = query_pairs(&json!({
            "limit": 10,
            "active": true,
            "skip": null,
            "filter": {"status": "paid"},
            "ids": ["a", "b"]
        }));
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("active".to_string(), "1".to_string()),
                ("filter[status]".to_string(), "paid".to_string()),
                ("ids[0]".to_string(), "a".to_string()),
                ("ids[1]".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_ignore_non_objects() {
        assert!(query_pairs(&json!([])).is_empty());
        assert!(query_pairs(&Value::Null).is_empty());
    }
}
