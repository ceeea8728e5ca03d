//! HTTP utilities for GraphQL calls against the Boost API

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Maximum length of response body carried in a status error
const MAX_ERROR_BODY_LENGTH: usize = 2000;

/// Cut `body` to at most `max` bytes on a char boundary
fn truncate_body(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let cut = (0..=max)
        .rev()
        .find(|i| body.is_char_boundary(*i))
        .unwrap_or(0);
    format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
}

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    truncate_body(body, MAX_LOG_BODY_LENGTH)
        .replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

#[derive(Serialize)]
struct GraphQlRequest<'a, V> {
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    query: &'a str,
    variables: &'a V,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    path: Option<Vec<serde_json::Value>>,
}

impl GraphQlError {
    fn describe(&self) -> String {
        match &self.path {
            Some(path) if !path.is_empty() => {
                let rendered: Vec<String> = path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                format!("{} (at {})", self.message, rendered.join("."))
            }
            _ => self.message.clone(),
        }
    }
}

/// GraphQL transport with the API key baked into every request
#[derive(Clone)]
pub struct GraphQlHttpClient {
    client: Client,
    endpoint: Url,
}

impl GraphQlHttpClient {
    /// Create a client for `endpoint` authenticating with `token`
    pub fn new(endpoint: Url, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("ApiKey {}", token))
            .map_err(|_| Error::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(concat!("boostsec/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Execute one GraphQL operation and decode its `data`
    pub async fn execute<V, T>(
        &self,
        operation: &'static str,
        query: &str,
        variables: &V,
    ) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        tracing::debug!("POST {} [{}]", self.endpoint, operation);

        let request = GraphQlRequest {
            operation_name: operation,
            query,
            variables,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::Status {
                status,
                body: truncate_body(body.trim(), MAX_ERROR_BODY_LENGTH),
            });
        }

        // Decode the envelope first so GraphQL errors win over shape mismatches in `data`
        let parsed: GraphQlResponse<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|source| Error::Decode { operation, source })?;

        if !parsed.errors.is_empty() {
            let message = parsed
                .errors
                .iter()
                .map(GraphQlError::describe)
                .collect::<Vec<_>>()
                .join("; ");
            tracing::error!("GraphQL errors in {}: {}", operation, sanitize_for_log(&message));
            return Err(Error::GraphQl { operation, message });
        }

        let data = parsed.data.ok_or_else(|| Error::GraphQl {
            operation,
            message: "response contained no data".to_string(),
        })?;

        serde_json::from_value(data).map_err(|source| Error::Decode { operation, source })
    }
}
