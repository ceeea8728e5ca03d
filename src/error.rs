//! Error types
//!
//! Every failure a lifecycle call can hit. Nothing here is retried; the
//! host surfaces the error whole and aborts the current step.

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the client, the posture cache and the reconciler
#[derive(Debug, Error)]
pub enum Error {
    /// Host and/or token unset after merging configuration and environment
    #[error("missing configuration: {}", missing_names(.0))]
    MissingConfig(Vec<MissingSetting>),

    #[error("invalid Boost API host '{host}': {source}")]
    InvalidHost {
        host: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,

    #[error("failed to send request: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer, with the start of the response body
    #[error("API request failed: {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The GraphQL layer answered with an `errors` array or without data
    #[error("GraphQL error in {operation}: {message}")]
    GraphQl {
        operation: &'static str,
        message: String,
    },

    #[error("failed to parse {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed response whose payload says the operation itself failed
    #[error("provision plan rejected:\n{0}")]
    Operation(String),

    #[error("could not find asset {0}. Make sure the asset is managed by an integration")]
    AssetNotFound(String),

    #[error("scanners not available for asset {asset}: {}", .scanners.join(", "))]
    ScannersUnavailable { asset: String, scanners: Vec<String> },
}

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// A configuration setting that could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSetting {
    Host,
    Token,
}

impl MissingSetting {
    pub fn name(self) -> &'static str {
        match self {
            MissingSetting::Host => "host",
            MissingSetting::Token => "token",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            MissingSetting::Host => crate::config::HOST_ENV,
            MissingSetting::Token => crate::config::TOKEN_ENV,
        }
    }
}

fn missing_names(missing: &[MissingSetting]) -> String {
    missing
        .iter()
        .map(|m| m.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// User-facing diagnostic, one per reportable problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    fn new(summary: &str, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.to_string(),
            detail: detail.into(),
        }
    }
}

impl Error {
    /// Render this error as diagnostics for the operator
    ///
    /// Unavailable scanners yield one diagnostic per scanner, missing
    /// configuration one per setting. Everything else is a single entry.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::MissingConfig(missing) => missing
                .iter()
                .map(|m| {
                    Diagnostic::new(
                        &format!("Missing Boost API {}", m.name()),
                        format!(
                            "Set the {} value in the configuration or use the {} environment \
                             variable. If either is already set, ensure the value is not empty.",
                            m.name(),
                            m.env_var()
                        ),
                    )
                })
                .collect(),
            Error::ScannersUnavailable { scanners, .. } => scanners
                .iter()
                .map(|s| {
                    Diagnostic::new(
                        "Scanner not available for asset",
                        format!("Scanner not available for asset : {}", s),
                    )
                })
                .collect(),
            Error::AssetNotFound(_) => {
                vec![Diagnostic::new("Error finding asset in cache", self.to_string())]
            }
            Error::Operation(_) => vec![Diagnostic::new("Error applying plan", self.to_string())],
            _ => vec![Diagnostic::new("Boost API error", self.to_string())],
        }
    }
}
