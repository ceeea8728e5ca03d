//! Declarative scanner coverage for BoostSecurity
//!
//! Resolves declared assets against the tenant's security posture, checks
//! the declared scanners are offered for them and reconciles scanner and
//! policy assignments through the Boost GraphQL API.

pub mod boost;
pub mod config;
pub mod coverage;
pub mod error;
pub mod host;
pub mod posture;
pub mod schema;

pub use error::{Diagnostic, Error, Result};

/// Version injected at compile time via BOOSTSEC_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("BOOSTSEC_VERSION") {
    Some(v) => v,
    None => "dev",
};
