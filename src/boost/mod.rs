//! Boost API interaction module
//!
//! Everything that talks to the Boost security-posture GraphQL API.
//!
//! # Module Structure
//!
//! - [`client`] - Posture client: posture reads, scanner availability, provision plans
//! - [`http`] - GraphQL transport with API key authentication
//! - [`model`] - Wire enums and operation inputs
//! - [`queries`] - Operation documents and response shapes
//!
//! # Example
//!
//! ```ignore
//! use boostsec::boost::client::PostureClient;
//!
//! async fn example(settings: &boostsec::config::Settings) -> boostsec::Result<()> {
//!     let client = PostureClient::new(settings)?;
//!     let tree = client.fetch_posture().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod model;
pub mod queries;
