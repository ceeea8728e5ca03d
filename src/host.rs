//! Host layer
//!
//! Drives one lifecycle call: builds a fresh posture cache, hands it to the
//! reconciler and drops it when the call returns. Nothing is shared between
//! calls.

use crate::boost::client::PostureClient;
use crate::config::Settings;
use crate::coverage::{CoverageState, ScannerCoverage};
use crate::error::Result;
use crate::posture::{PostureCache, PostureTree};

/// One lifecycle invocation and its inputs
#[derive(Debug, Clone)]
pub enum Lifecycle {
    /// Validate a plan before apply; `plan: None` means destroy
    Plan {
        prior: Option<CoverageState>,
        plan: Option<CoverageState>,
    },
    Create { plan: CoverageState },
    Read { state: CoverageState },
    Update {
        prior: CoverageState,
        plan: CoverageState,
    },
    Delete { state: CoverageState },
}

impl Lifecycle {
    pub fn verb(&self) -> &'static str {
        match self {
            Lifecycle::Plan { .. } => "plan",
            Lifecycle::Create { .. } => "create",
            Lifecycle::Read { .. } => "read",
            Lifecycle::Update { .. } => "update",
            Lifecycle::Delete { .. } => "delete",
        }
    }
}

/// Configured provider, ready to serve lifecycle calls
pub struct Host {
    client: PostureClient,
    coverage: ScannerCoverage,
}

impl Host {
    /// Build the API client from resolved settings
    pub fn configure(settings: &Settings) -> Result<Self> {
        tracing::info!("Configuring Boost client for {}", settings.host);
        let client = PostureClient::new(settings)?;
        let coverage = ScannerCoverage::new(client.clone());
        Ok(Self { client, coverage })
    }

    /// Run one lifecycle call against a freshly built cache
    ///
    /// Returns the new state, or `None` when the call leaves no state
    /// behind (delete, or a destroy plan).
    pub async fn run(&self, call: Lifecycle) -> Result<Option<CoverageState>> {
        tracing::debug!("Lifecycle call: {}", call.verb());
        let cache = PostureCache::build(&self.client).await?;

        match call {
            Lifecycle::Plan { prior, plan } => {
                self.coverage
                    .modify_plan(&cache, prior.as_ref(), plan)
                    .await
            }
            Lifecycle::Create { plan } => self.coverage.create(&cache, plan).await.map(Some),
            Lifecycle::Read { state } => self.coverage.read(&cache, state).await.map(Some),
            Lifecycle::Update { prior, plan } => self
                .coverage
                .update(&cache, &prior, plan)
                .await
                .map(Some),
            Lifecycle::Delete { state } => {
                self.coverage.delete(&cache, &state).await?;
                Ok(None)
            }
        }
    }

    /// Full posture listing
    pub async fn posture(&self) -> Result<PostureTree> {
        Ok(PostureCache::build(&self.client).await?.into_tree())
    }
}
