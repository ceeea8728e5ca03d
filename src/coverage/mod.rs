//! Scanner coverage reconciler
//!
//! Lifecycle handlers for the `boostsecurity_fortify` resource. Each handler
//! receives the posture cache built for its call, resolves the declared
//! asset, validates the declared scanners and, where the verb calls for it,
//! sends one provision plan carrying the full scanner delta and policy.
//!
//! | Verb | Mutation |
//! |------|----------|
//! | plan | none, validation only |
//! | create | apply declared scanners and policy |
//! | read | none, refreshes computed fields |
//! | update | apply planned scanners, clear the dropped ones |
//! | delete | clear declared scanners and the policy |

pub mod state;

use crate::boost::client::PostureClient;
use crate::error::{Error, Result};
use crate::posture::{AssetRef, PostureCache, ResolvedAsset};
use std::collections::HashSet;
pub use state::{AssetModel, CoverageState};

/// Scanners in `previous` that are no longer `planned`
///
/// Keeps the order of `previous` and drops duplicates.
pub fn scanners_to_clear(previous: &[String], planned: &[String]) -> Vec<String> {
    let planned: HashSet<&str> = planned.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    previous
        .iter()
        .filter(|s| !planned.contains(s.as_str()) && seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Desired scanners absent from the availability list
///
/// Keeps declared order and drops duplicates.
pub fn missing_scanners(desired: &[String], available: &[String]) -> Vec<String> {
    let available: HashSet<&str> = available.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    desired
        .iter()
        .filter(|s| !available.contains(s.as_str()) && seen.insert(s.as_str()))
        .cloned()
        .collect()
}

/// Reconciler for declared scanner coverage
#[derive(Clone)]
pub struct ScannerCoverage {
    client: PostureClient,
}

impl ScannerCoverage {
    pub fn new(client: PostureClient) -> Self {
        Self { client }
    }

    /// Check every declared scanner is offered for the asset
    async fn validate_scanners(
        &self,
        asset: &AssetRef,
        resolved: &ResolvedAsset,
        desired: &[String],
    ) -> Result<()> {
        if desired.is_empty() {
            return Ok(());
        }
        tracing::debug!("Validating scanners {:?} for {}", desired, asset);

        let available = self
            .client
            .fetch_available_scanners(&resolved.id, resolved.kind)
            .await?;
        let missing = missing_scanners(desired, &available);
        if missing.is_empty() {
            return Ok(());
        }

        tracing::warn!("Scanners not available for {}: {:?}", asset, missing);
        Err(Error::ScannersUnavailable {
            asset: asset.to_string(),
            scanners: missing,
        })
    }

    /// Validate a planned state before apply
    ///
    /// A `None` plan is a destroy and passes through untouched. The computed
    /// id is kept from the prior state while the plan leaves it unknown.
    pub async fn modify_plan(
        &self,
        cache: &PostureCache,
        prior: Option<&CoverageState>,
        plan: Option<CoverageState>,
    ) -> Result<Option<CoverageState>> {
        let Some(mut plan) = plan else {
            return Ok(None);
        };

        let asset = plan.asset.reference();
        let resolved = cache.resolve(&asset)?;
        self.validate_scanners(&asset, &resolved, &plan.asset.scanners)
            .await?;

        if plan.asset.id.is_none() {
            plan.asset.id = prior
                .filter(|p| p.asset.reference() == asset)
                .and_then(|p| p.asset.id.clone());
        }

        Ok(Some(plan))
    }

    pub async fn create(
        &self,
        cache: &PostureCache,
        mut plan: CoverageState,
    ) -> Result<CoverageState> {
        let asset = plan.asset.reference();
        tracing::info!("Creating scanner coverage for {}", asset);

        let resolved = cache.resolve(&asset)?;
        self.validate_scanners(&asset, &resolved, &plan.asset.scanners)
            .await?;

        let assigned_policy = if plan.asset.declares_anything() {
            let policy = plan.asset.desired_policy().to_string();
            self.client
                .apply_change(&resolved.id, resolved.kind, &policy, &plan.asset.scanners, &[])
                .await?;
            policy
        } else {
            resolved.assigned_policy.clone()
        };

        plan.asset.id = Some(resolved.id);
        plan.asset.assigned_policy = Some(assigned_policy);
        Ok(plan)
    }

    /// Refresh computed fields from the cache
    ///
    /// Drift is reported, not corrected.
    pub async fn read(
        &self,
        cache: &PostureCache,
        mut state: CoverageState,
    ) -> Result<CoverageState> {
        let asset = state.asset.reference();
        tracing::debug!("Reading scanner coverage for {}", asset);

        let snapshot = cache.resolve_full(&asset)?;

        let declared: HashSet<&str> = state.asset.scanners.iter().map(String::as_str).collect();
        let provisioned: HashSet<&str> = snapshot.scanners.iter().map(String::as_str).collect();
        if declared != provisioned {
            tracing::warn!(
                "Scanner drift on {}: declared {:?}, provisioned {:?}",
                asset,
                state.asset.scanners,
                snapshot.scanners
            );
        }
        if let Some(policy) = &state.asset.policy {
            if *policy != snapshot.policy {
                tracing::warn!(
                    "Policy drift on {}: declared {:?}, assigned {:?}",
                    asset,
                    policy,
                    snapshot.policy
                );
            }
        }

        state.asset.id = Some(snapshot.id);
        state.asset.assigned_policy = Some(snapshot.policy);
        Ok(state)
    }

    /// Move an asset from `prior` to `plan`
    ///
    /// When the plan targets a different asset, the prior one is cleared
    /// entirely and the new one receives the full planned set.
    pub async fn update(
        &self,
        cache: &PostureCache,
        prior: &CoverageState,
        mut plan: CoverageState,
    ) -> Result<CoverageState> {
        let previous_asset = prior.asset.reference();
        let asset = plan.asset.reference();
        tracing::info!("Updating scanner coverage for {}", asset);

        let previous = cache.resolve(&previous_asset)?;
        let resolved = cache.resolve(&asset)?;
        self.validate_scanners(&asset, &resolved, &plan.asset.scanners)
            .await?;

        let to_clear = if previous.id == resolved.id {
            scanners_to_clear(&prior.asset.scanners, &plan.asset.scanners)
        } else {
            tracing::info!("Asset moved from {} to {}", previous_asset, asset);
            self.client
                .apply_change(&previous.id, previous.kind, "", &[], &prior.asset.scanners)
                .await?;
            Vec::new()
        };

        let policy = plan.asset.desired_policy().to_string();
        self.client
            .apply_change(&resolved.id, resolved.kind, &policy, &plan.asset.scanners, &to_clear)
            .await?;

        plan.asset.id = Some(resolved.id);
        plan.asset.assigned_policy = Some(policy);
        Ok(plan)
    }

    /// Clear every declared scanner and the policy
    ///
    /// Uses the persisted id when there is one, otherwise resolves it.
    pub async fn delete(&self, cache: &PostureCache, state: &CoverageState) -> Result<()> {
        let asset = state.asset.reference();
        tracing::info!("Deleting scanner coverage for {}", asset);

        let id = match &state.asset.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => cache.resolve(&asset)?.id,
        };

        self.client
            .apply_change(&id, state.asset.kind(), "", &[], &state.asset.scanners)
            .await
    }
}
