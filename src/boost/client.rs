//! Posture Client
//!
//! Reads the tenant's posture and drives provision plans through the Boost
//! GraphQL API. Every call is a single request/response; nothing is retried.

use super::http::GraphQlHttpClient;
use super::model::{
    ApplyOutcome, AssetKind, AssetSelection, PolicyOperation, ScannerAvailability,
    ScannerOperation,
};
use super::queries::{self, Connection, PAGE_SIZE};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::posture::{Organization, PostureTree, Provider, Resource};
use std::collections::HashSet;

/// Client for the Boost posture API
#[derive(Clone)]
pub struct PostureClient {
    http: GraphQlHttpClient,
}

impl PostureClient {
    /// Create a client from resolved settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = GraphQlHttpClient::new(settings.host.clone(), &settings.token)?;
        Ok(Self { http })
    }

    /// Read providers, their collections and the collections' resources
    ///
    /// Any failing query aborts the whole read.
    pub async fn fetch_posture(&self) -> Result<PostureTree> {
        let data: queries::SecurityPostureData = self
            .http
            .execute(
                queries::SECURITY_POSTURE,
                queries::SECURITY_POSTURE_QUERY,
                &serde_json::json!({}),
            )
            .await?;

        let mut tree = PostureTree::default();
        for edge in data.security_posture.providers.edges {
            let node = edge.node;
            let organizations = self.fetch_collections(&node.provider_id).await?;
            tree.providers.push(Provider {
                name: node.name,
                id: node.provider_id,
                organizations: organizations.into_iter().collect(),
            });
        }

        Ok(tree)
    }

    async fn fetch_collections(&self, provider_id: &str) -> Result<Vec<Organization>> {
        let mut organizations = Vec::new();
        let mut listed = HashSet::new();
        let mut pager = Pager::new(provider_id);

        loop {
            let vars = queries::ProviderCollectionsVars {
                provider_id,
                first: PAGE_SIZE,
                after: pager.cursor(),
            };
            let data: queries::ProviderCollectionsData = self
                .http
                .execute(
                    queries::PROVIDER_COLLECTIONS,
                    queries::PROVIDER_COLLECTIONS_QUERY,
                    &vars,
                )
                .await?;
            let page = data.provider.collections;
            let more = pager.advance(&page);

            for edge in page.edges {
                let node = edge.node;
                if !listed.insert(node.collection_id.clone()) {
                    tracing::debug!("Skipping collection {} listed twice", node.collection_id);
                    continue;
                }
                let resources = self
                    .fetch_resources(provider_id, &node.collection_id)
                    .await?;
                organizations.push(Organization {
                    scanners: queries::provisioned(&node.scanners),
                    policy: queries::policy_id(&node.policy),
                    name: node.name,
                    id: node.collection_id,
                    resources: resources.into_iter().collect(),
                });
            }

            if !more {
                break;
            }
        }

        tracing::debug!(
            "Provider {}: {} collections",
            provider_id,
            organizations.len()
        );
        Ok(organizations)
    }

    async fn fetch_resources(
        &self,
        provider_id: &str,
        collection_id: &str,
    ) -> Result<Vec<Resource>> {
        let mut resources = Vec::new();
        let mut listed = HashSet::new();
        let mut pager = Pager::new(collection_id);

        loop {
            let vars = queries::ProviderCollectionVars {
                provider_id,
                collection_id,
                first: PAGE_SIZE,
                after: pager.cursor(),
            };
            let data: queries::ProviderCollectionData = self
                .http
                .execute(
                    queries::PROVIDER_COLLECTION,
                    queries::PROVIDER_COLLECTION_QUERY,
                    &vars,
                )
                .await?;
            let page = data.provider.collection.resources;
            let more = pager.advance(&page);

            for edge in page.edges {
                let node = edge.node;
                if !listed.insert(node.resource_id.clone()) {
                    tracing::debug!("Skipping resource {} listed twice", node.resource_id);
                    continue;
                }
                resources.push(Resource {
                    scanners: queries::provisioned(&node.scanners),
                    policy: queries::policy_id(&node.policy),
                    name: node.name,
                    id: node.resource_id,
                });
            }

            if !more {
                break;
            }
        }

        Ok(resources)
    }

    /// Scanners the API offers for one asset
    pub async fn fetch_available_scanners(
        &self,
        asset_id: &str,
        kind: AssetKind,
    ) -> Result<Vec<String>> {
        let vars = queries::ProvisionPlanVars {
            selection: vec![AssetSelection::single(asset_id, kind)],
        };
        let data: queries::ProvisionPlanData = self
            .http
            .execute(queries::PROVISION_PLAN, queries::PROVISION_PLAN_QUERY, &vars)
            .await?;

        let available: Vec<String> = data
            .provision_plan
            .scanners
            .into_iter()
            .filter(|s| s.availability == ScannerAvailability::Available)
            .map(|s| s.scanner_id)
            .collect();

        tracing::debug!("Asset {} ({}): available scanners {:?}", asset_id, kind, available);
        Ok(available)
    }

    /// Apply a full scanner delta and policy state to one asset
    ///
    /// An empty `policy_id` clears the policy.
    pub async fn apply_change(
        &self,
        asset_id: &str,
        kind: AssetKind,
        policy_id: &str,
        apply: &[String],
        clear: &[String],
    ) -> Result<()> {
        tracing::info!(
            "Applying provision plan to {} ({}): apply={:?} clear={:?} policy={:?}",
            asset_id,
            kind,
            apply,
            clear,
            policy_id
        );

        let vars = queries::ApplyProvisionPlanVars {
            selection: vec![AssetSelection::single(asset_id, kind)],
            scanners: ScannerOperation::batch(apply, clear),
            policy: PolicyOperation::for_policy(policy_id),
            dry_run: false,
        };
        let data: queries::ApplyProvisionPlanData = self
            .http
            .execute(
                queries::APPLY_PROVISION_PLAN,
                queries::APPLY_PROVISION_PLAN_MUTATION,
                &vars,
            )
            .await?;

        match data.apply_provision_plan {
            ApplyOutcome::Applied => Ok(()),
            ApplyOutcome::OperationError(err) => {
                tracing::error!("Provision plan rejected for {}: {:?}", asset_id, err);
                Err(Error::Operation(format!("{:#?}", err)))
            }
        }
    }
}

/// Cursor bookkeeping for one connection
///
/// Every cursor handed out is remembered; a cursor seen before ends paging,
/// whatever the length of the cycle.
struct Pager<'a> {
    parent: &'a str,
    cursor: Option<String>,
    requested: HashSet<String>,
}

impl<'a> Pager<'a> {
    fn new(parent: &'a str) -> Self {
        Self {
            parent,
            cursor: None,
            requested: HashSet::new(),
        }
    }

    /// Cursor for the next request, `None` for the first page
    fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Record the page just fetched; false when paging should stop
    fn advance<T>(&mut self, page: &Connection<T>) -> bool {
        match page.next_cursor() {
            Some(cursor) if self.requested.contains(cursor) => {
                tracing::warn!(
                    "{} returned cursor {:?} a second time; stopping pagination",
                    self.parent,
                    cursor
                );
                false
            }
            Some(cursor) => {
                self.requested.insert(cursor.to_string());
                self.cursor = Some(cursor.to_string());
                true
            }
            None => {
                if page.has_next_page() {
                    tracing::warn!(
                        "{} reports more pages but no end cursor; listing may be incomplete",
                        self.parent
                    );
                }
                false
            }
        }
    }
}
