//! Posture cache and asset resolution
//!
//! A [`PostureCache`] is one full read of the tenant's posture, built for a
//! single lifecycle call and dropped with it. Declared assets are resolved
//! against it by exact name.
//!
//! # Module Structure
//!
//! - [`tree`] - The provider → organization → resource tree

pub mod tree;

use crate::boost::client::PostureClient;
use crate::boost::model::AssetKind;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
pub use tree::{Children, Organization, PostureTree, Provider, Resource};

/// Name-based reference to an asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub provider: String,
    pub collection: String,
    /// Absent when the reference denotes the collection itself
    #[serde(default)]
    pub resource: Option<String>,
}

impl AssetRef {
    pub fn collection(provider: &str, collection: &str) -> Self {
        Self {
            provider: provider.to_string(),
            collection: collection.to_string(),
            resource: None,
        }
    }

    pub fn resource(provider: &str, collection: &str, resource: &str) -> Self {
        Self {
            provider: provider.to_string(),
            collection: collection.to_string(),
            resource: Some(resource.to_string()),
        }
    }

    pub fn kind(&self) -> AssetKind {
        AssetKind::for_resource_name(self.resource.as_deref())
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.collection)?;
        if let Some(resource) = &self.resource {
            write!(f, "/{}", resource)?;
        }
        Ok(())
    }
}

/// Identity of a resolved asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub id: String,
    /// Assigned policy id, empty when none
    pub assigned_policy: String,
    pub kind: AssetKind,
}

/// Everything the cache knows about a resolved asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetSnapshot {
    pub provider: String,
    pub collection: String,
    pub resource: Option<String>,
    pub id: String,
    pub kind: AssetKind,
    /// Scanners currently provisioned
    pub scanners: Vec<String>,
    /// Assigned policy id, empty when none
    pub policy: String,
}

enum Node<'a> {
    Organization(&'a Provider, &'a Organization),
    Resource(&'a Provider, &'a Organization, &'a Resource),
}

/// Posture tree owned by one lifecycle call
#[derive(Debug, Clone, Default)]
pub struct PostureCache {
    tree: PostureTree,
}

impl PostureCache {
    /// Read the whole posture from the API
    pub async fn build(client: &PostureClient) -> Result<Self> {
        tracing::debug!("Building posture cache");
        let tree = client.fetch_posture().await?;
        tracing::info!(
            "Posture cache built: {} providers, {} assets",
            tree.providers.len(),
            tree.asset_count()
        );
        Ok(Self { tree })
    }

    pub fn from_tree(tree: PostureTree) -> Self {
        Self { tree }
    }

    pub fn into_tree(self) -> PostureTree {
        self.tree
    }

    fn locate(&self, asset: &AssetRef) -> Option<Node<'_>> {
        let provider = self.tree.provider(&asset.provider)?;
        let organization = provider.organization(&asset.collection)?;
        match &asset.resource {
            None => Some(Node::Organization(provider, organization)),
            Some(name) => organization
                .resource(name)
                .map(|r| Node::Resource(provider, organization, r)),
        }
    }

    /// Resolve a reference to its opaque id and assigned policy
    pub fn resolve(&self, asset: &AssetRef) -> Result<ResolvedAsset> {
        match self.locate(asset) {
            Some(Node::Organization(_, org)) => Ok(ResolvedAsset {
                id: org.id.clone(),
                assigned_policy: org.policy.clone(),
                kind: AssetKind::Collection,
            }),
            Some(Node::Resource(_, _, res)) => Ok(ResolvedAsset {
                id: res.id.clone(),
                assigned_policy: res.policy.clone(),
                kind: AssetKind::Resource,
            }),
            None => Err(Error::AssetNotFound(asset.to_string())),
        }
    }

    /// Resolve a reference to a full snapshot of the node
    pub fn resolve_full(&self, asset: &AssetRef) -> Result<AssetSnapshot> {
        match self.locate(asset) {
            Some(Node::Organization(provider, org)) => Ok(AssetSnapshot {
                provider: provider.name.clone(),
                collection: org.name.clone(),
                resource: None,
                id: org.id.clone(),
                kind: AssetKind::Collection,
                scanners: org.scanners.clone(),
                policy: org.policy.clone(),
            }),
            Some(Node::Resource(provider, org, res)) => Ok(AssetSnapshot {
                provider: provider.name.clone(),
                collection: org.name.clone(),
                resource: Some(res.name.clone()),
                id: res.id.clone(),
                kind: AssetKind::Resource,
                scanners: res.scanners.clone(),
                policy: res.policy.clone(),
            }),
            None => Err(Error::AssetNotFound(asset.to_string())),
        }
    }
}
