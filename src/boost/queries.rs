//! GraphQL operations consumed from the Boost API
//!
//! Operation documents, their variables and the response shapes they decode
//! into. Connections follow the relay layout (`edges { node }` plus
//! `pageInfo`).

use super::model::{
    ApplyOutcome, AssetSelection, PolicyOperation, ProvisioningState, ScannerAvailability,
    ScannerOperation,
};
use serde::{Deserialize, Serialize};

/// Items requested per connection page
pub const PAGE_SIZE: u32 = 100;

pub const SECURITY_POSTURE: &str = "SecurityPosture";
pub const PROVIDER_COLLECTIONS: &str = "ProviderCollections";
pub const PROVIDER_COLLECTION: &str = "ProviderCollection";
pub const PROVISION_PLAN: &str = "ProvisionPlan";
pub const APPLY_PROVISION_PLAN: &str = "ApplyProvisionPlan";

pub const SECURITY_POSTURE_QUERY: &str = r#"
query SecurityPosture {
  securityPosture {
    providers {
      edges {
        node {
          providerId
          name
        }
      }
    }
  }
}
"#;

pub const PROVIDER_COLLECTIONS_QUERY: &str = r#"
query ProviderCollections($providerId: String!, $first: Int!, $after: String) {
  provider(providerId: $providerId) {
    collections(first: $first, after: $after) {
      edges {
        node {
          collectionId
          name
          scanners {
            scannerId
            state
          }
          policy {
            policyId
          }
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
}
"#;

pub const PROVIDER_COLLECTION_QUERY: &str = r#"
query ProviderCollection($providerId: String!, $collectionId: String!, $first: Int!, $after: String) {
  provider(providerId: $providerId) {
    collection(collectionId: $collectionId) {
      resources(first: $first, after: $after) {
        edges {
          node {
            resourceId
            name
            scanners {
              scannerId
              state
            }
            policy {
              policyId
            }
          }
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
    }
  }
}
"#;

pub const PROVISION_PLAN_QUERY: &str = r#"
query ProvisionPlan($selection: [AssetSelection!]!) {
  provisionPlan(selection: $selection) {
    scanners {
      scannerId
      availability
    }
  }
}
"#;

pub const APPLY_PROVISION_PLAN_MUTATION: &str = r#"
mutation ApplyProvisionPlan(
  $selection: [AssetSelection!]!
  $scanners: [ScannerOperation!]!
  $policy: PolicyOperation!
  $dryRun: Boolean!
) {
  applyProvisionPlan(selection: $selection, scanners: $scanners, policy: $policy, dryRun: $dryRun) {
    __typename
    ... on OperationError {
      errorType
      message
      details
    }
  }
}
"#;

// =========================================================================
// Shared shapes
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
    #[serde(default, rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
}

impl<T> Connection<T> {
    /// Cursor of the next page, if the server reports one
    pub fn next_cursor(&self) -> Option<&str> {
        match &self.page_info {
            Some(info) if info.has_next_page => info.end_cursor.as_deref(),
            _ => None,
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|i| i.has_next_page)
    }
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerState {
    pub scanner_id: String,
    pub state: ProvisioningState,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRef {
    #[serde(default)]
    pub policy_id: Option<String>,
}

/// Ids of scanners currently provisioned, in API order
pub fn provisioned(scanners: &[ScannerState]) -> Vec<String> {
    scanners
        .iter()
        .filter(|s| s.state == ProvisioningState::Provisioned)
        .map(|s| s.scanner_id.clone())
        .collect()
}

/// Policy id, empty when none is assigned
pub fn policy_id(policy: &Option<PolicyRef>) -> String {
    policy
        .as_ref()
        .and_then(|p| p.policy_id.clone())
        .unwrap_or_default()
}

// =========================================================================
// SecurityPosture
// =========================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPostureData {
    pub security_posture: SecurityPostureNode,
}

#[derive(Debug, Deserialize)]
pub struct SecurityPostureNode {
    pub providers: Connection<ProviderNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderNode {
    pub provider_id: String,
    pub name: String,
}

// =========================================================================
// ProviderCollections
// =========================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCollectionsVars<'a> {
    pub provider_id: &'a str,
    pub first: u32,
    pub after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderCollectionsData {
    pub provider: CollectionsHolder,
}

#[derive(Debug, Deserialize)]
pub struct CollectionsHolder {
    pub collections: Connection<CollectionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionNode {
    pub collection_id: String,
    pub name: String,
    #[serde(default)]
    pub scanners: Vec<ScannerState>,
    #[serde(default)]
    pub policy: Option<PolicyRef>,
}

// =========================================================================
// ProviderCollection
// =========================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCollectionVars<'a> {
    pub provider_id: &'a str,
    pub collection_id: &'a str,
    pub first: u32,
    pub after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderCollectionData {
    pub provider: CollectionHolder,
}

#[derive(Debug, Deserialize)]
pub struct CollectionHolder {
    pub collection: ResourcesHolder,
}

#[derive(Debug, Deserialize)]
pub struct ResourcesHolder {
    pub resources: Connection<ResourceNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    pub resource_id: String,
    pub name: String,
    #[serde(default)]
    pub scanners: Vec<ScannerState>,
    #[serde(default)]
    pub policy: Option<PolicyRef>,
}

// =========================================================================
// ProvisionPlan
// =========================================================================

#[derive(Debug, Serialize)]
pub struct ProvisionPlanVars {
    pub selection: Vec<AssetSelection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionPlanData {
    pub provision_plan: ProvisionPlanNode,
}

#[derive(Debug, Deserialize)]
pub struct ProvisionPlanNode {
    #[serde(default)]
    pub scanners: Vec<PlanScanner>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanScanner {
    pub scanner_id: String,
    pub availability: ScannerAvailability,
}

// =========================================================================
// ApplyProvisionPlan
// =========================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyProvisionPlanVars {
    pub selection: Vec<AssetSelection>,
    pub scanners: Vec<ScannerOperation>,
    pub policy: PolicyOperation,
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyProvisionPlanData {
    pub apply_provision_plan: ApplyOutcome,
}
