//! Wire types shared by the Boost queries and mutations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Level an asset lives at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetKind {
    /// An organization, called a collection by the API
    Collection,
    /// A resource inside a collection
    Resource,
}

impl AssetKind {
    /// Kind implied by whether the reference names a resource
    pub fn for_resource_name(resource: Option<&str>) -> Self {
        match resource {
            Some(_) => AssetKind::Resource,
            None => AssetKind::Collection,
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Collection => write!(f, "collection"),
            AssetKind::Resource => write!(f, "resource"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionType {
    Asset,
}

/// Selects the assets a provision plan applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSelection {
    pub selection_type: SelectionType,
    pub asset_ids: Vec<String>,
    pub asset_type: AssetKind,
}

impl AssetSelection {
    /// Selection of a single asset by opaque id
    pub fn single(asset_id: &str, kind: AssetKind) -> Self {
        Self {
            selection_type: SelectionType::Asset,
            asset_ids: vec![asset_id.to_string()],
            asset_type: kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationAction {
    Apply,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerOperation {
    pub action: OperationAction,
    pub scanner_id: String,
}

impl ScannerOperation {
    /// Apply operations for `apply` followed by clear operations for `clear`
    pub fn batch(apply: &[String], clear: &[String]) -> Vec<Self> {
        let applies = apply.iter().map(|id| ScannerOperation {
            action: OperationAction::Apply,
            scanner_id: id.clone(),
        });
        let clears = clear.iter().map(|id| ScannerOperation {
            action: OperationAction::Clear,
            scanner_id: id.clone(),
        });
        applies.chain(clears).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOperation {
    pub action: OperationAction,
    pub policy_id: String,
}

impl PolicyOperation {
    /// An empty policy id clears the assignment, anything else applies it
    pub fn for_policy(policy_id: &str) -> Self {
        let action = if policy_id.is_empty() {
            OperationAction::Clear
        } else {
            OperationAction::Apply
        };
        Self {
            action,
            policy_id: policy_id.to_string(),
        }
    }
}

/// Per-scanner provisioning status on a posture node
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningState {
    Provisioned,
    #[serde(other)]
    Other,
}

/// Whether a scanner can be assigned to an asset
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScannerAvailability {
    Available,
    #[serde(other)]
    Unavailable,
}

/// Payload of `applyProvisionPlan`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "__typename")]
pub enum ApplyOutcome {
    /// The API refused the operation
    OperationError(OperationError),
    #[serde(other)]
    Applied,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}
