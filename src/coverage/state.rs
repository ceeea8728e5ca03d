//! Declared and persisted scanner coverage state

use crate::boost::model::AssetKind;
use crate::posture::AssetRef;
use serde::{Deserialize, Serialize};

/// State document of one `boostsecurity_fortify` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageState {
    pub asset: AssetModel,
}

/// The nested `asset` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetModel {
    pub provider: String,
    pub collection: String,
    #[serde(default)]
    pub resource: Option<String>,
    /// Opaque id, filled in after resolution
    #[serde(default)]
    pub id: Option<String>,
    pub scanners: Vec<String>,
    #[serde(default)]
    pub policy: Option<String>,
    /// Policy the API reports as assigned
    #[serde(default)]
    pub assigned_policy: Option<String>,
}

impl CoverageState {
    pub fn new(asset: AssetModel) -> Self {
        Self { asset }
    }
}

impl AssetModel {
    /// Declared asset with nothing computed yet
    pub fn declare(asset: AssetRef, scanners: Vec<String>, policy: Option<String>) -> Self {
        Self {
            provider: asset.provider,
            collection: asset.collection,
            resource: asset.resource,
            id: None,
            scanners,
            policy,
            assigned_policy: None,
        }
    }

    pub fn reference(&self) -> AssetRef {
        AssetRef {
            provider: self.provider.clone(),
            collection: self.collection.clone(),
            resource: self.resource.clone(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        AssetKind::for_resource_name(self.resource.as_deref())
    }

    /// Declared policy id, empty when none is declared
    pub fn desired_policy(&self) -> &str {
        self.policy.as_deref().unwrap_or("")
    }

    /// Whether creating this asset needs a provision plan at all
    pub fn declares_anything(&self) -> bool {
        self.policy.is_some() || !self.scanners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let state: CoverageState = serde_json::from_str(
            r#"{"asset": {"provider": "github", "collection": "org1", "scanners": ["sast"]}}"#,
        )
        .unwrap();
        assert_eq!(state.asset.resource, None);
        assert_eq!(state.asset.id, None);
        assert_eq!(state.asset.kind(), AssetKind::Collection);
        assert_eq!(state.asset.desired_policy(), "");
        assert!(state.asset.declares_anything());
    }

    #[test]
    fn test_parse_yaml_document() {
        let state: CoverageState = serde_yaml::from_str(
            "asset:\n  provider: github\n  collection: org1\n  resource: api\n  scanners: []\n  policy: strict\n",
        )
        .unwrap();
        assert_eq!(state.asset.kind(), AssetKind::Resource);
        assert_eq!(state.asset.reference(), AssetRef::resource("github", "org1", "api"));
        assert_eq!(state.asset.desired_policy(), "strict");
    }

    #[test]
    fn test_nothing_declared() {
        let asset = AssetModel::declare(AssetRef::collection("github", "org1"), vec![], None);
        assert!(!asset.declares_anything());
    }

    #[test]
    fn test_missing_scanners_is_rejected() {
        let result: Result<CoverageState, _> =
            serde_json::from_str(r#"{"asset": {"provider": "github", "collection": "org1"}}"#);
        assert!(result.is_err());
    }
}
