//! Resource schema
//!
//! Describes the provider configuration and the `boostsecurity_fortify`
//! resource the way a host orchestrator validates them.

use serde::Serialize;

/// Provider type name
pub const PROVIDER_TYPE: &str = "boostsecurity";
/// Resource type managed by this crate
pub const RESOURCE_TYPE: &str = "boostsecurity_fortify";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    List(ElementType),
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Required,
    Optional,
    Computed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub mode: Mode,
    /// Never echoed back in output or logs
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    /// Keep the prior state's value while the plan leaves it unknown
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_state_for_unknown: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl Attribute {
    fn new(name: &'static str, description: &'static str, kind: AttributeType, mode: Mode) -> Self {
        Self {
            name,
            description,
            kind,
            mode,
            sensitive: false,
            use_state_for_unknown: false,
            attributes: Vec::new(),
        }
    }

    fn string(name: &'static str, description: &'static str, mode: Mode) -> Self {
        Self::new(name, description, AttributeType::String, mode)
    }

    fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    fn use_state_for_unknown(mut self) -> Self {
        self.use_state_for_unknown = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub type_name: &'static str,
    pub description: &'static str,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Provider-level configuration
pub fn provider_schema() -> Schema {
    Schema {
        type_name: PROVIDER_TYPE,
        description: "Interact with Boostsecurity.",
        attributes: vec![
            Attribute::string("host", "URI for Boost API.", Mode::Optional),
            Attribute::string("token", "API token for Boost API.", Mode::Optional).sensitive(),
        ],
    }
}

/// Scanner coverage resource
pub fn resource_schema() -> Schema {
    let asset = Attribute {
        attributes: vec![
            Attribute::string("provider", "The provider of the resource.", Mode::Required),
            Attribute::string("collection", "The collection of the resource.", Mode::Required),
            Attribute::string("resource", "The name of the resource.", Mode::Optional),
            Attribute::string("id", "The ID of the resource.", Mode::Computed)
                .use_state_for_unknown(),
            Attribute::new(
                "scanners",
                "List of scanners for the asset.",
                AttributeType::List(ElementType::String),
                Mode::Required,
            ),
            Attribute::string("policy", "The policy of the asset.", Mode::Optional),
            Attribute::string(
                "assigned_policy",
                "The policy currently assigned to the asset.",
                Mode::Computed,
            ),
        ],
        ..Attribute::new("asset", "An asset", AttributeType::Object, Mode::Required)
    };

    Schema {
        type_name: RESOURCE_TYPE,
        description: "Manages Scanner coverage.",
        attributes: vec![asset],
    }
}
