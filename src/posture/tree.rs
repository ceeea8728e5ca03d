//! Posture tree
//!
//! Provider → organization (collection) → resource, as returned by one full
//! read of the Boost API. Children keep API order; lookups go through a
//! name index.

use serde::Serialize;
use std::collections::HashMap;

/// Anything addressed by name inside its parent
pub trait Named {
    fn name(&self) -> &str;
}

/// Ordered children with O(1) lookup by name
///
/// When two children share a name the first one wins the lookup; both stay
/// in the listing.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Children<T> {
    items: Vec<T>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl<T> Default for Children<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Named> Children<T> {
    pub fn push(&mut self, item: T) {
        let position = self.items.len();
        self.index.entry(item.name().to_string()).or_insert(position);
        self.items.push(item);
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.items[i])
    }
}

impl<T> Children<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Named> FromIterator<T> for Children<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut children = Self::default();
        for item in iter {
            children.push(item);
        }
        children
    }
}

impl<'a, T> IntoIterator for &'a Children<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Full posture of the tenant
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostureTree {
    pub providers: Children<Provider>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Provider {
    pub name: String,
    pub id: String,
    pub organizations: Children<Organization>,
}

/// A collection in API terms
#[derive(Debug, Clone, Serialize)]
pub struct Organization {
    pub name: String,
    pub id: String,
    /// Scanners currently provisioned
    pub scanners: Vec<String>,
    /// Assigned policy id, empty when none
    pub policy: String,
    pub resources: Children<Resource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub name: String,
    pub id: String,
    pub scanners: Vec<String>,
    pub policy: String,
}

impl Named for Provider {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Organization {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Resource {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PostureTree {
    pub fn provider(&self, name: &str) -> Option<&Provider> {
        self.providers.get(name)
    }

    /// Number of organizations and resources across all providers
    pub fn asset_count(&self) -> usize {
        self.providers
            .iter()
            .flat_map(|p| p.organizations.iter())
            .map(|o| 1 + o.resources.len())
            .sum()
    }
}

impl Provider {
    pub fn organization(&self, name: &str) -> Option<&Organization> {
        self.organizations.get(name)
    }
}

impl Organization {
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }
}
