use serde::{Deserialize, Serialize};

/// Group class recorded for controls that sit directly under the catalog.
pub const CATALOG_GROUP_CLASS: &str = "catalog";

/// Nearest enclosing group of an indexed control.
///
/// Controls outside any group carry [`GroupContext::catalog_root`]: empty id
/// and title, class `catalog`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupContext {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl GroupContext {
    pub fn catalog_root() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            class: Some(CATALOG_GROUP_CLASS.to_string()),
        }
    }

    pub fn is_catalog_root(&self) -> bool {
        self.id.is_empty()
    }
}

/// Ancestor group ids leading to a control, outermost first.
///
/// Only groups add segments; sub-controls share their parent's path. The
/// single empty segment marks a control held directly by the catalog, so
/// joining the segments onto a root directory lands on that root.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlPath(pub Vec<String>);

impl ControlPath {
    pub fn catalog_root() -> Self {
        Self(vec![String::new()])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Path extended by one nested group.
    pub fn child(&self, group_id: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(group_id.to_string());
        Self(segments)
    }

    /// Innermost non-empty segment, i.e. the id of the owning group.
    pub fn last_group(&self) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .map(String::as_str)
            .find(|segment| !segment.is_empty())
    }
}
