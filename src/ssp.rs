//! Implementation statements gathered from per-control documents.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// A system component that responds to control statements.
pub struct SystemComponent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl SystemComponent {
    /// Component with an id derived from its title.
    pub fn named(title: &str) -> Self {
        let id = title
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect::<String>();
        Self {
            id: format!("component-{id}"),
            title: title.trim().to_string(),
            description: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// How one control is implemented, statement by statement.
pub struct ImplementedRequirement {
    pub control_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Statement {
    pub statement_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_components: Vec<ByComponent>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ByComponent {
    pub component_id: String,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_component_ids_are_path_safe() {
        let component = SystemComponent::named(" Web Server/Proxy ");
        assert_eq!(component.title, "Web Server/Proxy");
        assert_eq!(component.id, "component-web-server-proxy");
    }
}
