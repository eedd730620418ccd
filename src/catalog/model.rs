//! Serializable representation of a control catalog document.
//!
//! The types mirror `schema/catalog.schema.json`: a catalog holds groups and
//! ungrouped controls, groups nest, controls nest inside their own `controls`
//! list, and parts nest inside parts. Absent lists deserialize as empty and
//! empty lists are skipped on output, so the two are treated the same.

use crate::schema_loader::validate_catalog_value;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Root of the document: top-level groups plus controls outside any group.
pub struct Catalog {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uuid: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Named collection of controls and nested sub-groups.
pub struct Group {
    pub id: String,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Requirement entry. Ids are unique across the whole catalog.
pub struct Control {
    pub id: String,
    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Control>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Named block of narrative prose, possibly nested.
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prose: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Placeholder value referenced from a control's prose.
pub struct Parameter {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub props: Vec<Property>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: String,
}

impl Property {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Node kinds that carry an ordered property list.
pub trait HasProperties {
    fn props(&self) -> &[Property];
}

impl HasProperties for Control {
    fn props(&self) -> &[Property] {
        &self.props
    }
}

impl HasProperties for Part {
    fn props(&self) -> &[Property] {
        &self.props
    }
}

impl HasProperties for Group {
    fn props(&self) -> &[Property] {
        &self.props
    }
}

impl HasProperties for Parameter {
    fn props(&self) -> &[Property] {
        &self.props
    }
}

/// Value of the first property named `label`, or an empty string.
pub fn get_label(object_with_props: &impl HasProperties) -> String {
    object_with_props
        .props()
        .iter()
        .find(|prop| prop.name == "label")
        .map(|prop| prop.value.clone())
        .unwrap_or_default()
}

impl Control {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }
}

impl Group {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }
}

impl Part {
    pub fn new(name: &str, id: Option<&str>, prose: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            name: name.to_string(),
            prose: prose.map(str::to_string),
            ..Default::default()
        }
    }
}

/// Parse a catalog document held in memory.
///
/// Accepts the bare catalog object or the `{"catalog": {...}}` wrapper and
/// validates against the bundled schema before deserializing.
pub fn load_catalog_from_str(data: &str) -> Result<Catalog> {
    let value: Value = serde_json::from_str(data).context("parsing catalog JSON")?;
    let inner = match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key("catalog") => {
            map.remove("catalog").unwrap_or(Value::Null)
        }
        Value::Object(map) => Value::Object(map),
        _ => bail!("catalog document must be a JSON object"),
    };
    validate_catalog_value(&inner)?;
    let catalog: Catalog =
        serde_json::from_value(inner).context("deserializing validated catalog")?;
    Ok(catalog)
}

/// Read, validate, and parse a catalog document from disk.
pub fn load_catalog_from_path(path: &Path) -> Result<Catalog> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    load_catalog_from_str(&data).with_context(|| format!("loading {}", path.display()))
}

/// Write the catalog in wrapper form, pretty printed.
pub fn save_catalog_to_path(catalog: &Catalog, path: &Path) -> Result<()> {
    let wrapped = serde_json::json!({ "catalog": catalog });
    let text = serde_json::to_string_pretty(&wrapped)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}
