//! Contract for reading and writing one document per control.
//!
//! The catalog core decides where documents live (see [`crate::layout`]);
//! a [`ControlDocumentIo`] implementation decides what they contain. The
//! human-readable markdown format lives outside this crate.
//! [`JsonControlIo`] is a complete reference adapter that stores each control
//! as a JSON document. The directory tooling and tests use it.

use crate::catalog::model::{Control, Part};
use crate::profile::{Add, Alter, Profile, SET_PARAMS_TAG, SetParameter};
use crate::ssp::{ByComponent, ImplementedRequirement, Statement, SystemComponent};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-control options handed to [`ControlDocumentIo::write_control`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlWriteOptions<'a> {
    /// Part name → section title for the narrative sections to emit.
    pub sections: Option<&'a BTreeMap<String, String>>,
    /// Keep (or add) content beyond the catalog's own parts.
    pub additional_content: bool,
    /// Keep implementation responses already present in the document.
    pub responses: bool,
    /// Profile whose alters contribute additional content.
    pub profile: Option<&'a Profile>,
    /// Header values already in an existing document win over new ones.
    pub preserve_header_values: bool,
}

/// Reader/writer for the per-control document representation.
pub trait ControlDocumentIo {
    /// File extension (without the dot) of control documents.
    fn extension(&self) -> &str;

    /// Read a control and the title of the group it was written under.
    fn read_control(&self, path: &Path) -> Result<(Control, String)>;

    /// Write `control` into `dir`, named by its id. Sub-controls are not part
    /// of the document; each is written separately.
    fn write_control(
        &self,
        dir: &Path,
        control: &Control,
        group_title: &str,
        header: &Map<String, Value>,
        options: &ControlWriteOptions<'_>,
    ) -> Result<()>;

    /// Read the implementation responses of one control document.
    ///
    /// Components named in the document but missing from
    /// `available_components` are added to it.
    fn read_implemented_requirement(
        &self,
        path: &Path,
        available_components: &mut BTreeMap<String, SystemComponent>,
    ) -> Result<ImplementedRequirement>;

    /// Read added content as profile alters plus the parameter values set in
    /// the document header.
    fn read_new_alters_and_params(
        &self,
        path: &Path,
    ) -> Result<(Vec<Alter>, BTreeMap<String, String>)>;

    fn get_part_prose(&self, control: &Control, part_name: &str) -> String {
        part_prose(control, part_name)
    }

    fn param_values_as_string(&self, set_param: &SetParameter) -> String {
        param_values_as_string(set_param)
    }
}

/// Prose of the control's top-level parts named `part_name`, joined by
/// newlines and trimmed.
pub fn part_prose(control: &Control, part_name: &str) -> String {
    control
        .parts
        .iter()
        .filter(|part| part.name == part_name)
        .filter_map(|part| part.prose.as_deref())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Values joined with `, `; a parameter without values shows its label in
/// brackets, or nothing.
pub fn param_values_as_string(set_param: &SetParameter) -> String {
    if !set_param.values.is_empty() {
        return set_param.values.join(", ");
    }
    set_param
        .label
        .as_deref()
        .map(|label| format!("[{label}]"))
        .unwrap_or_default()
}

/// Fail unless `id` names exactly one entry inside its parent directory.
pub(crate) fn ensure_path_segment(kind: &str, id: &str) -> Result<()> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        bail!("{kind} id {id:?} cannot be used as a file or directory name");
    }
    Ok(())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// On-disk form written by [`JsonControlIo`].
pub struct ControlDocument {
    #[serde(default)]
    pub group_title: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub header: Map<String, Value>,
    pub control: Control,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responses: Vec<ComponentResponse>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added_parts: Vec<Part>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// A component's answer to one statement of the control.
pub struct ComponentResponse {
    pub statement_id: String,
    pub component: String,
    #[serde(default)]
    pub description: String,
}

/// Stores each control as `<control-id>.json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonControlIo;

impl JsonControlIo {
    pub fn document_path(&self, dir: &Path, control_id: &str) -> PathBuf {
        dir.join(format!("{control_id}.{}", self.extension()))
    }

    pub fn read_document(&self, path: &Path) -> Result<ControlDocument> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("parsing control document {}", path.display()))
    }
}

impl ControlDocumentIo for JsonControlIo {
    fn extension(&self) -> &str {
        "json"
    }

    fn read_control(&self, path: &Path) -> Result<(Control, String)> {
        let document = self.read_document(path)?;
        Ok((document.control, document.group_title))
    }

    fn write_control(
        &self,
        dir: &Path,
        control: &Control,
        group_title: &str,
        header: &Map<String, Value>,
        options: &ControlWriteOptions<'_>,
    ) -> Result<()> {
        ensure_path_segment("control", &control.id)?;
        let path = self.document_path(dir, &control.id);
        let existing = if path.is_file() {
            Some(self.read_document(&path)?)
        } else {
            None
        };

        let mut merged_header = header.clone();
        if options.preserve_header_values {
            if let Some(existing) = &existing {
                for (key, value) in &existing.header {
                    merged_header.insert(key.clone(), value.clone());
                }
            }
        }

        let sections: BTreeMap<String, String> = options
            .sections
            .map(|sections| {
                sections
                    .iter()
                    .filter(|(name, _)| control.parts.iter().any(|part| &part.name == *name))
                    .map(|(name, title)| (name.clone(), title.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let responses = match (&existing, options.responses) {
            (Some(existing), true) => existing.responses.clone(),
            _ => Vec::new(),
        };

        let mut added_parts = Vec::new();
        if options.additional_content {
            if let Some(existing) = &existing {
                added_parts.extend(existing.added_parts.iter().cloned());
            }
            if let Some(profile) = options.profile {
                for alter in profile.alters_for(&control.id) {
                    for part in alter.adds.iter().flat_map(|add| add.parts.iter()) {
                        let known = added_parts
                            .iter()
                            .any(|added| added.name == part.name && added.id == part.id);
                        if !known {
                            added_parts.push(part.clone());
                        }
                    }
                }
            }
        }

        // Sub-controls get documents of their own.
        let mut control = control.clone();
        control.controls.clear();

        let document = ControlDocument {
            group_title: group_title.to_string(),
            header: merged_header,
            control,
            sections,
            responses,
            added_parts,
        };
        let text = serde_json::to_string_pretty(&document)?;
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))
    }

    fn read_implemented_requirement(
        &self,
        path: &Path,
        available_components: &mut BTreeMap<String, SystemComponent>,
    ) -> Result<ImplementedRequirement> {
        let document = self.read_document(path)?;
        let mut statements: Vec<Statement> = Vec::new();
        for response in &document.responses {
            let component = available_components
                .entry(response.component.clone())
                .or_insert_with(|| SystemComponent::named(&response.component));
            let by_component = ByComponent {
                component_id: component.id.clone(),
                description: response.description.clone(),
            };
            match statements
                .iter_mut()
                .find(|statement| statement.statement_id == response.statement_id)
            {
                Some(statement) => statement.by_components.push(by_component),
                None => statements.push(Statement {
                    statement_id: response.statement_id.clone(),
                    by_components: vec![by_component],
                }),
            }
        }
        Ok(ImplementedRequirement {
            control_id: document.control.id,
            statements,
        })
    }

    fn read_new_alters_and_params(
        &self,
        path: &Path,
    ) -> Result<(Vec<Alter>, BTreeMap<String, String>)> {
        let document = self.read_document(path)?;
        let alters = if document.added_parts.is_empty() {
            Vec::new()
        } else {
            vec![Alter {
                control_id: document.control.id.clone(),
                adds: vec![Add {
                    position: Some("ending".to_string()),
                    parts: document.added_parts,
                    ..Default::default()
                }],
            }]
        };

        let params: BTreeMap<String, String> = document
            .header
            .get(SET_PARAMS_TAG)
            .and_then(Value::as_object)
            .map(|set_params| {
                set_params
                    .iter()
                    .map(|(param_id, value)| (param_id.clone(), header_value_string(value)))
                    .collect()
            })
            .unwrap_or_default();
        Ok((alters, params))
    }
}

fn header_value_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(header_value_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Modify;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_control() -> Control {
        let mut control = Control::new("ac-1", "Policy and Procedures");
        control.parts = vec![
            Part::new("statement", Some("ac-1_smt"), Some(" Develop a policy. ")),
            Part::new("guidance", Some("ac-1_gdn"), Some("Review yearly.")),
        ];
        control
    }

    fn write_response(io: &JsonControlIo, dir: &Path, responses: Vec<ComponentResponse>) {
        let path = io.document_path(dir, "ac-1");
        let mut document = io.read_document(&path).expect("read document");
        document.responses = responses;
        fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();
    }

    #[test]
    fn part_prose_joins_matching_top_level_parts() {
        let control = sample_control();
        assert_eq!(part_prose(&control, "statement"), "Develop a policy.");
        assert_eq!(part_prose(&control, "objective"), "");
        assert_eq!(JsonControlIo.get_part_prose(&control, "guidance"), "Review yearly.");
    }

    #[test]
    fn param_values_fall_back_to_label() {
        let mut set_param = SetParameter {
            param_id: "p".to_string(),
            label: Some("frequency".to_string()),
            values: Vec::new(),
        };
        assert_eq!(param_values_as_string(&set_param), "[frequency]");
        set_param.values = vec!["daily".to_string(), "weekly".to_string()];
        assert_eq!(JsonControlIo.param_values_as_string(&set_param), "daily, weekly");
    }

    #[test]
    fn write_then_read_returns_control_and_group_title() -> Result<()> {
        let temp = TempDir::new()?;
        let io = JsonControlIo;
        let sections = BTreeMap::from([
            ("guidance".to_string(), "Guidance".to_string()),
            ("objective".to_string(), "Objective".to_string()),
        ]);
        let options = ControlWriteOptions {
            sections: Some(&sections),
            ..Default::default()
        };
        io.write_control(temp.path(), &sample_control(), "Access Control", &Map::new(), &options)?;

        let path = io.document_path(temp.path(), "ac-1");
        let (control, group_title) = io.read_control(&path)?;
        assert_eq!(control, sample_control());
        assert_eq!(group_title, "Access Control");
        let document = io.read_document(&path)?;
        assert_eq!(document.sections.keys().collect::<Vec<_>>(), vec!["guidance"]);
        Ok(())
    }

    #[test]
    fn rewrite_preserves_header_values_and_responses_when_asked() -> Result<()> {
        let temp = TempDir::new()?;
        let io = JsonControlIo;
        let mut first_header = Map::new();
        first_header.insert("owner".to_string(), json!("alice"));
        io.write_control(temp.path(), &sample_control(), "", &first_header, &Default::default())?;
        write_response(
            &io,
            temp.path(),
            vec![ComponentResponse {
                statement_id: "ac-1_smt".to_string(),
                component: "This System".to_string(),
                description: "We do it.".to_string(),
            }],
        );

        let mut second_header = Map::new();
        second_header.insert("owner".to_string(), json!("bob"));
        second_header.insert("reviewed".to_string(), json!(true));
        let options = ControlWriteOptions {
            responses: true,
            preserve_header_values: true,
            ..Default::default()
        };
        io.write_control(temp.path(), &sample_control(), "", &second_header, &options)?;

        let document = io.read_document(&io.document_path(temp.path(), "ac-1"))?;
        assert_eq!(document.header["owner"], json!("alice"));
        assert_eq!(document.header["reviewed"], json!(true));
        assert_eq!(document.responses.len(), 1);

        io.write_control(temp.path(), &sample_control(), "", &second_header, &Default::default())?;
        let document = io.read_document(&io.document_path(temp.path(), "ac-1"))?;
        assert_eq!(document.header["owner"], json!("bob"));
        assert!(document.responses.is_empty());
        Ok(())
    }

    #[test]
    fn implemented_requirement_groups_responses_and_registers_components() -> Result<()> {
        let temp = TempDir::new()?;
        let io = JsonControlIo;
        io.write_control(temp.path(), &sample_control(), "", &Map::new(), &Default::default())?;
        write_response(
            &io,
            temp.path(),
            vec![
                ComponentResponse {
                    statement_id: "ac-1_smt.a".to_string(),
                    component: "This System".to_string(),
                    description: "one".to_string(),
                },
                ComponentResponse {
                    statement_id: "ac-1_smt.a".to_string(),
                    component: "Database".to_string(),
                    description: "two".to_string(),
                },
                ComponentResponse {
                    statement_id: "ac-1_smt.b".to_string(),
                    component: "This System".to_string(),
                    description: "three".to_string(),
                },
            ],
        );

        let mut components = BTreeMap::new();
        components.insert(
            "This System".to_string(),
            SystemComponent {
                id: "sys".to_string(),
                title: "This System".to_string(),
                description: String::new(),
            },
        );
        let imp_req = io.read_implemented_requirement(
            &io.document_path(temp.path(), "ac-1"),
            &mut components,
        )?;
        assert_eq!(imp_req.control_id, "ac-1");
        assert_eq!(imp_req.statements.len(), 2);
        assert_eq!(imp_req.statements[0].by_components.len(), 2);
        assert_eq!(imp_req.statements[0].by_components[0].component_id, "sys");
        assert_eq!(components.len(), 2);
        assert_eq!(components["Database"].id, "component-database");
        Ok(())
    }

    #[test]
    fn profile_adds_become_alters_and_header_params_are_read() -> Result<()> {
        let temp = TempDir::new()?;
        let io = JsonControlIo;
        let profile = Profile {
            modify: Some(Modify {
                alters: vec![Alter {
                    control_id: "ac-1".to_string(),
                    adds: vec![Add {
                        parts: vec![Part::new("implgdn", Some("ac-1_implgdn"), Some("extra"))],
                        ..Default::default()
                    }],
                }],
                ..Default::default()
            }),
            ..Default::default()
        };
        let mut header = Map::new();
        header.insert(
            SET_PARAMS_TAG.to_string(),
            json!({"ac-1_prm_1": "weekly", "ac-1_prm_2": ["a", "b"], "ac-1_prm_3": 30}),
        );
        let options = ControlWriteOptions {
            additional_content: true,
            profile: Some(&profile),
            ..Default::default()
        };
        io.write_control(temp.path(), &sample_control(), "", &header, &options)?;
        // Writing twice must not duplicate the added part.
        io.write_control(temp.path(), &sample_control(), "", &header, &options)?;

        let (alters, params) =
            io.read_new_alters_and_params(&io.document_path(temp.path(), "ac-1"))?;
        assert_eq!(alters.len(), 1);
        assert_eq!(alters[0].adds[0].parts.len(), 1);
        assert_eq!(alters[0].adds[0].parts[0].name, "implgdn");
        assert_eq!(params["ac-1_prm_1"], "weekly");
        assert_eq!(params["ac-1_prm_2"], "a, b");
        assert_eq!(params["ac-1_prm_3"], "30");
        Ok(())
    }

    #[test]
    fn control_ids_that_escape_the_directory_are_rejected() -> Result<()> {
        let temp = TempDir::new()?;
        let dir = temp.path().join("ac");
        fs::create_dir(&dir)?;
        for id in ["..", ".", "ac/1", ""] {
            let err = JsonControlIo
                .write_control(
                    &dir,
                    &Control::new(id, "Escape"),
                    "",
                    &Map::new(),
                    &ControlWriteOptions::default(),
                )
                .expect_err("unsafe id");
            assert!(err.to_string().contains("control id"), "{err}");
        }
        assert_eq!(fs::read_dir(temp.path())?.count(), 1);
        assert_eq!(fs::read_dir(&dir)?.count(), 0);
        Ok(())
    }
}
