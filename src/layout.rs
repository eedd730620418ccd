//! One-document-per-control directory layout.
//!
//! A root directory holds the ungrouped controls directly and one
//! subdirectory per group, named by group id. Document contents are delegated
//! to a [`ControlDocumentIo`]; this module only decides which files exist,
//! where, and in what order they are read back.

use crate::catalog::{Catalog, CatalogInterface, Control, Group};
use crate::control_io::{ControlDocumentIo, ControlWriteOptions, ensure_path_segment};
use crate::control_order::sort_control_paths;
use crate::diagnostics::Diagnostic;
use crate::profile::{
    Alter, Profile, SET_PARAMS_TAG, get_full_profile_param_dict, get_profile_param_dict,
};
use crate::ssp::{ImplementedRequirement, SystemComponent};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for writing a whole catalog out as control documents.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownWriteOptions<'a> {
    /// Part name → section title passed through to the adapter.
    pub sections: Option<&'a BTreeMap<String, String>>,
    pub responses: bool,
    pub additional_content: bool,
    pub profile: Option<&'a Profile>,
    pub preserve_header_values: bool,
    /// Add each control's parameter values (profile values winning) to its
    /// header under [`SET_PARAMS_TAG`].
    pub set_parameters: bool,
}

impl<'a> MarkdownWriteOptions<'a> {
    fn control_options(&self) -> ControlWriteOptions<'a> {
        ControlWriteOptions {
            sections: self.sections,
            additional_content: self.additional_content,
            responses: self.responses,
            profile: self.profile,
            preserve_header_values: self.preserve_header_values,
        }
    }
}

/// Group id → directory, ordered by id.
///
/// The empty id maps to `md_path` itself and sorts first. Every immediate
/// subdirectory, hidden ones included, is a group named after the directory.
pub fn group_ids_and_dirs(md_path: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut id_map = BTreeMap::new();
    id_map.insert(String::new(), md_path.to_path_buf());
    let entries =
        fs::read_dir(md_path).with_context(|| format!("listing {}", md_path.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().map(|name| name.to_string_lossy().into_owned()) else {
            continue;
        };
        id_map.insert(name, path);
    }
    Ok(id_map)
}

/// Control documents directly inside `group_dir`, in control numbering order.
pub fn sorted_control_paths(group_dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    let entries =
        fs::read_dir(group_dir).with_context(|| format!("listing {}", group_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
            paths.push(path);
        }
    }
    sort_control_paths(&mut paths);
    Ok(paths)
}

/// Every control document under `md_path`, group by group.
fn control_documents(md_path: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();
    for group_dir in group_ids_and_dirs(md_path)?.values() {
        documents.extend(sorted_control_paths(group_dir, extension)?);
    }
    Ok(documents)
}

/// Implemented requirements of every control document under `md_path`.
///
/// Components the documents mention but `available_components` lacks are
/// added to it.
pub fn read_catalog_imp_reqs(
    md_path: &Path,
    available_components: &mut BTreeMap<String, SystemComponent>,
    io: &dyn ControlDocumentIo,
) -> Result<Vec<ImplementedRequirement>> {
    control_documents(md_path, io.extension())?
        .iter()
        .map(|path| io.read_implemented_requirement(path, available_components))
        .collect()
}

/// Added content of every control document as profile alters, plus all
/// parameter values set in their headers (later documents win).
pub fn read_additional_content(
    md_path: &Path,
    io: &dyn ControlDocumentIo,
) -> Result<(Vec<Alter>, BTreeMap<String, String>)> {
    let mut alters = Vec::new();
    let mut params = BTreeMap::new();
    for path in control_documents(md_path, io.extension())? {
        let (control_alters, control_params) = io.read_new_alters_and_params(&path)?;
        alters.extend(control_alters);
        params.extend(control_params);
    }
    Ok((alters, params))
}

impl CatalogInterface {
    /// Write every control of the catalog as its own document under `md_path`.
    ///
    /// The tree is refreshed from the index first. Each control lands in the
    /// directory named by its group path; sub-controls share their parent's
    /// directory. Nothing is written if any group or control id is not a
    /// plain file name (`.`, `..`, or containing a separator).
    pub fn write_catalog_as_markdown(
        &mut self,
        md_path: &Path,
        header: &Map<String, Value>,
        options: &MarkdownWriteOptions<'_>,
        io: &dyn ControlDocumentIo,
    ) -> Result<()> {
        self.update_catalog_controls();
        for control in self.get_all_controls_from_catalog(true) {
            ensure_path_segment("control", &control.id)?;
            for segment in self.get_control_path(&control.id)?.segments() {
                if !segment.is_empty() {
                    ensure_path_segment("group", segment)?;
                }
            }
        }
        fs::create_dir_all(md_path).with_context(|| format!("creating {}", md_path.display()))?;

        let profile_params = match (options.set_parameters, options.profile) {
            (true, Some(profile)) => get_full_profile_param_dict(profile),
            _ => BTreeMap::new(),
        };
        let control_options = options.control_options();

        let mut written = 0usize;
        for control in self.get_all_controls_from_catalog(true) {
            let mut control_header = header.clone();
            if options.set_parameters {
                let param_dict = get_profile_param_dict(control, &profile_params);
                if !param_dict.is_empty() {
                    control_header
                        .insert(SET_PARAMS_TAG.to_string(), serde_json::to_value(param_dict)?);
                }
            }

            let group = self.get_group_info_by_control(&control.id)?;
            let mut group_dir = md_path.to_path_buf();
            for segment in self.get_control_path(&control.id)?.segments() {
                if !segment.is_empty() {
                    group_dir.push(segment);
                }
            }
            fs::create_dir_all(&group_dir)
                .with_context(|| format!("creating {}", group_dir.display()))?;
            io.write_control(&group_dir, control, &group.title, &control_header, &control_options)
                .with_context(|| format!("writing control {}", control.id))?;
            written += 1;
        }
        debug!(controls = written, dir = %md_path.display(), "wrote control documents");
        Ok(())
    }

    /// Replace the catalog's groups and ungrouped controls with the documents
    /// found under `md_path`, then rebuild the index.
    ///
    /// Only immediate subdirectories are read as groups. A group's title is
    /// the first non-empty title its documents carry; disagreeing titles and
    /// groups without any title are reported, not rejected.
    pub fn read_catalog_from_markdown(
        &mut self,
        md_path: &Path,
        io: &dyn ControlDocumentIo,
    ) -> Result<&Catalog> {
        let mut groups: Vec<Group> = Vec::new();
        let mut ungrouped: Vec<Control> = Vec::new();

        for (group_id, group_dir) in group_ids_and_dirs(md_path)? {
            let mut controls = Vec::new();
            let mut group_title = String::new();
            for control_path in sorted_control_paths(&group_dir, io.extension())? {
                let (control, control_group_title) = io.read_control(&control_path)?;
                if !control_group_title.is_empty() {
                    if group_title.is_empty() {
                        group_title = control_group_title;
                    } else if control_group_title != group_title {
                        self.sink().report(Diagnostic::GroupTitleMismatch {
                            group_id: group_id.clone(),
                            control_id: control.id.clone(),
                            title: control_group_title,
                            expected: group_title.clone(),
                        });
                    }
                }
                controls.push(control);
            }

            if group_id.is_empty() {
                ungrouped = controls;
                continue;
            }
            if group_title.is_empty() {
                self.sink().report(Diagnostic::MissingGroupTitle {
                    group_id: group_id.clone(),
                });
            }
            groups.push(Group {
                id: group_id,
                title: group_title,
                controls,
                ..Default::default()
            });
        }

        debug!(
            groups = groups.len(),
            ungrouped = ungrouped.len(),
            dir = %md_path.display(),
            "read control documents"
        );
        self.set_tree(groups, ungrouped);
        Ok(self.get_catalog(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn group_dirs_put_root_first_and_sort_by_id() -> Result<()> {
        let temp = TempDir::new()?;
        for dir in ["sc", "ac", ".ac"] {
            fs::create_dir(temp.path().join(dir))?;
        }
        fs::write(temp.path().join("pm-1.json"), "{}")?;

        let map = group_ids_and_dirs(temp.path())?;
        let ids: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["", ".ac", "ac", "sc"]);
        assert_eq!(map[""], temp.path());
        assert_eq!(map["sc"], temp.path().join("sc"));
        Ok(())
    }

    #[test]
    fn control_paths_filter_by_extension_and_sort() -> Result<()> {
        let temp = TempDir::new()?;
        for name in ["ac-10.json", "ac-2.json", "ac-2.1.json", "notes.txt"] {
            fs::write(temp.path().join(name), "{}")?;
        }
        fs::create_dir(temp.path().join("ac-3.json"))?;

        let names: Vec<String> = sorted_control_paths(temp.path(), "json")?
            .iter()
            .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(names, vec!["ac-2.json", "ac-2.1.json", "ac-10.json"]);
        Ok(())
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().expect("temp dir");
        let err = group_ids_and_dirs(&temp.path().join("absent")).expect_err("no such dir");
        assert!(err.to_string().contains("listing"));
    }
}
