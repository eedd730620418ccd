//! Control-level queries and edits over a catalog tree.
//!
//! A [`CatalogInterface`] owns the tree and the flat [`ControlIndex`] built
//! from it. Edits go to the index only; the tree is a derived view that is
//! regenerated wholesale from the index by [`CatalogInterface::get_catalog`]
//! (with `update`) before anything reads the tree again.
//!
//! Nothing here touches the filesystem; the directory layout lives in
//! [`crate::layout`].

use crate::catalog::equivalence::controls_equivalent;
use crate::catalog::identity::{ControlPath, GroupContext};
use crate::catalog::index::ControlIndex;
use crate::catalog::model::{self, Catalog, Control, Group, HasProperties, Part};
use crate::catalog::walker::{controls_in_catalog, groups_in_catalog};
use crate::control_io::part_prose;
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::CatalogError;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Part names that can carry a labelled statement.
const STATEMENT_PART_NAMES: &[&str] = &["statement", "item"];

pub struct CatalogInterface {
    catalog: Catalog,
    index: ControlIndex,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for CatalogInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogInterface")
            .field("controls", &self.index.len())
            .field("groups", &self.catalog.groups.len())
            .finish()
    }
}

impl Default for CatalogInterface {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl CatalogInterface {
    /// Index `catalog`, reporting diagnostics through `tracing`.
    pub fn new(catalog: Catalog) -> Self {
        Self::with_sink(catalog, Arc::new(TracingSink))
    }

    pub fn with_sink(catalog: Catalog, sink: Arc<dyn DiagnosticSink>) -> Self {
        let index = ControlIndex::build(&catalog, sink.as_ref());
        Self {
            catalog,
            index,
            sink,
        }
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        self.sink.as_ref()
    }

    pub fn index(&self) -> &ControlIndex {
        &self.index
    }

    /// Replace the tree's groups and ungrouped controls, then index afresh.
    pub(crate) fn set_tree(&mut self, groups: Vec<Group>, controls: Vec<Control>) {
        self.catalog.groups = groups;
        self.catalog.controls = controls;
        self.index = ControlIndex::build(&self.catalog, self.sink.as_ref());
    }

    /// The indexed copy of a control. Its sub-controls carry no sub-controls
    /// of their own; see [`Self::get_dependent_control_ids`] for the subtree.
    pub fn get_control(&self, control_id: &str) -> Option<&Control> {
        self.index.control(control_id)
    }

    pub fn get_control_by_param_id(&self, param_id: &str) -> Option<&Control> {
        self.get_control(self.index.param_owner(param_id)?)
    }

    /// Ids of every control nested below `control_id`, depth-first.
    ///
    /// Indexed controls hold their sub-controls one level deep, so each level
    /// is looked up in the index again.
    pub fn get_dependent_control_ids(&self, control_id: &str) -> Result<Vec<String>, CatalogError> {
        let control = self.require_control(control_id)?;
        let mut ids = Vec::new();
        let mut stack = vec![control.controls.iter()];
        while let Some(top) = stack.last_mut() {
            match top.next() {
                Some(child) => {
                    ids.push(child.id.clone());
                    let indexed = self.index.control(&child.id).unwrap_or(child);
                    if !indexed.controls.is_empty() {
                        stack.push(indexed.controls.iter());
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(ids)
    }

    /// Control ids in index order.
    pub fn get_control_ids(&self) -> impl Iterator<Item = &str> {
        self.index.handles().map(|handle| handle.control.id.as_str())
    }

    pub fn get_control_part_prose(
        &self,
        control_id: &str,
        part_name: &str,
    ) -> Result<String, CatalogError> {
        Ok(part_prose(self.require_control(control_id)?, part_name))
    }

    /// Controls as found in the tree. Groups are always descended; `recurse`
    /// controls descent into sub-controls.
    pub fn get_all_controls_from_catalog(&self, recurse: bool) -> impl Iterator<Item = &Control> {
        controls_in_catalog(&self.catalog, recurse)
    }

    /// Controls as held by the index, sub-controls included.
    pub fn get_all_controls_from_dict(&self) -> impl Iterator<Item = &Control> {
        self.index.handles().map(|handle| &handle.control)
    }

    pub fn get_count_of_controls_in_dict(&self) -> usize {
        self.index.len()
    }

    pub fn get_count_of_controls_in_catalog(&self, recurse: bool) -> usize {
        self.get_all_controls_from_catalog(recurse).count()
    }

    /// Distinct non-empty group ids that own at least one indexed control.
    pub fn get_group_ids(&self) -> BTreeSet<String> {
        self.index
            .handles()
            .filter(|handle| !handle.group.is_catalog_root())
            .map(|handle| handle.group.id.clone())
            .collect()
    }

    pub fn get_all_groups_from_catalog(&self) -> impl Iterator<Item = &Group> {
        groups_in_catalog(&self.catalog)
    }

    pub fn get_group_info_by_control(&self, control_id: &str) -> Result<&GroupContext, CatalogError> {
        self.index
            .handle(control_id)
            .map(|handle| &handle.group)
            .ok_or_else(|| CatalogError::unknown_control(control_id))
    }

    pub fn get_control_path(&self, control_id: &str) -> Result<&ControlPath, CatalogError> {
        self.index
            .handle(control_id)
            .map(|handle| &handle.path)
            .ok_or_else(|| CatalogError::unknown_control(control_id))
    }

    pub fn get_label(object_with_props: &impl HasProperties) -> String {
        model::get_label(object_with_props)
    }

    /// Label and part of the statement item `statement_id` inside a control.
    ///
    /// Only top-level parts whose id is a prefix of `statement_id` are
    /// searched, relying on nested part ids extending their parent's id.
    /// Returns `None` for an unknown control or when nothing matches.
    pub fn get_statement_label_if_exists(
        &self,
        control_id: &str,
        statement_id: &str,
    ) -> Option<(String, &Part)> {
        let control = self.get_control(control_id)?;
        let is_statement = |part: &Part| {
            STATEMENT_PART_NAMES.contains(&part.name.as_str())
                && part.id.as_deref() == Some(statement_id)
        };
        control
            .parts
            .iter()
            .filter(|part| {
                part.id
                    .as_deref()
                    .is_some_and(|id| statement_id.starts_with(id))
            })
            .find_map(|part| Self::find_part_with_condition(part, &is_statement))
            .map(|found| (model::get_label(found), found))
    }

    /// First part in pre-order (the part itself, then its sub-parts) that
    /// satisfies `condition`.
    pub fn find_part_with_condition<'a>(
        part: &'a Part,
        condition: &dyn Fn(&Part) -> bool,
    ) -> Option<&'a Part> {
        if condition(part) {
            return Some(part);
        }
        part.parts
            .iter()
            .find_map(|sub_part| Self::find_part_with_condition(sub_part, condition))
    }

    /// Every `(control id, prose)` whose prose contains `seek_str`, searching
    /// all parts depth-first.
    pub fn find_string_in_control(control: &Control, seek_str: &str) -> Vec<(String, String)> {
        let mut hits = Vec::new();
        for part in &control.parts {
            find_string_in_part(&control.id, part, seek_str, &mut hits);
        }
        hits
    }

    /// Overwrite the indexed copy of a control. The tree is left stale.
    pub fn replace_control(&mut self, control: Control) -> Result<(), CatalogError> {
        let handle = self
            .index
            .handle_mut(&control.id)
            .ok_or_else(|| CatalogError::unknown_control(&control.id))?;
        handle.control = control;
        Ok(())
    }

    /// The tree, first refreshed from the index when `update` is set.
    pub fn get_catalog(&mut self, update: bool) -> &Catalog {
        if update {
            self.update_catalog_controls();
        }
        &self.catalog
    }

    /// Consume the interface, returning the refreshed tree.
    pub fn into_catalog(mut self) -> Catalog {
        self.update_catalog_controls();
        self.catalog
    }

    /// Pull every control of the tree back from the index.
    ///
    /// Group nesting and order come from the current tree; control content and
    /// sub-control lists come from the index.
    pub fn update_catalog_controls(&mut self) {
        let index = &self.index;
        for group in &mut self.catalog.groups {
            refresh_group(index, group);
        }
        self.catalog.controls = refresh_controls(index, &self.catalog.controls);
    }

    /// Whether `other` holds the same controls as this index.
    ///
    /// Stops at the first difference and reports it. Group layout is not
    /// compared and neither are sub-controls (see
    /// [`controls_equivalent`]).
    pub fn equivalent_to(&self, other: &Catalog) -> bool {
        let other = ControlIndex::build(other, self.sink.as_ref());
        if other.len() != self.index.len() {
            self.sink.report(Diagnostic::ControlCountMismatch {
                ours: self.index.len(),
                theirs: other.len(),
            });
            return false;
        }
        for ours in self.get_all_controls_from_dict() {
            let Some(theirs) = other.control(&ours.id) else {
                self.sink.report(Diagnostic::ControlMissing {
                    control_id: ours.id.clone(),
                });
                return false;
            };
            if ours.id != theirs.id {
                self.sink.report(Diagnostic::ControlIdMismatch {
                    ours: ours.id.clone(),
                    theirs: theirs.id.clone(),
                });
                return false;
            }
            if !controls_equivalent(ours, theirs) {
                self.sink.report(Diagnostic::ControlsDiffer {
                    control_id: ours.id.clone(),
                });
                return false;
            }
        }
        true
    }

    /// Distinct top-level part names across all indexed controls, in the order
    /// first seen.
    pub fn get_sections(&self) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();
        for control in self.get_all_controls_from_dict() {
            for part in &control.parts {
                if !sections.contains(&part.name) {
                    sections.push(part.name.clone());
                }
            }
        }
        sections
    }

    fn require_control(&self, control_id: &str) -> Result<&Control, CatalogError> {
        self.get_control(control_id)
            .ok_or_else(|| CatalogError::unknown_control(control_id))
    }
}

fn find_string_in_part(
    control_id: &str,
    part: &Part,
    seek_str: &str,
    hits: &mut Vec<(String, String)>,
) {
    if let Some(prose) = &part.prose {
        if prose.contains(seek_str) {
            hits.push((control_id.to_string(), prose.clone()));
        }
    }
    for sub_part in &part.parts {
        find_string_in_part(control_id, sub_part, seek_str, hits);
    }
}

/// Fresh copies of `controls` taken from the index, recursing into the
/// indexed sub-control lists. Ids missing from the index keep their copy.
fn refresh_controls(index: &ControlIndex, controls: &[Control]) -> Vec<Control> {
    controls
        .iter()
        .map(|control| {
            let mut fresh = index.control(&control.id).unwrap_or(control).clone();
            fresh.controls = refresh_controls(index, &fresh.controls);
            fresh
        })
        .collect()
}

fn refresh_group(index: &ControlIndex, group: &mut Group) {
    group.controls = refresh_controls(index, &group.controls);
    for sub_group in &mut group.groups {
        refresh_group(index, sub_group);
    }
}
