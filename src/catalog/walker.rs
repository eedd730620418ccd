//! Read-only traversal of the group/control tree.
//!
//! Each function returns a fresh lazy iterator, so walks can be restarted by
//! calling again. Iterators keep an explicit stack instead of recursing, and
//! yield nodes in document order (pre-order: parent before children).

use crate::catalog::model::{Catalog, Control, Group};
use std::slice;

/// Pre-order walk over a control list, optionally descending into
/// sub-controls.
pub struct ControlsInList<'a> {
    stack: Vec<slice::Iter<'a, Control>>,
    recurse: bool,
}

impl<'a> Iterator for ControlsInList<'a> {
    type Item = &'a Control;

    fn next(&mut self) -> Option<&'a Control> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(control) => {
                    if self.recurse && !control.controls.is_empty() {
                        self.stack.push(control.controls.iter());
                    }
                    return Some(control);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Pre-order walk over a group and every group nested below it.
pub struct GroupsFromGroup<'a> {
    stack: Vec<slice::Iter<'a, Group>>,
}

impl<'a> Iterator for GroupsFromGroup<'a> {
    type Item = &'a Group;

    fn next(&mut self) -> Option<&'a Group> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(group) => {
                    if !group.groups.is_empty() {
                        self.stack.push(group.groups.iter());
                    }
                    return Some(group);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

pub fn controls_in_list(controls: &[Control], recurse: bool) -> ControlsInList<'_> {
    ControlsInList {
        stack: vec![controls.iter()],
        recurse,
    }
}

pub fn groups_from_group(group: &Group) -> GroupsFromGroup<'_> {
    GroupsFromGroup {
        stack: vec![slice::from_ref(group).iter()],
    }
}

/// Controls of a group followed by those of each nested group.
///
/// `recurse` only governs descent into sub-controls; nested groups are
/// always visited.
pub fn controls_in_group(group: &Group, recurse: bool) -> impl Iterator<Item = &Control> + '_ {
    groups_from_group(group).flat_map(move |group| controls_in_list(&group.controls, recurse))
}

/// Every group of the catalog, top-level groups in order, each pre-order.
pub fn groups_in_catalog(catalog: &Catalog) -> impl Iterator<Item = &Group> + '_ {
    catalog.groups.iter().flat_map(groups_from_group)
}

/// Every control reachable from the catalog: grouped controls first, then the
/// ungrouped list.
pub fn controls_in_catalog(catalog: &Catalog, recurse: bool) -> impl Iterator<Item = &Control> + '_ {
    catalog
        .groups
        .iter()
        .flat_map(move |group| controls_in_group(group, recurse))
        .chain(controls_in_list(&catalog.controls, recurse))
}
