//! Flat, id-keyed view of a catalog tree.
//!
//! One pass over the tree yields a [`ControlHandle`] per control, stored in an
//! arena in traversal order with an id → slot map beside it, plus a map from
//! parameter id to the owning control id. Unlike the strict document loader,
//! the index tolerates duplicates: it reports them to the diagnostics sink and
//! lets the later entry win.

use crate::catalog::identity::{ControlPath, GroupContext};
use crate::catalog::model::{Catalog, Control, Group};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize)]
/// An indexed control together with where it sits in the tree.
///
/// `control.controls` lists the direct sub-controls with their own
/// sub-control lists emptied; each sub-control has a handle of its own.
pub struct ControlHandle {
    pub group: GroupContext,
    pub path: ControlPath,
    pub control: Control,
}

#[derive(Clone, Debug, Default)]
/// Control handles keyed by control id plus the param → control map.
pub struct ControlIndex {
    handles: Vec<ControlHandle>,
    slots: HashMap<String, usize>,
    params: HashMap<String, String>,
}

impl ControlIndex {
    /// Index every control in the tree.
    ///
    /// Grouped controls are visited group by group (each group's controls
    /// before its sub-groups), then the catalog's ungrouped controls.
    pub fn build(catalog: &Catalog, sink: &dyn DiagnosticSink) -> Self {
        let mut index = Self::default();
        for group in &catalog.groups {
            index.add_group_controls(group, ControlPath::default(), sink);
        }
        let root = GroupContext::catalog_root();
        let root_path = ControlPath::catalog_root();
        for control in &catalog.controls {
            index.add_control(control, &root, &root_path, sink);
        }

        let owners: Vec<(String, String)> = index
            .handles
            .iter()
            .flat_map(|handle| {
                handle
                    .control
                    .params
                    .iter()
                    .map(|param| (param.id.clone(), handle.control.id.clone()))
            })
            .collect();
        for (param_id, control_id) in owners {
            if let Some(previous) = index.params.insert(param_id.clone(), control_id.clone()) {
                sink.report(Diagnostic::DuplicateParamId {
                    param_id,
                    control_id,
                    previous_control_id: previous,
                });
            }
        }

        debug!(
            controls = index.handles.len(),
            params = index.params.len(),
            "built control index"
        );
        index
    }

    fn add_group_controls(&mut self, group: &Group, parent: ControlPath, sink: &dyn DiagnosticSink) {
        let path = parent.child(&group.id);
        let context = GroupContext {
            id: group.id.clone(),
            title: group.title.clone(),
            class: group.class.clone(),
        };
        for control in &group.controls {
            self.add_control(control, &context, &path, sink);
        }
        for sub_group in &group.groups {
            self.add_group_controls(sub_group, path.clone(), sink);
        }
    }

    /// Index a control and, with the same context and path, its sub-controls.
    fn add_control(
        &mut self,
        control: &Control,
        group: &GroupContext,
        path: &ControlPath,
        sink: &dyn DiagnosticSink,
    ) {
        let handle = ControlHandle {
            group: group.clone(),
            path: path.clone(),
            control: shallow_copy(control),
        };
        match self.slots.get(&control.id) {
            Some(&slot) => {
                sink.report(Diagnostic::DuplicateControlId {
                    control_id: control.id.clone(),
                });
                self.handles[slot] = handle;
            }
            None => {
                self.slots.insert(control.id.clone(), self.handles.len());
                self.handles.push(handle);
            }
        }
        for sub_control in &control.controls {
            self.add_control(sub_control, group, path, sink);
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, control_id: &str) -> Option<&ControlHandle> {
        self.slots.get(control_id).map(|&slot| &self.handles[slot])
    }

    pub fn handle_mut(&mut self, control_id: &str) -> Option<&mut ControlHandle> {
        let slot = *self.slots.get(control_id)?;
        self.handles.get_mut(slot)
    }

    pub fn control(&self, control_id: &str) -> Option<&Control> {
        self.handle(control_id).map(|handle| &handle.control)
    }

    /// Id of the control that owns `param_id` (the last one seen on duplicates).
    pub fn param_owner(&self, param_id: &str) -> Option<&str> {
        self.params.get(param_id).map(String::as_str)
    }

    /// Handles in traversal order.
    pub fn handles(&self) -> impl Iterator<Item = &ControlHandle> {
        self.handles.iter()
    }
}

/// Copy of `control` whose sub-controls are kept without their own
/// sub-controls. Deeper levels live in their own handles.
fn shallow_copy(control: &Control) -> Control {
    let mut copy = without_sub_controls(control);
    copy.controls = control.controls.iter().map(without_sub_controls).collect();
    copy
}

fn without_sub_controls(control: &Control) -> Control {
    Control {
        id: control.id.clone(),
        class: control.class.clone(),
        title: control.title.clone(),
        params: control.params.clone(),
        props: control.props.clone(),
        parts: control.parts.clone(),
        controls: Vec::new(),
    }
}
