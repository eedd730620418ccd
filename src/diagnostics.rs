//! Advisory findings raised while indexing, reading, or comparing catalogs.
//!
//! None of these stop processing. The façade reports them through an
//! injected [`DiagnosticSink`]; the default sink forwards to `tracing`, and
//! [`CollectingSink`] keeps them for callers that want to count or show them.

use std::fmt;
use std::sync::Mutex;
use tracing::{error, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Warning,
    Error,
}

/// One structural inconsistency observed in a catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// A parameter id is defined by more than one control. The later control
    /// now owns the id in the param index.
    DuplicateParamId {
        param_id: String,
        control_id: String,
        previous_control_id: String,
    },
    /// A control id appears more than once in the tree.
    DuplicateControlId { control_id: String },
    /// Controls read from one group directory disagree on the group title.
    GroupTitleMismatch {
        group_id: String,
        control_id: String,
        title: String,
        expected: String,
    },
    /// No control in a group directory carried a group title.
    MissingGroupTitle { group_id: String },
    /// Two catalogs being compared hold a different number of controls.
    ControlCountMismatch { ours: usize, theirs: usize },
    /// A control of this catalog has no counterpart in the other one.
    ControlMissing { control_id: String },
    /// The paired controls carry different ids.
    ControlIdMismatch { ours: String, theirs: String },
    /// The paired controls differ in title or parts.
    ControlsDiffer { control_id: String },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::DuplicateParamId { .. }
            | Diagnostic::DuplicateControlId { .. }
            | Diagnostic::GroupTitleMismatch { .. }
            | Diagnostic::MissingGroupTitle { .. } => Severity::Warning,
            Diagnostic::ControlCountMismatch { .. }
            | Diagnostic::ControlMissing { .. }
            | Diagnostic::ControlIdMismatch { .. }
            | Diagnostic::ControlsDiffer { .. } => Severity::Error,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateParamId {
                param_id,
                control_id,
                previous_control_id,
            } => write!(
                f,
                "duplicate param id {param_id} in control {control_id} and {previous_control_id}"
            ),
            Diagnostic::DuplicateControlId { control_id } => {
                write!(f, "duplicate control id {control_id}")
            }
            Diagnostic::GroupTitleMismatch {
                group_id,
                control_id,
                title,
                expected,
            } => write!(
                f,
                "control {control_id} group title '{title}' differs from '{expected}' in group {group_id}"
            ),
            Diagnostic::MissingGroupTitle { group_id } => {
                write!(f, "no group title found in controls for group {group_id}")
            }
            Diagnostic::ControlCountMismatch { ours, theirs } => {
                write!(f, "count of controls is different: {ours} vs {theirs}")
            }
            Diagnostic::ControlMissing { control_id } => {
                write!(f, "control {control_id} not found in other catalog")
            }
            Diagnostic::ControlIdMismatch { ours, theirs } => {
                write!(f, "ids differ: |{ours}| |{theirs}|")
            }
            Diagnostic::ControlsDiffer { control_id } => write!(f, "controls differ: {control_id}"),
        }
    }
}

/// Receiver for diagnostics produced by the catalog core.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `tracing` at its severity.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => warn!(target: "control_catalog", "{diagnostic}"),
            Severity::Error => error!(target: "control_catalog", "{diagnostic}"),
        }
    }
}

/// Keeps diagnostics in memory in the order they were reported.
#[derive(Debug, Default)]
pub struct CollectingSink {
    collected: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.collected
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// Count of reported diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics()
            .iter()
            .filter(|diagnostic| diagnostic.severity() == severity)
            .count()
    }

    pub fn clear(&self) {
        self.collected
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.collected
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_preserves_order_and_counts_by_severity() {
        let sink = CollectingSink::new();
        sink.report(Diagnostic::MissingGroupTitle {
            group_id: "ac".to_string(),
        });
        sink.report(Diagnostic::ControlsDiffer {
            control_id: "ac-1".to_string(),
        });
        sink.report(Diagnostic::DuplicateControlId {
            control_id: "ac-2".to_string(),
        });

        let seen = sink.diagnostics();
        assert_eq!(seen.len(), 3);
        assert!(matches!(seen[0], Diagnostic::MissingGroupTitle { .. }));
        assert_eq!(sink.count(Severity::Warning), 2);
        assert_eq!(sink.count(Severity::Error), 1);

        sink.clear();
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn duplicate_param_message_names_both_controls() {
        let diagnostic = Diagnostic::DuplicateParamId {
            param_id: "p1".to_string(),
            control_id: "ac-2".to_string(),
            previous_control_id: "ac-1".to_string(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "duplicate param id p1 in control ac-2 and ac-1"
        );
        assert_eq!(diagnostic.severity(), Severity::Warning);
    }
}
