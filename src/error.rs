//! Typed failures raised by the catalog façade.
//!
//! Pure lookups return `Option`; operations that assume the id exists return
//! these errors so callers cannot mistake a missing control for an empty one.
//! Filesystem and document errors travel as `anyhow::Error` instead.

/// Lookup failure for an operation that requires an indexed entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The control id is not a key of the flat index.
    #[error("control '{control_id}' is not in the catalog index")]
    UnknownControl {
        /// Id that was requested.
        control_id: String,
    },

    /// The parameter id is not owned by any indexed control.
    #[error("parameter '{param_id}' is not defined by any indexed control")]
    UnknownParam {
        /// Id that was requested.
        param_id: String,
    },
}

impl CatalogError {
    pub(crate) fn unknown_control(control_id: &str) -> Self {
        Self::UnknownControl {
            control_id: control_id.to_string(),
        }
    }
}
