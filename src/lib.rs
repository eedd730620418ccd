//! Control catalogs as a tree and as a flat index.
//!
//! A catalog document nests groups in groups, controls in groups, controls in
//! controls, and parts in parts. Most work on it (find a control, edit it,
//! export one file per control and read the files back) wants direct
//! addressing by control id instead. [`CatalogInterface`] keeps both forms:
//! it indexes the tree once, applies edits to the index, and regenerates the
//! tree from the index on demand without disturbing group nesting or order.
//!
//! Structural problems (duplicate parameter ids, inconsistent group titles,
//! catalogs that differ) are reported to a [`DiagnosticSink`] and never stop
//! processing. Lookups that require an existing control fail with
//! [`CatalogError`]; filesystem work returns `anyhow::Result`.

pub mod catalog;
pub mod control_io;
pub mod control_order;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod profile;
pub mod ssp;

mod schema_loader;

pub use catalog::{
    Catalog, CatalogInterface, Control, ControlHandle, ControlIndex, ControlPath, Group,
    GroupContext, HasProperties, Parameter, Part, Property, get_label, load_catalog_from_path,
    load_catalog_from_str, save_catalog_to_path,
};
pub use control_io::{ControlDocumentIo, ControlWriteOptions, JsonControlIo};
pub use control_order::{ControlSortKey, sort_control_ids, sort_control_paths};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, Severity, TracingSink};
pub use error::CatalogError;
pub use layout::{
    MarkdownWriteOptions, group_ids_and_dirs, read_additional_content, read_catalog_imp_reqs,
    sorted_control_paths,
};
pub use profile::{Profile, SET_PARAMS_TAG, get_full_profile_param_dict, get_profile_param_dict};

