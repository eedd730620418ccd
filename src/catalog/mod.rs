//! Catalog document model and its flat control index.
//!
//! `model` mirrors the document schema, `walker` traverses it, `index` builds
//! the id-keyed view, and `CatalogInterface` ties the two representations
//! together for control-level queries and edits.

pub mod equivalence;
pub mod identity;
pub mod index;
pub mod interface;
pub mod model;
pub mod walker;

pub use equivalence::{controls_equivalent, part_equivalent, parts_equivalent};
pub use identity::{CATALOG_GROUP_CLASS, ControlPath, GroupContext};
pub use index::{ControlHandle, ControlIndex};
pub use interface::CatalogInterface;
pub use model::{
    Catalog, Control, Group, HasProperties, Metadata, Parameter, Part, Property, get_label,
    load_catalog_from_path, load_catalog_from_str, save_catalog_to_path,
};
