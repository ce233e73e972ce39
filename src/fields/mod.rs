//! Composite field catalogs and the flat ⇄ nested value transform

pub mod catalog;
pub mod transform;

pub use catalog::{composite_template, wire_format_hint, CompositeTemplate, SubFieldTemplate};
pub use transform::{flatten, unflatten};
