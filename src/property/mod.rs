//! XML property files
//!
//! A `PropertySet` is one parsed `configuration` document together with its
//! provenance (`Source`) and an unsaved-changes flag.

mod document;
mod set;
mod source;

pub use document::Property;
pub use set::PropertySet;
pub use source::{Source, SourceKind};
