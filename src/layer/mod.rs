//! Override-over-default layering
//!
//! Lookup precedence, from highest to lowest:
//! 1. Site override file of the first subsystem that answers
//! 2. Packaged default of that subsystem
//!
//! `ConfigLayer` pairs one override with one default; `MultiSourceConfig`
//! orders layers by subsystem.

mod config_layer;
mod multi;

pub use config_layer::ConfigLayer;
pub use multi::MultiSourceConfig;

use std::collections::BTreeSet;

use crate::property::Source;

/// Read side of the engine contract, shared by property sets and layers
pub trait ConfSource {
    /// Every key this source can answer for
    fn keys(&self) -> BTreeSet<String>;

    /// Value and provenance of `name`; `("", Source::none())` if absent
    fn source_get(&self, name: &str) -> (String, Source);

    /// Human-readable origin
    fn describe(&self) -> String;

    /// Value of `name`, or "" if absent
    fn get(&self, name: &str) -> String {
        self.source_get(name).0
    }
}
