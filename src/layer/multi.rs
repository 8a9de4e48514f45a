//! Ordered collection of subsystem layers

use std::collections::BTreeSet;

use super::{ConfSource, ConfigLayer};
use crate::error::ConfigError;
use crate::property::Source;
use crate::subsystem::Subsystem;

/// Layers in fixed subsystem order.
///
/// Order decides which layer answers `source_get` and which layer
/// `set_if_exist` mutates.
#[derive(Debug, Clone, Default)]
pub struct MultiSourceConfig {
    layers: Vec<ConfigLayer>,
}

impl MultiSourceConfig {
    /// Build from layers; they are kept in subsystem order regardless of
    /// the order given.
    pub fn new(mut layers: Vec<ConfigLayer>) -> Self {
        layers.sort_by_key(ConfigLayer::subsystem);
        Self { layers }
    }

    pub fn layers(&self) -> &[ConfigLayer] {
        &self.layers
    }

    pub fn layer(&self, subsystem: Subsystem) -> Option<&ConfigLayer> {
        self.layers.iter().find(|l| l.subsystem() == subsystem)
    }

    pub fn layer_mut(&mut self, subsystem: Subsystem) -> Option<&mut ConfigLayer> {
        self.layers.iter_mut().find(|l| l.subsystem() == subsystem)
    }

    /// Set `name` in the first layer that currently has a non-empty value
    /// for it. Never creates a key: if no layer has one, nothing changes
    /// and `("", None)` is returned.
    ///
    /// A key whose value is empty everywhere counts as absent here.
    pub fn set_if_exist(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<(String, Option<Subsystem>), ConfigError> {
        for layer in self.layers.iter_mut() {
            if layer.get(name).is_empty() {
                continue;
            }
            let old = layer.set(name, value)?;
            return Ok((old, Some(layer.subsystem())));
        }
        Ok((String::new(), None))
    }

    pub fn is_dirty(&self) -> bool {
        self.layers.iter().any(ConfigLayer::is_dirty)
    }

    /// Save every layer's override in order.
    ///
    /// Stops at the first failure and returns it; layers before the failing
    /// one have already been written, so a save can be partial.
    pub fn save(&mut self, backup: bool) -> Result<(), ConfigError> {
        for layer in self.layers.iter_mut() {
            layer.save(backup)?;
        }
        Ok(())
    }
}

impl ConfSource for MultiSourceConfig {
    fn keys(&self) -> BTreeSet<String> {
        self.layers.iter().flat_map(|l| l.keys()).collect()
    }

    fn source_get(&self, name: &str) -> (String, Source) {
        self.layers
            .iter()
            .map(|l| l.source_get(name))
            .find(|(_, src)| !src.is_none())
            .unwrap_or_else(|| (String::new(), Source::none()))
    }

    fn describe(&self) -> String {
        self.layers
            .iter()
            .map(|l| format!("{}: {}", l.subsystem(), l.describe()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
