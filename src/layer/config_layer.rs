//! One subsystem's override/default pair

use std::collections::BTreeSet;

use super::ConfSource;
use crate::error::ConfigError;
use crate::property::{PropertySet, Source};
use crate::subsystem::Subsystem;

/// A mutable site override on top of a read-only packaged default.
///
/// Either side may be absent. Writes always land in the override.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    subsystem: Subsystem,
    overrides: Option<PropertySet>,
    defaults: Option<PropertySet>,
}

impl ConfigLayer {
    pub fn new(
        subsystem: Subsystem,
        overrides: Option<PropertySet>,
        defaults: Option<PropertySet>,
    ) -> Self {
        Self {
            subsystem,
            overrides,
            defaults,
        }
    }

    pub fn subsystem(&self) -> Subsystem {
        self.subsystem
    }

    pub fn overrides(&self) -> Option<&PropertySet> {
        self.overrides.as_ref()
    }

    pub fn defaults(&self) -> Option<&PropertySet> {
        self.defaults.as_ref()
    }

    /// A layer with neither side cannot answer anything
    pub fn is_queryable(&self) -> bool {
        self.overrides.is_some() || self.defaults.is_some()
    }

    /// Write `value` into the override set and return the previously
    /// effective value (which may have come from the default).
    pub fn set(&mut self, name: &str, value: &str) -> Result<String, ConfigError> {
        let old = self.get(name);
        let overrides = self.overrides.as_mut().ok_or_else(|| ConfigError::NoOverride {
            subsystem: self.subsystem.to_string(),
        })?;
        overrides.set(name, value);
        Ok(old)
    }

    pub fn is_dirty(&self) -> bool {
        self.overrides.as_ref().is_some_and(PropertySet::is_dirty)
    }

    /// Persist the override set; a layer without one has nothing to save
    pub fn save(&mut self, backup: bool) -> Result<(), ConfigError> {
        match self.overrides.as_mut() {
            Some(overrides) => overrides.save(backup),
            None => Ok(()),
        }
    }
}

fn side_get(side: Option<&PropertySet>, name: &str) -> (String, Source) {
    match side {
        Some(set) => set.source_get(name),
        None => (String::new(), Source::none()),
    }
}

impl ConfSource for ConfigLayer {
    fn keys(&self) -> BTreeSet<String> {
        self.overrides
            .iter()
            .chain(self.defaults.iter())
            .flat_map(|set| set.keys())
            .collect()
    }

    /// An override only answers with a non-empty value; otherwise the
    /// default is consulted.
    fn source_get(&self, name: &str) -> (String, Source) {
        let (value, src) = side_get(self.overrides.as_ref(), name);
        if !value.is_empty() {
            return (value, src);
        }
        side_get(self.defaults.as_ref(), name)
    }

    fn describe(&self) -> String {
        let side = |set: Option<&PropertySet>| {
            set.map(|s| s.describe()).unwrap_or_else(|| "<none>".to_string())
        };
        format!(
            "{} default: {}",
            side(self.overrides.as_ref()),
            side(self.defaults.as_ref())
        )
    }
}
