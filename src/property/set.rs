//! Ordered, name-keyed property set with dirty tracking

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::document::{Document, Property};
use super::source::Source;
use crate::error::ConfigError;
use crate::layer::ConfSource;
use crate::persist;

/// An ordered set of properties parsed from one XML document.
///
/// Lookups return the first property with a matching name. Only sets backed
/// by a file path (`load`, `load_or_empty`) can be saved.
#[derive(Debug, Clone)]
pub struct PropertySet {
    properties: Vec<Property>,
    origin: Source,
    path: Option<PathBuf>,
    dirty: bool,
}

impl PropertySet {
    /// Create an empty, in-memory set
    pub fn empty(origin: Source) -> Self {
        Self {
            properties: Vec::new(),
            origin,
            path: None,
            dirty: false,
        }
    }

    /// Parse a document held in memory
    pub fn parse(text: &str, origin: Source) -> Result<Self, ConfigError> {
        let doc = Document::from_xml(text).map_err(|message| ConfigError::ParseError {
            path: origin.location.clone(),
            message,
        })?;
        Ok(Self {
            properties: doc.properties,
            origin,
            path: None,
            dirty: false,
        })
    }

    /// Load an existing site file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::io("reading", path, e))?;
        let mut set = Self::parse(&text, Source::local(path.to_string_lossy()))?;
        set.path = Some(path.to_path_buf());
        Ok(set)
    }

    /// Load a site file, or start an empty set bound to `path` if it does
    /// not exist yet. The file is only created by a later `save`.
    pub fn load_or_empty(path: &Path) -> Result<Self, ConfigError> {
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let mut set = Self::empty(Source::local(path.to_string_lossy()));
                set.path = Some(path.to_path_buf());
                Ok(set)
            }
            Err(e) => Err(ConfigError::io("reading", path, e)),
        }
    }

    fn find(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Value of `name`, if present (an explicitly empty value is `Some("")`)
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.find(name).map(|p| p.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Set `name` to `value`, appending a new property if absent.
    /// Returns the previous value ("" when newly created).
    pub fn set(&mut self, name: &str, value: &str) -> String {
        self.dirty = true;
        match self.properties.iter_mut().find(|p| p.name == name) {
            Some(prop) => std::mem::replace(&mut prop.value, value.to_string()),
            None => {
                self.properties.push(Property::new(name, value));
                String::new()
            }
        }
    }

    /// Add `name` only if no property by that name exists. Does not mark
    /// the set dirty; used to seed defaults.
    pub(crate) fn insert_missing(&mut self, name: &str, value: &str) {
        if !self.contains(name) {
            self.properties.push(Property::new(name, value));
        }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn origin(&self) -> &Source {
        &self.origin
    }

    /// Backing file, if this set was loaded from (or bound to) disk
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the backing file currently exists on disk
    pub fn exists_on_disk(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }

    /// Canonical indented XML encoding
    pub fn serialize(&self) -> Result<String, ConfigError> {
        let doc = Document {
            properties: self.properties.clone(),
        };
        doc.to_xml().map_err(|message| ConfigError::ParseError {
            path: self.origin.location.clone(),
            message,
        })
    }

    /// Write back to the backing file if anything changed.
    ///
    /// A clean set never touches the disk. With `backup`, an existing file
    /// is copied aside before being replaced.
    pub fn save(&mut self, backup: bool) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }
        let path = self.path.clone().ok_or_else(|| ConfigError::NotFound {
            what: format!("backing file for {}", self.origin),
            searched: "in-memory property set".to_string(),
        })?;

        let xml = self.serialize()?;
        if backup {
            persist::backup(&path).map_err(|e| ConfigError::io("backing up", &path, e))?;
        }
        persist::write_atomic(&path, xml.as_bytes())
            .map_err(|e| ConfigError::io("writing", &path, e))?;
        tracing::info!(path = %path.display(), properties = self.properties.len(), "saved property file");

        self.dirty = false;
        Ok(())
    }
}

impl ConfSource for PropertySet {
    fn keys(&self) -> BTreeSet<String> {
        self.properties.iter().map(|p| p.name.clone()).collect()
    }

    fn source_get(&self, name: &str) -> (String, Source) {
        match self.lookup(name) {
            Some(value) => (value.to_string(), self.origin.clone()),
            None => (String::new(), Source::none()),
        }
    }

    fn describe(&self) -> String {
        self.origin.location.clone()
    }
}
