//! A single `export NAME=value` declaration and its token operations
//!
//! Values are treated as whitespace-separated token sequences, the way JVM
//! option variables (`HADOOP_OPTS="-Xmx1g -Dfoo=bar"`) are usually written.

use std::path::{Path, PathBuf};

/// An exported variable bound to the physical line it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    name: String,
    value: String,
    comment: String,
    source: PathBuf,
    line: usize,
    dirty: bool,
}

impl EnvVar {
    pub(crate) fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        comment: impl Into<String>,
        source: &Path,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            comment: comment.into(),
            source: source.to_path_buf(),
            line,
            dirty: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Right-hand side of a commented-out declaration (`# export X=...`)
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// File this variable was parsed from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Zero-based line index in `source`; stale after external edits
    pub fn line_index(&self) -> usize {
        self.line
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Replace the whole value
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.dirty = true;
    }

    /// Add `token` at the end, space-separated unless the value is empty
    pub fn append(&mut self, token: &str) {
        let value = if self.value.is_empty() {
            token.to_string()
        } else {
            format!("{} {}", self.value, token)
        };
        self.set_value(value);
    }

    /// Add `token` at the start, space-separated unless the value is empty
    pub fn prepend(&mut self, token: &str) {
        let value = if self.value.is_empty() {
            token.to_string()
        } else {
            format!("{} {}", token, self.value)
        };
        self.set_value(value);
    }

    /// Replace every token starting with `prefix` by `token`; prepend
    /// `token` if no token matches.
    ///
    /// `update("-Xmx", "-Xmx1g")` turns `-Xmx512m $OPTS` into `-Xmx1g $OPTS`.
    pub fn update(&mut self, prefix: &str, token: &str) {
        let hits: Vec<(usize, usize)> = token_spans(&self.value)
            .into_iter()
            .filter(|&(start, end)| self.value[start..end].starts_with(prefix))
            .collect();
        if hits.is_empty() {
            self.prepend(token);
            return;
        }

        let mut value = self.value.clone();
        for &(start, end) in hits.iter().rev() {
            value.replace_range(start..end, token);
        }
        self.set_value(value);
    }

    /// Remove every whole-token occurrence of `token`. No-op (and the
    /// variable stays clean) if it does not occur.
    pub fn del(&mut self, token: &str) {
        let tokens: Vec<&str> = self.value.split_whitespace().collect();
        if !tokens.contains(&token) {
            return;
        }
        let kept: Vec<&str> = tokens.into_iter().filter(|t| *t != token).collect();
        self.set_value(kept.join(" "));
    }

    /// Canonical line written back for a modified variable
    pub fn to_export_line(&self) -> String {
        format!("export {}=\"{}\"", self.name, self.value)
    }
}

/// Byte ranges of whitespace-separated tokens in `s`
fn token_spans(s: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in s.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(b)) => {
                spans.push((b, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(b) = start {
        spans.push((b, s.len()));
    }
    spans
}
