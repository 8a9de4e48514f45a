//! One shell environment file (`hadoop-env.sh`, `yarn-env.sh`, ...)

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;

use super::var::EnvVar;
use super::EnvError;
use crate::persist;

fn export_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(#?)\s*export\s+([A-Z0-9_]+)=(.*)$").expect("export pattern is valid")
    })
}

/// Parse one line (without its terminator) as an export declaration.
///
/// Double quotes around the whole value are stripped; anything else,
/// including `$VAR` and `${...}` expansions, is kept verbatim. A
/// commented-out declaration yields an empty value with the right-hand
/// side kept as the comment.
pub fn parse_export(source: &Path, line: usize, text: &str) -> Option<EnvVar> {
    let caps = export_line().captures(text)?;
    let commented = &caps[1] == "#";
    let name = &caps[2];
    let mut value = &caps[3];
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value = &value[1..value.len() - 1];
    }

    Some(if commented {
        EnvVar::new(name, "", value, source, line)
    } else {
        EnvVar::new(name, value, "", source, line)
    })
}

/// Split on '\n' keeping terminators, so lines can be re-emitted verbatim
fn physical_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    bytes.split_inclusive(|b| *b == b'\n')
}

/// Strip a trailing "\n" or "\r\n"
fn content_of(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parsed environment file: its exported variables in line order
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    vars: Vec<EnvVar>,
}

impl EnvFile {
    pub fn load(path: &Path) -> Result<Self, EnvError> {
        let bytes = fs::read(path).map_err(|e| EnvError::io("reading", path, e))?;
        Self::parse(path, &bytes)
    }

    /// Parse `bytes` as though they were read from `path`.
    ///
    /// Lines that are not valid UTF-8 are skipped and kept verbatim on save,
    /// unless they hold an active export, which is a parse error.
    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Self, EnvError> {
        let mut vars = Vec::new();
        for (i, line) in physical_lines(bytes).enumerate() {
            let content = content_of(line);
            match std::str::from_utf8(content) {
                Ok(text) => vars.extend(parse_export(path, i, text)),
                Err(e) => {
                    let lossy = String::from_utf8_lossy(content);
                    if export_line().captures(&lossy).is_some_and(|caps| &caps[1] != "#") {
                        return Err(EnvError::ParseError {
                            path: path.to_path_buf(),
                            line: Some(i + 1),
                            message: e.to_string(),
                        });
                    }
                    tracing::debug!(path = %path.display(), line = i + 1, "skipping non-UTF-8 line");
                }
            }
        }
        Ok(Self {
            path: path.to_path_buf(),
            vars,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn vars(&self) -> &[EnvVar] {
        &self.vars
    }

    /// First variable named `name`
    pub fn get(&self, name: &str) -> Option<&EnvVar> {
        self.vars.iter().find(|v| v.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut EnvVar> {
        self.vars.iter_mut().find(|v| v.name() == name)
    }

    /// Variable names in line order (duplicates possible)
    pub fn keys(&self) -> Vec<String> {
        self.vars.iter().map(|v| v.name().to_string()).collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.vars.iter().any(EnvVar::is_dirty)
    }

    /// Rewrite the lines of modified variables, leaving every other byte of
    /// the file as it is on disk now.
    ///
    /// The file is re-read, so edits to unrelated lines made since loading
    /// survive. If a modified variable's line no longer declares it, the
    /// file is left untouched and `StaleLine` is returned. Without changes
    /// nothing is written.
    pub fn save(&mut self, backup: bool) -> Result<(), EnvError> {
        if !self.is_dirty() {
            return Ok(());
        }
        let original = fs::read(&self.path).map_err(|e| EnvError::io("reading", &self.path, e))?;

        let mut out = Vec::with_capacity(original.len());
        let mut written = 0usize;
        for (i, line) in physical_lines(&original).enumerate() {
            let replacement = self.vars.iter().find(|v| v.is_dirty() && v.line_index() == i);
            let Some(var) = replacement else {
                out.extend_from_slice(line);
                continue;
            };

            let content = content_of(line);
            let current = std::str::from_utf8(content)
                .ok()
                .and_then(|text| parse_export(&self.path, i, text));
            if current.as_ref().map(EnvVar::name) != Some(var.name()) {
                return Err(EnvError::StaleLine {
                    path: self.path.clone(),
                    line: i + 1,
                    name: var.name().to_string(),
                });
            }

            out.extend_from_slice(var.to_export_line().as_bytes());
            out.extend_from_slice(&line[content.len()..]);
            written += 1;
        }

        if let Some(var) = self.vars.iter().find(|v| {
            v.is_dirty() && physical_lines(&original).nth(v.line_index()).is_none()
        }) {
            return Err(EnvError::StaleLine {
                path: self.path.clone(),
                line: var.line_index() + 1,
                name: var.name().to_string(),
            });
        }

        if backup {
            persist::backup(&self.path).map_err(|e| EnvError::io("backing up", &self.path, e))?;
        }
        persist::write_atomic(&self.path, &out).map_err(|e| EnvError::io("writing", &self.path, e))?;
        tracing::info!(path = %self.path.display(), lines = written, "saved env file");

        for var in self.vars.iter_mut() {
            var.mark_clean();
        }
        Ok(())
    }
}
