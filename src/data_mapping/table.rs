use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{info, warn};

use crate::errors::MappingError;

/// A single remap rule from the mapping file
///
/// `key` is a tag name (`tvg-logo`, `group-title`, ...) or the literal
/// `name` for the display name; `name` is the original track name the rule
/// applies to; `want` is the replacement value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub want: String,
}

impl MappingRule {
    pub fn new<K: Into<String>, N: Into<String>, W: Into<String>>(key: K, name: N, want: W) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            want: want.into(),
        }
    }

    fn matches(&self, key: &str, name: &str) -> bool {
        loose_eq(&self.key, key) && loose_eq(&self.name, name)
    }
}

/// Case-insensitive comparison ignoring surrounding whitespace
fn loose_eq(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Ordered remap rules, read-only once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    rules: Vec<MappingRule>,
}

/// How much of a mapping file could be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingLoadOutcome {
    /// Every entry was a valid rule (an empty file counts as complete)
    Complete,
    /// Some entries were not valid rules and were left out
    Partial { skipped: usize, errors: Vec<String> },
    /// The document was not a list of rules; the table is empty
    Unreadable(String),
}

/// Result of loading a mapping file: the usable table plus what went wrong
#[derive(Debug, Clone)]
pub struct MappingLoad {
    pub table: MappingTable,
    pub outcome: MappingLoadOutcome,
}

impl MappingTable {
    pub fn new(rules: Vec<MappingRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// `want` of the first rule matching `key` and `name`, or `""`
    pub fn get(&self, key: &str, name: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.matches(key, name))
            .map(|rule| rule.want.as_str())
            .unwrap_or("")
    }

    /// Load rules from a YAML file
    ///
    /// Only a missing or unreadable file is an error. Malformed content is
    /// logged and reported through [`MappingLoad::outcome`], with whatever
    /// rules could be salvaged.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<MappingLoad, MappingError> {
        let path = path.as_ref();
        let contents = match std::fs::read(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MappingError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(MappingError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        let load = Self::parse(&contents);
        match &load.outcome {
            MappingLoadOutcome::Complete => {
                info!(
                    "Loaded {} mapping rules from {}",
                    load.table.len(),
                    path.display()
                );
            }
            MappingLoadOutcome::Partial { skipped, errors } => {
                for error in errors {
                    warn!("Ignoring mapping entry in {}: {}", path.display(), error);
                }
                warn!(
                    "Loaded {} mapping rules from {}, skipped {} invalid entries",
                    load.table.len(),
                    path.display(),
                    skipped
                );
            }
            MappingLoadOutcome::Unreadable(reason) => {
                warn!(
                    "Mapping file {} could not be parsed, continuing without rules: {}",
                    path.display(),
                    reason
                );
            }
        }
        Ok(load)
    }

    /// Parse YAML content into a table, salvaging every valid entry
    pub fn parse(contents: &[u8]) -> MappingLoad {
        let document: Value = match serde_yaml::from_slice(contents) {
            Ok(document) => document,
            Err(e) => return MappingLoad::unreadable(e.to_string()),
        };

        let items = match document {
            Value::Null => return MappingLoad::complete(Vec::new()),
            Value::Sequence(items) => items,
            other => {
                return MappingLoad::unreadable(format!(
                    "expected a list of rules, found {}",
                    describe(&other)
                ));
            }
        };

        let mut rules = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (position, item) in items.into_iter().enumerate() {
            match serde_yaml::from_value::<MappingRule>(item) {
                Ok(rule) => rules.push(rule),
                Err(e) => errors.push(format!("entry {position}: {e}")),
            }
        }

        if errors.is_empty() {
            MappingLoad::complete(rules)
        } else {
            MappingLoad {
                table: MappingTable::new(rules),
                outcome: MappingLoadOutcome::Partial {
                    skipped: errors.len(),
                    errors,
                },
            }
        }
    }
}

impl MappingLoad {
    fn complete(rules: Vec<MappingRule>) -> Self {
        Self {
            table: MappingTable::new(rules),
            outcome: MappingLoadOutcome::Complete,
        }
    }

    fn unreadable(reason: String) -> Self {
        Self {
            table: MappingTable::default(),
            outcome: MappingLoadOutcome::Unreadable(reason),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
