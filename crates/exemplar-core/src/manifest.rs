//! Reading, merging and writing the JSON package manifest of a project.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ExemplarError, Result};

/// How one dependency changed during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyChange {
    Added {
        name: String,
        version: String,
    },
    Updated {
        name: String,
        previous: String,
        version: String,
    },
}

/// A package manifest held as a JSON object, key order preserved as read.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    root: Map<String, Value>,
}

impl PackageManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ExemplarError::ReadSource {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(path, &contents)
    }

    /// Load `path`, or start from an empty object if it does not exist.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self {
                path: path.to_path_buf(),
                root: Map::new(),
            })
        }
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(contents).map_err(|e| ExemplarError::ManifestParse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        match value {
            Value::Object(root) => Ok(Self {
                path: path.to_path_buf(),
                root,
            }),
            _ => Err(ExemplarError::ManifestParse {
                path: path.to_path_buf(),
                reason: "top-level value is not an object".into(),
            }),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.root.get("name").and_then(Value::as_str)
    }

    pub fn set_name(&mut self, name: &str) {
        self.root.insert("name".into(), Value::String(name.into()));
    }

    pub fn set_description(&mut self, description: &str) {
        self.root
            .insert("description".into(), Value::String(description.into()));
    }

    /// Declared dependencies in `section`.
    pub fn dependencies(&self, section: &str) -> BTreeMap<String, String> {
        self.root
            .get(section)
            .and_then(Value::as_object)
            .map(|deps| {
                deps.iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Add or update every dependency in `deps` under `section`. Nothing is ever
    /// removed. The section's keys end up sorted.
    pub fn merge_dependencies(
        &mut self,
        section: &str,
        deps: &BTreeMap<String, String>,
    ) -> Result<Vec<DependencyChange>> {
        let entry = self
            .root
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(existing) = entry else {
            return Err(ExemplarError::ManifestParse {
                path: self.path.clone(),
                reason: format!("'{section}' is not an object"),
            });
        };

        let mut changes = Vec::new();
        for (name, version) in deps {
            match existing.get(name).and_then(Value::as_str) {
                Some(current) if current == version => {}
                Some(current) => {
                    changes.push(DependencyChange::Updated {
                        name: name.clone(),
                        previous: current.to_string(),
                        version: version.clone(),
                    });
                    existing.insert(name.clone(), Value::String(version.clone()));
                }
                None => {
                    changes.push(DependencyChange::Added {
                        name: name.clone(),
                        version: version.clone(),
                    });
                    existing.insert(name.clone(), Value::String(version.clone()));
                }
            }
        }

        *existing = sorted(std::mem::take(existing));
        Ok(changes)
    }

    /// Pretty-printed, keys in their current order, trailing newline.
    pub fn to_pretty_string(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(&self.root).map_err(anyhow::Error::from)?;
        Ok(json + "\n")
    }

    /// Pretty-printed with every object's keys sorted, trailing newline.
    ///
    /// Identical manifests always serialize to identical bytes.
    pub fn to_canonical_string(&self) -> Result<String> {
        let canonical = canonicalize(Value::Object(self.root.clone()));
        let json = serde_json::to_string_pretty(&canonical).map_err(anyhow::Error::from)?;
        Ok(json + "\n")
    }
}

fn sorted(map: Map<String, Value>) -> Map<String, Value> {
    let mut entries: Vec<_> = map.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().collect()
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sorted(
            map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect(),
        )),
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
