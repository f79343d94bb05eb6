//! The manifest registry: a closed catalog of buildable examples and categories.
//!
//! A catalog is loaded once (usually from `catalog.json` under the assets root),
//! validated, and then only ever read. All lookups are by id; listings keep the
//! order the catalog declares.
//!
//! ## File format
//!
//! ```json
//! {
//!   "examples": [
//!     {
//!       "id": "fhe-counter",
//!       "title": "Encrypted counter",
//!       "description": "Increment and decrement an encrypted counter",
//!       "category": "basic",
//!       "contract": "contracts/basic/FHECounter.sol",
//!       "test": "test/basic/FHECounter.ts",
//!       "auxiliary": ["contracts/shared/Errors.sol"],
//!       "dependencies": { "@openzeppelin/contracts": "^5.0.2" }
//!     }
//!   ],
//!   "categories": [
//!     { "id": "basic", "name": "Basic examples", "examples": ["fhe-counter"] }
//!   ]
//! }
//! ```
//!
//! All asset paths are relative to the assets root.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ExemplarError, Result};

/// One buildable example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    /// Main contract source.
    #[serde(rename = "contract")]
    pub primary_asset: PathBuf,
    /// Test suite for the contract.
    #[serde(rename = "test")]
    pub test_asset: PathBuf,
    /// Shared files (interfaces, mocks) this example needs, in declaration order.
    #[serde(rename = "auxiliary", default, skip_serializing_if = "Vec::is_empty")]
    pub auxiliary_assets: Vec<PathBuf>,
    /// Package dependencies merged into the generated manifest.
    #[serde(rename = "dependencies", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_dependencies: BTreeMap<String, String>,
    #[serde(rename = "title", default)]
    pub display_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

/// A named, ordered group of examples built together into one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryManifest {
    pub id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    /// Example ids, in build order.
    pub examples: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    examples: Vec<ManifestEntry>,
    #[serde(default)]
    categories: Vec<CategoryManifest>,
}

/// Immutable, validated catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    examples: Vec<ManifestEntry>,
    categories: Vec<CategoryManifest>,
}

impl Catalog {
    /// Build a catalog, checking that ids are unique and every category is a
    /// non-empty list of known examples.
    pub fn new(examples: Vec<ManifestEntry>, categories: Vec<CategoryManifest>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &examples {
            if entry.id.is_empty() {
                return Err(ExemplarError::CatalogIntegrity(
                    "example with an empty id".into(),
                ));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ExemplarError::CatalogIntegrity(format!(
                    "duplicate example id '{}'",
                    entry.id
                )));
            }
        }

        let mut seen_categories = HashSet::new();
        for category in &categories {
            if !seen_categories.insert(category.id.as_str()) {
                return Err(ExemplarError::CatalogIntegrity(format!(
                    "duplicate category id '{}'",
                    category.id
                )));
            }
            if category.examples.is_empty() {
                return Err(ExemplarError::CatalogIntegrity(format!(
                    "category '{}' has no examples",
                    category.id
                )));
            }
            let mut members = HashSet::new();
            if let Some(repeated) = category.examples.iter().find(|id| !members.insert(id.as_str())) {
                return Err(ExemplarError::CatalogIntegrity(format!(
                    "category '{}' lists example '{repeated}' more than once",
                    category.id
                )));
            }
            if let Some(missing) = category.examples.iter().find(|id| !seen.contains(id.as_str())) {
                return Err(ExemplarError::CatalogIntegrity(format!(
                    "category '{}' references unknown example '{missing}'",
                    category.id
                )));
            }
        }

        Ok(Self {
            examples,
            categories,
        })
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ExemplarError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::from_json(&contents).map_err(|e| match e {
            ExemplarError::ConfigParse { source, .. } => ExemplarError::ConfigParse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate a catalog document.
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: CatalogFile =
            serde_json::from_str(contents).map_err(|e| ExemplarError::ConfigParse {
                path: PathBuf::from("<inline>"),
                source: e,
            })?;
        let catalog = Self::new(file.examples, file.categories)?;
        tracing::debug!(
            "catalog loaded: {} examples, {} categories",
            catalog.examples.len(),
            catalog.categories.len()
        );
        Ok(catalog)
    }

    pub fn examples(&self) -> &[ManifestEntry] {
        &self.examples
    }

    pub fn categories(&self) -> &[CategoryManifest] {
        &self.categories
    }

    /// Look up a single example.
    pub fn lookup_example(&self, id: &str) -> Result<&ManifestEntry> {
        self.examples
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ExemplarError::UnknownIdentifier {
                kind: "example",
                id: id.to_string(),
                available: self.examples.iter().map(|e| e.id.clone()).collect(),
            })
    }

    /// Look up a category.
    pub fn lookup_category(&self, id: &str) -> Result<&CategoryManifest> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ExemplarError::UnknownIdentifier {
                kind: "category",
                id: id.to_string(),
                available: self.categories.iter().map(|c| c.id.clone()).collect(),
            })
    }

    /// The entries of a category, in build order.
    pub fn category_entries(&self, category: &CategoryManifest) -> Result<Vec<&ManifestEntry>> {
        category
            .examples
            .iter()
            .map(|id| self.lookup_example(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"{
        "examples": [
            {
                "id": "foo",
                "title": "Foo",
                "category": "basic",
                "contract": "contracts/Foo.src",
                "test": "test/Foo.test",
                "dependencies": { "lib-a": "^1.0.0" }
            },
            {
                "id": "bar",
                "contract": "contracts/Bar.src",
                "test": "test/Bar.test",
                "auxiliary": ["shared/IBar.src"]
            }
        ],
        "categories": [
            { "id": "basic", "name": "Basic", "examples": ["bar", "foo"] }
        ]
    }"#;

    fn entry(id: &str) -> ManifestEntry {
        ManifestEntry {
            id: id.into(),
            primary_asset: PathBuf::from(format!("{id}.src")),
            test_asset: PathBuf::from(format!("{id}.test")),
            auxiliary_assets: vec![],
            extra_dependencies: BTreeMap::new(),
            display_title: String::new(),
            description: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.examples().len(), 2);
        let foo = catalog.lookup_example("foo").unwrap();
        assert_eq!(foo.primary_asset, PathBuf::from("contracts/Foo.src"));
        assert_eq!(foo.extra_dependencies["lib-a"], "^1.0.0");
        assert!(foo.auxiliary_assets.is_empty());
        let bar = catalog.lookup_example("bar").unwrap();
        assert_eq!(bar.auxiliary_assets, vec![PathBuf::from("shared/IBar.src")]);
    }

    #[test]
    fn test_category_entries_keep_declared_order() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let basic = catalog.lookup_category("basic").unwrap();
        let ids: Vec<_> = catalog
            .category_entries(basic)
            .unwrap()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["bar", "foo"]);
    }

    #[test]
    fn test_unknown_example_lists_available() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        match catalog.lookup_example("nope") {
            Err(ExemplarError::UnknownIdentifier { kind, id, available }) => {
                assert_eq!(kind, "example");
                assert_eq!(id, "nope");
                assert_eq!(available, vec!["foo".to_string(), "bar".to_string()]);
            }
            other => panic!("expected UnknownIdentifier, got {other:?}"),
        }
        assert!(matches!(
            catalog.lookup_category("nope"),
            Err(ExemplarError::UnknownIdentifier { kind: "category", .. })
        ));
    }

    #[test]
    fn test_duplicate_example_rejected() {
        let result = Catalog::new(vec![entry("a"), entry("a")], vec![]);
        assert!(matches!(result, Err(ExemplarError::CatalogIntegrity(_))));
    }

    #[test]
    fn test_empty_category_rejected() {
        let category = CategoryManifest {
            id: "empty".into(),
            display_name: "Empty".into(),
            examples: vec![],
        };
        let result = Catalog::new(vec![entry("a")], vec![category]);
        assert!(matches!(result, Err(ExemplarError::CatalogIntegrity(_))));
    }

    #[test]
    fn test_dangling_category_rejected() {
        let category = CategoryManifest {
            id: "c".into(),
            display_name: "C".into(),
            examples: vec!["a".into(), "missing".into()],
        };
        let err = Catalog::new(vec![entry("a")], vec![category]).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        match Catalog::load(&path) {
            Err(ExemplarError::ConfigParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ConfigParse, got {other:?}"),
        }
        assert!(matches!(
            Catalog::load(&dir.path().join("absent.json")),
            Err(ExemplarError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_repeated_category_member_rejected() {
        let result = Catalog::new(
            vec![entry("foo")],
            vec![CategoryManifest {
                id: "basic".into(),
                display_name: "Basic".into(),
                examples: vec!["foo".into(), "foo".into()],
            }],
        );
        match result {
            Err(ExemplarError::CatalogIntegrity(msg)) => assert!(msg.contains("more than once")),
            other => panic!("expected CatalogIntegrity, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();
        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.examples(), Catalog::from_json(CATALOG).unwrap().examples());
    }
}
