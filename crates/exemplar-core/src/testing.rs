//! Fixtures shared by the unit tests: a minimal framework and asset trees.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::catalog::ManifestEntry;
use crate::framework::{with_source_extension, Framework};

/// Framework with `.src` contracts, `.test` suites, an `a.cfg` build config and a
/// JSON `package.manifest`.
pub struct StubFramework;

impl Framework for StubFramework {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn display_name(&self) -> &'static str {
        "Stub framework"
    }

    fn marker_files(&self) -> &'static [&'static str] {
        &["a.cfg", "package.manifest"]
    }

    fn package_manifest(&self) -> &'static str {
        "package.manifest"
    }

    fn build_config(&self) -> &'static str {
        "a.cfg"
    }

    fn rewrite_build_config(&self, contents: &str) -> String {
        contents
            .lines()
            .filter(|line| !line.contains("placeholder"))
            .map(|line| format!("{line}\n"))
            .collect()
    }

    fn placeholder_files(&self) -> &'static [&'static str] {
        &["contracts/Placeholder.src", "test/Placeholder.test"]
    }

    fn copy_exclusions(&self) -> &'static [&'static str] {
        &["node_modules"]
    }

    fn declared_symbol(&self, source: &str) -> Option<String> {
        let mut tokens = source.split_whitespace();
        while let Some(token) = tokens.next() {
            if token == "contract" {
                return tokens
                    .next()
                    .map(|name| name.trim_end_matches('{').to_string());
            }
        }
        None
    }

    fn contract_destination(&self, symbol: &str) -> PathBuf {
        PathBuf::from("contracts").join(format!("{symbol}.src"))
    }

    fn test_destination(&self, symbol: &str, test_source: &Path) -> PathBuf {
        PathBuf::from("test").join(with_source_extension(symbol, test_source))
    }

    fn deploy_stub_path(&self, primary_symbol: &str) -> PathBuf {
        PathBuf::from("deploy").join(format!("{primary_symbol}.stub"))
    }

    fn deploy_stub_template(&self) -> &'static str {
        "deploy {{id}}:{{#each contracts}} {{this}}{{/each}}\n"
    }
}

pub fn write_source(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Assets for `Foo` and `Bar` plus two shared auxiliary files.
pub fn assets_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path(), "src/Foo.src", "contract Foo {}\n");
    write_source(dir.path(), "src/Foo.test", "test Foo\n");
    write_source(dir.path(), "src/Bar.src", "// helpers\ncontract Bar {}\n");
    write_source(dir.path(), "src/Bar.test", "test Bar\n");
    write_source(dir.path(), "shared/IShared.src", "interface IShared {}\n");
    write_source(dir.path(), "shared/mocks/Mock.src", "contract Mock {}\n");
    dir
}

/// Entry whose sources are `src/<symbol>.src` and `src/<symbol>.test`.
pub fn entry(id: &str, symbol: &str, auxiliary: &[&str], deps: &[(&str, &str)]) -> ManifestEntry {
    ManifestEntry {
        id: id.into(),
        primary_asset: PathBuf::from(format!("src/{symbol}.src")),
        test_asset: PathBuf::from(format!("src/{symbol}.test")),
        auxiliary_assets: auxiliary.iter().map(PathBuf::from).collect(),
        extra_dependencies: deps
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        display_title: symbol.into(),
        description: format!("The {symbol} example"),
        category: "basic".into(),
    }
}

/// A base template with one config file, placeholders, and excluded junk.
pub fn template_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path(), "a.cfg", "import placeholder\nsetting = 1\n");
    write_source(
        dir.path(),
        "package.manifest",
        r#"{"version": "1.0.0", "name": "template", "dependencies": {"base": "1"}}"#,
    );
    write_source(dir.path(), "contracts/Placeholder.src", "contract Placeholder {}\n");
    write_source(dir.path(), "test/Placeholder.test", "test Placeholder\n");
    write_source(dir.path(), "node_modules/junk/index.js", "junk\n");
    dir
}

/// An existing project: markers, a manifest with user dependencies, user code.
pub fn project_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path(), "a.cfg", "setting = 1\n");
    write_source(
        dir.path(),
        "package.manifest",
        r#"{
  "name": "user-project",
  "scripts": { "build": "make" },
  "dependencies": { "user-lib": "^4.0.0" }
}
"#,
    );
    write_source(dir.path(), "contracts/Mine.src", "contract Mine {}\n");
    dir
}

/// Relative paths of every file under `root`.
pub fn list_files(root: &Path) -> BTreeSet<PathBuf> {
    snapshot(root).into_keys().collect()
}

/// Every file under `root` with its contents, keyed by relative path.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
            (relative, std::fs::read(entry.path()).unwrap())
        })
        .collect()
}

/// Relative paths of every directory under `root`.
pub fn list_dirs(root: &Path) -> BTreeSet<PathBuf> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}
