//! Declaration manifests: the host's hand-off format.
//!
//! A manifest lists the documented declarations of one source file, with
//! their parameters and preceding comment lines already extracted:
//!
//! ```yaml
//! file: lib/foo.rb
//! declarations:
//!   - kind: method
//!     name: bar
//!     line: 3
//!     parameters:
//!       - { name: opts, kind: optional, default: "{}" }
//!     comments:
//!       - { line: 2, column: 2, text: "# @param [Hash] opts" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::declaration::DeclarationInfo;
use crate::detect::{CheckResult, Checker, FileFindings};

/// Suffixes a manifest file name must end with.
pub const MANIFEST_SUFFIXES: [&str; 3] = [".decl.yaml", ".decl.yml", ".decl.json"];

/// Errors that can occur while loading a manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The declarations of one source file.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Source file the declarations came from.
    pub file: String,
    #[serde(default)]
    pub declarations: Vec<DeclarationInfo>,
}

impl Manifest {
    /// Load a manifest, choosing JSON or YAML by extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(|source| ManifestError::Json {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_yaml::from_str(&content).map_err(|source| ManifestError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        }
    }
}

pub fn is_manifest(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    MANIFEST_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Collect manifests under `root`, skipping hidden directories and
/// paths matched by `excluded`.
pub fn collect_manifests(root: &Path, excluded: &GlobSet) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_manifest(entry.path()) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if excluded.is_match(relative) {
            debug!(path = %relative.display(), "excluded");
            continue;
        }
        files.push(entry.path().to_path_buf());
    }

    Ok(files)
}

/// Loads manifests and runs the checker over them.
pub struct Runner {
    checker: Checker,
}

impl Runner {
    pub fn new(checker: Checker) -> Self {
        Self { checker }
    }

    pub fn from_config(config: Config) -> Self {
        Self::new(Checker::new(config))
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    /// Check every manifest. Unreadable manifests are logged, recorded in
    /// `skipped` and do not stop the run.
    pub fn run(&self, manifests: &[PathBuf]) -> CheckResult {
        let mut result = CheckResult::new();

        for path in manifests {
            let manifest = match Manifest::load(path) {
                Ok(m) => m,
                Err(e) => {
                    warn!("skipping manifest: {}", e);
                    result.skipped.push(path.display().to_string());
                    continue;
                }
            };
            debug!(
                file = %manifest.file,
                declarations = manifest.declarations.len(),
                "checking manifest"
            );

            result.merge(self.check_manifest(&manifest));
        }

        info!(
            manifests = manifests.len(),
            declarations = result.scanned,
            findings = result.finding_count(),
            "check complete"
        );
        result
    }

    pub fn check_manifest(&self, manifest: &Manifest) -> CheckResult {
        let findings = self
            .checker
            .check_all(&manifest.declarations)
            .into_iter()
            .flatten()
            .collect();
        CheckResult {
            files: vec![FileFindings {
                file: manifest.file.clone(),
                findings,
            }],
            scanned: manifest.declarations.len(),
            skipped: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::{DeclarationKind, DefaultLiteral, ParameterKind};
    use crate::detect::Rule;
    use tempfile::TempDir;

    const YAML: &str = r##"
file: lib/foo.rb
declarations:
  - kind: method
    name: bar
    line: 3
    column: 2
    parameters:
      - { name: strings, kind: required }
      - { name: opts, kind: optional, default: "{}" }
      - { kind: block }
    comments:
      - { line: 2, column: 2, text: "# @param [String] strings" }
  - kind: class
    name: Foo
    comments:
      - { line: 6, text: "# @param [String] foo" }
"##;

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("foo.decl.yaml");
        fs::write(&path, YAML).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.file, "lib/foo.rb");
        assert_eq!(manifest.declarations.len(), 2);
        let bar = &manifest.declarations[0];
        assert_eq!(bar.kind, DeclarationKind::Method);
        assert_eq!(bar.parameters[1].default, Some(DefaultLiteral::Hash));
        assert_eq!(bar.parameters[2].kind, ParameterKind::Block);
        assert!(bar.comments.lines[0].leading);
        assert_eq!(manifest.declarations[1].comments.lines[0].column, 0);
    }

    #[test]
    fn test_load_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("foo.decl.json");
        fs::write(
            &path,
            r##"{"file": "a.rb", "declarations": [{"kind": "module", "name": "A",
                "comments": [{"line": 1, "text": "# @option o [String] k", "leading": true}]}]}"##,
        )
        .unwrap();
        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.declarations[0].kind, DeclarationKind::Module);
    }

    #[test]
    fn test_load_errors() {
        let temp = TempDir::new().unwrap();
        let missing = Manifest::load(temp.path().join("none.decl.yaml")).unwrap_err();
        assert!(matches!(missing, ManifestError::Io { .. }));

        let bad = temp.path().join("bad.decl.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            Manifest::load(&bad).unwrap_err(),
            ManifestError::Json { .. }
        ));
    }

    #[test]
    fn test_collect_manifests() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("lib/a.decl.yaml"), YAML).unwrap();
        fs::write(root.join("lib/b.decl.json"), "{}").unwrap();
        fs::write(root.join("lib/notes.yaml"), "").unwrap();
        fs::write(root.join("vendor/c.decl.yml"), YAML).unwrap();
        fs::write(root.join(".cache/d.decl.yaml"), YAML).unwrap();

        let config = Config {
            excluded_paths: vec!["vendor/**".to_string()],
            ..Default::default()
        };
        let files = collect_manifests(root, &config.exclusion_set().unwrap()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.decl.yaml", "b.decl.json"]);
    }

    #[test]
    fn test_runner_continues_past_bad_manifest() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.decl.yaml");
        let bad = temp.path().join("bad.decl.yaml");
        fs::write(&good, YAML).unwrap();
        fs::write(&bad, "declarations: [").unwrap();

        let result = Runner::from_config(Config::default()).run(&[bad.clone(), good]);
        assert_eq!(result.skipped, vec![bad.display().to_string()]);
        assert_eq!(result.scanned, 2);
        let rules: Vec<_> = result.findings().map(|(_, f)| f.rule).collect();
        assert_eq!(rules, vec![Rule::UndocumentedArgument, Rule::MeaninglessTag]);
    }
}
