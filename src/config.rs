//! Configuration schema for yardcheck.
//!
//! A configuration picks the collection style, the layout of generated
//! `@param` lines and which rules run at which severity.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::detect::{Rule, Severity};
use crate::types::StyleMode;

/// File names searched for when no configuration is given.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["yardcheck.yaml", ".yardcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Collection style enforced by `collection_style` and used for corrections.
    #[serde(default)]
    pub style: StyleMode,
    /// Layout of generated `@param` lines.
    #[serde(default)]
    pub prototype: PrototypeOrdering,
    /// Glob patterns for manifests to skip (e.g., "vendor/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Per-rule overrides keyed by rule name.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Whether `rule` runs (defaults to true).
    pub fn rule_enabled(&self, rule: Rule) -> bool {
        self.rules
            .get(rule.as_str())
            .map(|r| r.enabled)
            .unwrap_or(true)
    }

    /// Severity for `rule`, falling back to the rule's default.
    pub fn severity(&self, rule: Rule) -> Severity {
        self.rules
            .get(rule.as_str())
            .and_then(|r| r.severity)
            .unwrap_or_else(|| rule.default_severity())
    }

    /// Compile `excluded_paths` into one matcher.
    pub fn exclusion_set(&self) -> anyhow::Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            let glob = Glob::new(pattern).map_err(|e| {
                anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
            })?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }
}

/// Overrides for one rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub severity: Option<Severity>,
}

fn default_true() -> bool {
    true
}

/// Where the type list goes in a generated `@param` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrototypeOrdering {
    /// `@param [Type] name`
    #[default]
    TypeFirst,
    /// `@param name [Type]`
    NameFirst,
}

impl PrototypeOrdering {
    pub fn format(&self, name: &str, types: &str) -> String {
        match self {
            PrototypeOrdering::TypeFirst => format!("@param [{}] {}", types, name),
            PrototypeOrdering::NameFirst => format!("@param {} [{}]", name, types),
        }
    }
}

impl std::str::FromStr for PrototypeOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "type_first" => Ok(PrototypeOrdering::TypeFirst),
            "name_first" => Ok(PrototypeOrdering::NameFirst),
            _ => Err(format!("unknown prototype ordering: {}", s)),
        }
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    for name in config.rules.keys() {
        if Rule::parse(name).is_none() {
            let known: Vec<_> = Rule::ALL.iter().map(Rule::as_str).collect();
            anyhow::bail!("unknown rule {:?}, expected one of: {}", name, known.join(", "));
        }
    }

    config.exclusion_set()?;
    Ok(())
}

/// Find a configuration file in `dir`.
pub fn discover(dir: &Path) -> Option<std::path::PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
version: "1"
style: short
prototype: name_first
excluded_paths: ["vendor/**"]
rules:
  collection_style:
    enabled: false
  tag_type_position:
    severity: error
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.style, StyleMode::Short);
        assert_eq!(config.prototype, PrototypeOrdering::NameFirst);
        assert!(!config.rule_enabled(Rule::CollectionStyle));
        assert!(config.rule_enabled(Rule::TagTypePosition));
        assert_eq!(config.severity(Rule::TagTypePosition), Severity::Error);
        assert_eq!(config.severity(Rule::MeaninglessTag), Severity::Warning);
        validate(&config).unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.style, StyleMode::Long);
        assert_eq!(config.prototype, PrototypeOrdering::TypeFirst);
        assert_eq!(config.severity(Rule::TagTypeSyntax), Severity::Error);
        assert!(Rule::ALL.iter().all(|r| config.rule_enabled(*r)));
    }

    #[test]
    fn test_validate_rejects_unknown_rule() {
        let config: Config = serde_yaml::from_str("rules: { no_such_rule: {} }").unwrap();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("no_such_rule"));
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let config = Config {
            excluded_paths: vec!["vendor/[".to_string()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_exclusion_set_matches() {
        let config = Config {
            excluded_paths: vec!["vendor/**".to_string()],
            ..Default::default()
        };
        let set = config.exclusion_set().unwrap();
        assert!(set.is_match("vendor/gems/a.decl.yaml"));
        assert!(!set.is_match("lib/a.decl.yaml"));
    }

    #[test]
    fn test_prototype_format() {
        assert_eq!(
            PrototypeOrdering::TypeFirst.format("opts", "Hash{Symbol => Object}"),
            "@param [Hash{Symbol => Object}] opts"
        );
        assert_eq!(
            PrototypeOrdering::NameFirst.format("a", "Object, nil"),
            "@param a [Object, nil]"
        );
        assert_eq!(
            "name-first".parse::<PrototypeOrdering>().unwrap(),
            PrototypeOrdering::NameFirst
        );
    }

    #[test]
    fn test_discover() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(discover(temp.path()).is_none());
        std::fs::write(temp.path().join(".yardcheck.yaml"), "style: long\n").unwrap();
        assert_eq!(
            discover(temp.path()).unwrap(),
            temp.path().join(".yardcheck.yaml")
        );
    }
}
