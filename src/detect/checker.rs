//! Per-declaration check pipeline.

use once_cell::sync::OnceCell;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::{Config, PrototypeOrdering};
use crate::declaration::{DeclarationInfo, DeclarationKind};
use crate::docstring::extract_tags;
use crate::types::StyleMode;

use super::{
    check_meaningless_tags, check_mismatch_name, check_tag_position, check_tag_types, Finding,
    Rule, Severity,
};

/// Configuration resolved for the check pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    pub style: StyleMode,
    pub prototype: PrototypeOrdering,
    enabled: Vec<Rule>,
    severities: Vec<(Rule, Severity)>,
}

impl Settings {
    fn resolve(config: &Config) -> Self {
        Self {
            style: config.style,
            prototype: config.prototype,
            enabled: Rule::ALL
                .iter()
                .copied()
                .filter(|r| config.rule_enabled(*r))
                .collect(),
            severities: Rule::ALL.iter().map(|r| (*r, config.severity(*r))).collect(),
        }
    }

    pub fn is_enabled(&self, rule: Rule) -> bool {
        self.enabled.contains(&rule)
    }

    pub fn severity(&self, rule: Rule) -> Severity {
        self.severities
            .iter()
            .find(|(r, _)| *r == rule)
            .map(|(_, s)| *s)
            .unwrap_or_else(|| rule.default_severity())
    }
}

/// Runs every check against declarations.
pub struct Checker {
    config: Config,
    settings: OnceCell<Settings>,
}

impl Checker {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            settings: OnceCell::new(),
        }
    }

    /// Override the configured collection style.
    pub fn style(mut self, style: StyleMode) -> Self {
        self.config.style = style;
        self.settings = OnceCell::new();
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settings, resolved on first use.
    pub fn settings(&self) -> &Settings {
        self.settings.get_or_init(|| {
            debug!(style = %self.config.style, "resolving checker settings");
            Settings::resolve(&self.config)
        })
    }

    /// Check one declaration.
    ///
    /// Findings come in pipeline order (type lists, tag positions, then
    /// meaningless tags or argument reconciliation) and source order
    /// within each step.
    pub fn check_declaration(&self, decl: &DeclarationInfo) -> Vec<Finding> {
        let settings = self.settings();
        let tags = extract_tags(&decl.comments);
        trace!(declaration = %decl.name, tags = tags.len(), "checking declaration");

        let mut findings: Vec<Finding> = tags
            .iter()
            .flat_map(|tag| check_tag_types(tag, settings.style))
            .collect();
        findings.extend(check_tag_position(&decl.comments, &tags));
        match decl.kind {
            DeclarationKind::Method => {
                findings.extend(check_mismatch_name(decl, &tags, settings.prototype))
            }
            _ => findings.extend(check_meaningless_tags(decl, &tags)),
        }

        findings
            .into_iter()
            .filter(|f| settings.is_enabled(f.rule))
            .map(|mut f| {
                f.severity = settings.severity(f.rule);
                f
            })
            .collect()
    }

    /// Check declarations in parallel; results keep the input order.
    pub fn check_all(&self, decls: &[DeclarationInfo]) -> Vec<Vec<Finding>> {
        self.settings();
        decls
            .par_iter()
            .map(|decl| self.check_declaration(decl))
            .collect()
    }
}
