//! Built-in detection rule catalog
//!
//! One flat, ordered table across all supported languages. Order is stable:
//! when several rules match the same line, the earlier rule wins display
//! priority, though every match is kept. Extension is by appending entries,
//! either constructor functions here or user rule files at load time.

mod crypto;
mod injection;
pub mod loader;
mod secrets;
mod web;

use once_cell::sync::Lazy;
use std::path::Path;

pub use crypto::get_crypto_rules;
pub use injection::get_injection_rules;
pub use loader::{load_rule_file, RuleLoadError};
pub use secrets::get_secret_rules;
pub use web::get_web_rules;

use crate::domain::rule::Rule;

static BUILTIN_CATALOG: Lazy<RuleCatalog> = Lazy::new(|| RuleCatalog {
    rules: build_builtin_rules(),
});

fn build_builtin_rules() -> Vec<Rule> {
    let mut rules = Vec::new();
    rules.extend(get_injection_rules());
    rules.extend(get_secret_rules());
    rules.extend(get_crypto_rules());
    rules.extend(get_web_rules());
    rules
}

/// The full ordered rule table the pattern scanner runs against
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Process-wide built-in catalog, compiled once at first use
    pub fn builtin() -> &'static RuleCatalog {
        &BUILTIN_CATALOG
    }

    /// Built-in catalog plus rules appended from a user rule file
    pub fn with_rule_file<P: AsRef<Path>>(path: P) -> Result<RuleCatalog, RuleLoadError> {
        let mut rules = build_builtin_rules();
        rules.extend(load_rule_file(path)?);
        Ok(RuleCatalog { rules })
    }

    /// All rules in stable table order
    pub fn all_rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::reporting::classify_category;
    use std::collections::HashSet;

    #[test]
    fn builtin_catalog_not_empty() {
        assert!(RuleCatalog::builtin().len() >= 30);
    }

    #[test]
    fn unique_rule_ids() {
        let mut seen = HashSet::new();
        let duplicates: Vec<_> = RuleCatalog::builtin()
            .all_rules()
            .iter()
            .filter(|r| !seen.insert(r.id.clone()))
            .map(|r| r.id.clone())
            .collect();
        assert!(duplicates.is_empty(), "duplicate rule IDs: {:?}", duplicates);
    }

    #[test]
    fn all_rules_have_required_fields() {
        for rule in RuleCatalog::builtin().all_rules() {
            assert!(!rule.id.is_empty());
            assert!(!rule.message.is_empty(), "message empty for {}", rule.id);
            assert!(!rule.category.is_empty(), "category empty for {}", rule.id);
            assert!(rule.cwe_id.starts_with("CWE-"), "bad cwe_id for {}", rule.id);
            assert!(!rule.remediation.is_empty(), "remediation empty for {}", rule.id);
        }
    }

    #[test]
    fn every_rule_category_is_classified() {
        for rule in RuleCatalog::builtin().all_rules() {
            let entry = classify_category(&rule.category);
            assert!(
                entry.is_some(),
                "category {:?} of rule {} has no classification entry",
                rule.category,
                rule.id
            );
            assert_eq!(entry.unwrap().cwe_id, rule.cwe_id, "cwe mismatch for {}", rule.id);
        }
    }

    #[test]
    fn catalog_order_is_stable_across_builds() {
        let a: Vec<_> = build_builtin_rules().iter().map(|r| r.id.clone()).collect();
        let b: Vec<_> = build_builtin_rules().iter().map(|r| r.id.clone()).collect();
        assert_eq!(a, b);
    }
}
