// src/core/scanner/body_scanner.rs

use crate::core::knowledge_base::{Rule, RuleCatalog};
use crate::core::models::{Finding, FindingCategory};
use tracing::debug;

/// Substring scan of an already lower-cased body. Each rule fires at most
/// once, however often its key repeats.
fn scan(rules: &[Rule], body_lower: &str, category: FindingCategory) -> Vec<Finding> {
    rules
        .iter()
        .filter(|rule| body_lower.contains(rule.key()))
        .inspect(|rule| debug!(pattern = rule.key(), %category, "Body pattern matched."))
        .map(|rule| Finding::new(category, rule.key(), rule.description()))
        .collect()
}

/// Looks for each sensitive pattern in the body.
///
/// # Arguments
/// * `catalog` - Supplies the sensitive pattern table.
/// * `body_lower` - The decoded body, already lower-cased by the caller.
///
/// # Returns
/// At most one `SensitiveDataExposure` finding per pattern, in catalog order.
pub fn check_sensitive_patterns(catalog: &RuleCatalog, body_lower: &str) -> Vec<Finding> {
    scan(
        catalog.sensitive_body_patterns(),
        body_lower,
        FindingCategory::SensitiveDataExposure,
    )
}

pub fn check_vulnerability_indicators(catalog: &RuleCatalog, body_lower: &str) -> Vec<Finding> {
    scan(
        catalog.vulnerability_indicators(),
        body_lower,
        FindingCategory::VulnerabilityIndicator,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_pattern_fires_once() {
        let body = "password password password";
        let findings = check_sensitive_patterns(RuleCatalog::builtin(), body);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].subject, "password");
    }

    #[test]
    fn overlapping_keys_fire_independently() {
        // "access_token" also contains "token".
        let findings = check_sensitive_patterns(RuleCatalog::builtin(), r#"{"access_token":"x"}"#);
        let subjects: Vec<&str> = findings.iter().map(|f| f.subject.as_str()).collect();
        assert_eq!(subjects, vec!["token", "access_token"]);
    }

    #[test]
    fn indicators_keep_known_false_positives() {
        let findings =
            check_vulnerability_indicators(RuleCatalog::builtin(), "contact the site admin");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, FindingCategory::VulnerabilityIndicator);
        assert_eq!(findings[0].subject, "admin");
    }

    #[test]
    fn empty_body_matches_nothing() {
        assert!(check_sensitive_patterns(RuleCatalog::builtin(), "").is_empty());
        assert!(check_vulnerability_indicators(RuleCatalog::builtin(), "").is_empty());
    }
}
