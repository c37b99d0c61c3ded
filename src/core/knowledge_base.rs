//! The rule catalog: static, read-only tables that drive every check the
//! analysis engine performs.
//!
//! The built-in catalog is compiled into the binary and built once on first
//! use. Callers that need a different rule set derive an owned copy with the
//! `with_*` / `without_*` methods; the shared built-in value is never touched.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// One catalog entry: a header name or body substring plus what it means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    key: Cow<'static, str>,
    description: Cow<'static, str>,
}

impl Rule {
    fn builtin(key: &'static str, description: &'static str) -> Self {
        Self {
            key: Cow::Borrowed(key),
            description: Cow::Borrowed(description),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Headers whose presence is a recognised defence.
static SECURITY_HEADERS: &[(&str, &str)] = &[
    ("Strict-Transport-Security", "HSTS - Forces HTTPS connections"),
    ("Content-Security-Policy", "CSP - Prevents XSS and injection attacks"),
    ("X-Frame-Options", "Clickjacking protection"),
    ("X-Content-Type-Options", "MIME-sniffing protection"),
    ("X-XSS-Protection", "XSS filter (legacy)"),
    ("Permissions-Policy", "Controls browser features"),
    ("Referrer-Policy", "Controls referrer information leakage"),
];

/// Headers that leak server or framework identity.
static INFO_DISCLOSURE_HEADERS: &[&str] = &[
    "Server",
    "X-Powered-By",
    "X-AspNet-Version",
    "X-AspNetMvc-Version",
    "X-Generator",
];

// Keys are lowercase; they are matched against the lower-cased body.
static SENSITIVE_BODY_PATTERNS: &[(&str, &str)] = &[
    ("password", "Password field in response"),
    ("api_key", "API key exposure"),
    ("secret", "Secret value exposure"),
    ("token", "Token in response body"),
    ("private_key", "Private key exposure"),
    ("access_token", "Access token in response"),
    ("authorization", "Authorization data in response"),
];

static VULNERABILITY_INDICATORS: &[(&str, &str)] = &[
    ("error", "Error messages may leak information"),
    ("exception", "Exception details exposed"),
    ("stack trace", "Stack traces in response"),
    ("debug", "Debug information exposed"),
    ("admin", "Admin functionality accessible"),
    ("root", "Root paths exposed"),
    ("sql", "Potential SQL error messages"),
];

static BUILTIN: Lazy<RuleCatalog> = Lazy::new(|| RuleCatalog {
    security_headers: SECURITY_HEADERS
        .iter()
        .map(|&(key, desc)| Rule::builtin(key, desc))
        .collect(),
    info_disclosure_headers: INFO_DISCLOSURE_HEADERS
        .iter()
        .map(|name| Cow::Borrowed(*name))
        .collect(),
    sensitive_body_patterns: SENSITIVE_BODY_PATTERNS
        .iter()
        .map(|&(key, desc)| Rule::builtin(key, desc))
        .collect(),
    vulnerability_indicators: VULNERABILITY_INDICATORS
        .iter()
        .map(|&(key, desc)| Rule::builtin(key, desc))
        .collect(),
});

/// The four rule tables. Iteration order is declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCatalog {
    security_headers: Vec<Rule>,
    info_disclosure_headers: Vec<Cow<'static, str>>,
    sensitive_body_patterns: Vec<Rule>,
    vulnerability_indicators: Vec<Rule>,
}

impl Default for RuleCatalog {
    fn default() -> Self {
        RuleCatalog::builtin().clone()
    }
}

impl RuleCatalog {
    /// The compiled-in catalog shared by the whole process.
    pub fn builtin() -> &'static RuleCatalog {
        &BUILTIN
    }

    pub fn security_headers(&self) -> &[Rule] {
        &self.security_headers
    }

    pub fn info_disclosure_headers(&self) -> impl Iterator<Item = &str> {
        self.info_disclosure_headers.iter().map(|name| name.as_ref())
    }

    pub fn sensitive_body_patterns(&self) -> &[Rule] {
        &self.sensitive_body_patterns
    }

    pub fn vulnerability_indicators(&self) -> &[Rule] {
        &self.vulnerability_indicators
    }

    pub fn security_header(&self, name: &str) -> Option<&Rule> {
        self.security_headers
            .iter()
            .find(|rule| rule.key.eq_ignore_ascii_case(name))
    }

    pub fn is_info_disclosure_header(&self, name: &str) -> bool {
        self.info_disclosure_headers
            .iter()
            .any(|header| header.eq_ignore_ascii_case(name))
    }

    pub fn sensitive_pattern(&self, key: &str) -> Option<&Rule> {
        find_by_key(&self.sensitive_body_patterns, key)
    }

    pub fn vulnerability_indicator(&self, key: &str) -> Option<&Rule> {
        find_by_key(&self.vulnerability_indicators, key)
    }

    /// Adds a sensitive body pattern, or replaces the description of an
    /// existing one.
    pub fn with_sensitive_pattern(mut self, key: &str, description: &str) -> Self {
        upsert(&mut self.sensitive_body_patterns, key, description);
        self
    }

    pub fn without_sensitive_pattern(mut self, key: &str) -> Self {
        remove(&mut self.sensitive_body_patterns, key);
        self
    }

    /// Adds a vulnerability indicator, or replaces the description of an
    /// existing one.
    pub fn with_vulnerability_indicator(mut self, key: &str, description: &str) -> Self {
        upsert(&mut self.vulnerability_indicators, key, description);
        self
    }

    pub fn without_vulnerability_indicator(mut self, key: &str) -> Self {
        remove(&mut self.vulnerability_indicators, key);
        self
    }
}

fn find_by_key<'a>(rules: &'a [Rule], key: &str) -> Option<&'a Rule> {
    let key = key.to_lowercase();
    rules.iter().find(|rule| rule.key == key)
}

fn upsert(rules: &mut Vec<Rule>, key: &str, description: &str) {
    let key = key.trim().to_lowercase();
    if key.is_empty() {
        debug!("Ignoring empty rule key.");
        return;
    }
    match rules.iter_mut().find(|rule| rule.key == key) {
        Some(rule) => rule.description = Cow::Owned(description.to_string()),
        None => rules.push(Rule {
            key: Cow::Owned(key),
            description: Cow::Owned(description.to_string()),
        }),
    }
}

fn remove(rules: &mut Vec<Rule>, key: &str) {
    let key = key.trim().to_lowercase();
    rules.retain(|rule| rule.key != key);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_have_expected_sizes() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(catalog.security_headers().len(), 7);
        assert_eq!(catalog.info_disclosure_headers().count(), 5);
        assert_eq!(catalog.sensitive_body_patterns().len(), 7);
        assert_eq!(catalog.vulnerability_indicators().len(), 7);
    }

    #[test]
    fn iteration_follows_declaration_order() {
        let names: Vec<&str> = RuleCatalog::builtin()
            .security_headers()
            .iter()
            .map(Rule::key)
            .collect();
        assert_eq!(names.first(), Some(&"Strict-Transport-Security"));
        assert_eq!(names.last(), Some(&"Referrer-Policy"));
    }

    #[test]
    fn lookups_ignore_case() {
        let catalog = RuleCatalog::builtin();
        assert_eq!(
            catalog.security_header("x-frame-options").map(Rule::description),
            Some("Clickjacking protection")
        );
        assert!(catalog.is_info_disclosure_header("x-powered-by"));
        assert!(catalog.sensitive_pattern("API_KEY").is_some());
        assert!(catalog.vulnerability_indicator("Stack Trace").is_some());
    }

    #[test]
    fn derived_catalog_leaves_builtin_untouched() {
        let custom = RuleCatalog::default()
            .with_sensitive_pattern("SSN", "Social security number")
            .without_vulnerability_indicator("admin")
            .with_vulnerability_indicator("  ", "ignored");

        assert_eq!(custom.sensitive_body_patterns().len(), 8);
        assert_eq!(custom.sensitive_pattern("ssn").map(Rule::key), Some("ssn"));
        assert_eq!(custom.vulnerability_indicators().len(), 6);

        let builtin = RuleCatalog::builtin();
        assert!(builtin.sensitive_pattern("ssn").is_none());
        assert!(builtin.vulnerability_indicator("admin").is_some());
    }

    #[test]
    fn upsert_replaces_existing_description() {
        let custom = RuleCatalog::default().with_sensitive_pattern("token", "Bearer token");
        assert_eq!(custom.sensitive_body_patterns().len(), 7);
        assert_eq!(
            custom.sensitive_pattern("token").map(Rule::description),
            Some("Bearer token")
        );
    }
}
