// src/config.rs

use crate::core::error::InputError;
use crate::core::http_client::{
    HttpClientOptions, DEFAULT_MAX_REDIRECTS, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
use crate::core::knowledge_base::RuleCatalog;
use crate::core::report::OutputFormat;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 4;

/// A `KEY=DESCRIPTION` pair used to extend the rule catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleSpec {
    pub key: String,
    pub description: String,
}

impl FromStr for RuleSpec {
    type Err = InputError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (key, description) = raw
            .split_once('=')
            .ok_or_else(|| InputError::InvalidRuleSpec(raw.to_string()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(InputError::InvalidRuleSpec(raw.to_string()));
        }
        Ok(Self {
            key: key.to_string(),
            description: description.trim().to_string(),
        })
    }
}

/// Everything a scan run can be tuned with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub accept_invalid_certs: bool,
    pub concurrency: usize,
    pub user_agent: String,
    pub format: OutputFormat,
    pub extra_patterns: Vec<RuleSpec>,
    pub extra_indicators: Vec<RuleSpec>,
    pub ignored_indicators: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            accept_invalid_certs: true,
            concurrency: DEFAULT_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            format: OutputFormat::default(),
            extra_patterns: Vec::new(),
            extra_indicators: Vec::new(),
            ignored_indicators: Vec::new(),
        }
    }
}

impl ScanConfig {
    pub fn http_options(&self) -> HttpClientOptions {
        HttpClientOptions {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
            max_redirects: self.max_redirects,
            accept_invalid_certs: self.accept_invalid_certs,
            user_agent: self.user_agent.clone(),
        }
    }

    /// The built-in catalog with this config's additions and removals.
    pub fn catalog(&self) -> RuleCatalog {
        let mut catalog = RuleCatalog::default();
        for rule in &self.extra_patterns {
            catalog = catalog.with_sensitive_pattern(&rule.key, &rule.description);
        }
        for rule in &self.extra_indicators {
            catalog = catalog.with_vulnerability_indicator(&rule.key, &rule.description);
        }
        for key in &self.ignored_indicators {
            catalog = catalog.without_vulnerability_indicator(key);
        }
        catalog
    }
}
