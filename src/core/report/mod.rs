// src/core/report/mod.rs

//! Renderers that turn a `SecurityReport` into output. The engine never
//! depends on this module, so new encodings can be added freely.

pub mod json;
pub mod text;

use crate::core::error::ReportError;
use crate::core::models::{FindingCategory, SecurityReport};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

pub use json::JsonFormatter;
pub use text::TextFormatter;

pub const INFO_DISCLOSURE_SUMMARY: &str = "Server/technology information disclosure";

pub trait ReportFormatter {
    fn format(&self, report: &SecurityReport) -> Result<String, ReportError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn ReportFormatter + Send + Sync> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter::default()),
        }
    }
}

/// The numbered "potential issues" list shared by every renderer.
///
/// Informational categories are left out and information-disclosure findings
/// collapse into a single entry at the position of the first one.
pub fn vulnerability_summary(report: &SecurityReport) -> Vec<String> {
    let mut summary = Vec::new();
    let mut disclosure_listed = false;
    for finding in &report.findings {
        if finding.category.is_informational() {
            continue;
        }
        if finding.category == FindingCategory::InformationDisclosure {
            if !disclosure_listed {
                summary.push(INFO_DISCLOSURE_SUMMARY.to_string());
                disclosure_listed = true;
            }
            continue;
        }
        summary.push(finding.summary_line());
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{HttpMethod, RequestDescriptor, ResponseSnapshot};
    use crate::core::scanner::analyze;

    #[test]
    fn format_names_parse_loosely() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn summary_collapses_disclosure_and_skips_informational() {
        let request = RequestDescriptor::parse("http://example.com", HttpMethod::Get).unwrap();
        let response = ResponseSnapshot::new(200, "OK")
            .with_header("Server", "nginx")
            .with_header("X-Powered-By", "PHP")
            .with_body("debug mode");
        let report = analyze(&request, &response);

        let summary = vulnerability_summary(&report);
        // 7 missing headers + 1 collapsed disclosure entry.
        assert_eq!(summary.len(), 8);
        assert_eq!(summary[7], INFO_DISCLOSURE_SUMMARY);
        assert!(summary.iter().all(|line| !line.contains("debug")));
    }
}
