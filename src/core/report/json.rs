// src/core/report/json.rs

use crate::core::error::ReportError;
use crate::core::models::{
    Finding, FindingCategory, RequestSummary, ResponseSummary, SecurityReport, Severity,
};
use crate::core::report::{vulnerability_summary, ReportFormatter};
use serde::Serialize;

/// Machine-readable encoding. Findings carry their derived severity.
#[derive(Debug, Clone, Copy)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Serialize)]
struct JsonFinding<'a> {
    category: FindingCategory,
    severity: Severity,
    subject: &'a str,
    detail: &'a str,
}

impl<'a> From<&'a Finding> for JsonFinding<'a> {
    fn from(finding: &'a Finding) -> Self {
        Self {
            category: finding.category,
            severity: finding.severity(),
            subject: &finding.subject,
            detail: &finding.detail,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    request: &'a RequestSummary,
    response: &'a ResponseSummary,
    findings: Vec<JsonFinding<'a>>,
    vulnerability_summary: Vec<String>,
    recommendations: &'a [String],
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &SecurityReport) -> Result<String, ReportError> {
        let document = JsonReport {
            request: &report.request,
            response: &report.response,
            findings: report.findings.iter().map(JsonFinding::from).collect(),
            vulnerability_summary: vulnerability_summary(report),
            recommendations: &report.recommendations,
        };
        let encoded = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{HttpMethod, RequestDescriptor, ResponseSnapshot};
    use crate::core::scanner::analyze;
    use serde_json::Value;

    #[test]
    fn encodes_findings_with_severity() {
        let request = RequestDescriptor::parse("http://example.com/", HttpMethod::Post).unwrap();
        let response = ResponseSnapshot::new(200, "OK").with_body("api_key=abc");
        let report = analyze(&request, &response);

        let encoded = JsonFormatter { pretty: false }.format(&report).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();

        assert_eq!(value["request"]["method"], "POST");
        assert_eq!(value["findings"][0]["category"], "InsecureProtocol");
        assert_eq!(value["findings"][0]["severity"], "Warning");

        let sensitive = value["findings"]
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["category"] == "SensitiveDataExposure")
            .unwrap();
        assert_eq!(sensitive["severity"], "Critical");
        assert_eq!(sensitive["subject"], "api_key");
        assert_eq!(value["recommendations"].as_array().unwrap().len(), 7);
    }
}
