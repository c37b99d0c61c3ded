// src/core/scanner/mod.rs

// The analysis engine. Each sub-module owns one family of checks; this file
// runs them in a fixed order and assembles the report.
pub mod body_scanner;
pub mod cookie_scanner;
pub mod headers_scanner;

use crate::core::knowledge_base::RuleCatalog;
use crate::core::models::{
    Finding, FindingCategory, RequestDescriptor, RequestSummary, ResponseSnapshot,
    ResponseSummary, SecurityReport,
};
use tracing::{debug, info};

pub const REMOVE_VERSION_HEADERS: &str = "Remove server/technology version headers";

/// Analyses one request/response pair against the built-in rule catalog.
///
/// Pure and deterministic: the same inputs always give an equal report.
pub fn analyze(request: &RequestDescriptor, response: &ResponseSnapshot) -> SecurityReport {
    analyze_with(RuleCatalog::builtin(), request, response)
}

/// Analyses one request/response pair against a caller-supplied catalog.
///
/// Checks run in this order, which is also the order of `findings`:
/// protocol, security headers, information disclosure, sensitive body
/// patterns, vulnerability indicators, cookies. Only the security-header
/// and information-disclosure checks produce recommendations.
///
/// # Arguments
/// * `catalog` - The rule tables to check against.
/// * `request` - The validated request that produced `response`.
/// * `response` - The snapshot returned by the HTTP client adapter.
///
/// # Returns
/// A `SecurityReport` with findings and de-duplicated recommendations.
pub fn analyze_with(
    catalog: &RuleCatalog,
    request: &RequestDescriptor,
    response: &ResponseSnapshot,
) -> SecurityReport {
    debug!(url = %request.url(), status = response.status_code, "Analyzing response.");
    let mut findings = Vec::new();
    let mut recommendations = Vec::new();

    findings.extend(check_protocol(request));

    let missing = headers_scanner::check_security_headers(catalog, &response.headers);
    for finding in &missing {
        push_unique(&mut recommendations, format!("Add {} header", finding.subject));
    }
    findings.extend(missing);

    let disclosed = headers_scanner::check_info_disclosure(catalog, &response.headers);
    if !disclosed.is_empty() {
        push_unique(&mut recommendations, REMOVE_VERSION_HEADERS.to_string());
    }
    findings.extend(disclosed);

    let body_lower = response.body_text().to_lowercase();
    findings.extend(body_scanner::check_sensitive_patterns(catalog, &body_lower));
    findings.extend(body_scanner::check_vulnerability_indicators(catalog, &body_lower));

    findings.extend(cookie_scanner::check_cookies(&response.cookies));

    info!(
        url = %request.url(),
        findings = findings.len(),
        recommendations = recommendations.len(),
        "Analysis finished."
    );

    SecurityReport {
        request: RequestSummary::from(request),
        response: ResponseSummary::from(response),
        findings,
        recommendations,
    }
}

fn check_protocol(request: &RequestDescriptor) -> Option<Finding> {
    if request.scheme() == "https" {
        return None;
    }
    debug!(scheme = request.scheme(), "Insecure protocol in use.");
    Some(Finding::new(
        FindingCategory::InsecureProtocol,
        request.scheme(),
        "insecure protocol in use",
    ))
}

fn push_unique(recommendations: &mut Vec<String>, recommendation: String) {
    if !recommendations.contains(&recommendation) {
        recommendations.push(recommendation);
    }
}
