// src/core/report/text.rs

use crate::core::error::ReportError;
use crate::core::models::{Cookie, Finding, FindingCategory, SecurityReport};
use crate::core::report::{vulnerability_summary, ReportFormatter};

const SEPARATOR: &str = "==================================================";

/// Human-readable report, one section per check family.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &SecurityReport) -> Result<String, ReportError> {
        Ok(render(report))
    }
}

pub fn render(report: &SecurityReport) -> String {
    let mut out = vec!["\n=== HTTP ENDPOINT SECURITY ANALYSIS ===\n".to_string()];

    render_url(&mut out, report);
    render_request(&mut out, report);
    render_response(&mut out, report);

    out.push("\n🔒 SECURITY ANALYSIS:\n".to_string());
    render_missing_headers(&mut out, report);
    render_disclosure(&mut out, report);
    render_sensitive_data(&mut out, report);
    render_indicators(&mut out, report);
    render_cookies(&mut out, report);

    out.push(format!("\n{}", SEPARATOR));
    render_summary(&mut out, report);
    render_recommendations(&mut out, report);
    out.push(format!("\n{}", SEPARATOR));
    out.push(
        "\n⚠️  NOTE: This is an automated scan. Manual testing required for comprehensive assessment."
            .to_string(),
    );

    out.join("\n")
}

fn render_url(out: &mut Vec<String>, report: &SecurityReport) {
    let request = &report.request;
    out.push("🔍 URL ANALYSIS:".to_string());
    out.push(format!("  • Protocol: {}", request.scheme));
    if report.count(FindingCategory::InsecureProtocol) > 0 {
        out.push("    ⚠️  WARNING: Using insecure HTTP instead of HTTPS!".to_string());
    }
    out.push(format!("  • Domain: {}", request.host));
    out.push(format!("  • Path: {}", request.path));
    if let Some(query) = &request.query {
        out.push(format!("  • Query Parameters: {}", query));
    }
}

fn render_request(out: &mut Vec<String>, report: &SecurityReport) {
    out.push("\n📤 REQUEST DETAILS:".to_string());
    out.push(format!("  • Method: {}", report.request.method));
}

fn render_response(out: &mut Vec<String>, report: &SecurityReport) {
    let response = &report.response;
    out.push("\n📥 RESPONSE ANALYSIS:".to_string());
    out.push(format!("  • Status Code: {}", response.status_code));
    out.push(format!(
        "    {} {}",
        status_marker(response.status_code),
        response.reason_phrase
    ));
    out.push(format!(
        "  • Response Size: {} bytes",
        group_thousands(response.size_bytes)
    ));

    if !response.redirect_chain.is_empty() {
        out.push(format!(
            "  • Redirects: {} redirect(s)",
            response.redirect_chain.len()
        ));
        for (i, hop) in response.redirect_chain.iter().enumerate() {
            out.push(format!("    {}. {} -> {}", i + 1, hop.status_code, hop.url));
        }
    }

    out.push("\n📋 RESPONSE HEADERS:".to_string());
    if response.headers.is_empty() {
        out.push("  ✅ No response headers returned".to_string());
    }
    for (name, value) in response.headers.iter() {
        out.push(format!("  • {}: {}", name, value));
    }
}

fn render_missing_headers(out: &mut Vec<String>, report: &SecurityReport) {
    let missing: Vec<&Finding> = report
        .findings_in(FindingCategory::MissingSecurityHeader)
        .collect();
    if missing.is_empty() {
        out.push("✅ All recommended security headers present".to_string());
        return;
    }
    out.push("⚠️  MISSING SECURITY HEADERS:".to_string());
    for finding in missing {
        out.push(format!("  • {}", finding.subject));
        out.push(format!("    └─ {}", finding.detail));
    }
}

fn render_disclosure(out: &mut Vec<String>, report: &SecurityReport) {
    let disclosed: Vec<&Finding> = report
        .findings_in(FindingCategory::InformationDisclosure)
        .collect();
    if disclosed.is_empty() {
        out.push("\n✅ No server/technology version headers disclosed".to_string());
        return;
    }
    out.push("\n⚠️  INFORMATION DISCLOSURE:".to_string());
    for finding in disclosed {
        out.push(format!("  • {}: {}", finding.subject, finding.detail));
    }
}

fn render_sensitive_data(out: &mut Vec<String>, report: &SecurityReport) {
    let exposed: Vec<&Finding> = report
        .findings_in(FindingCategory::SensitiveDataExposure)
        .collect();
    if exposed.is_empty() {
        out.push("\n✅ No sensitive data patterns found in response body".to_string());
        return;
    }
    out.push("\n⚠️  POTENTIAL SENSITIVE DATA EXPOSURE:".to_string());
    for finding in exposed {
        out.push(format!("  • Found '{}': {}", finding.subject, finding.detail));
    }
}

fn render_indicators(out: &mut Vec<String>, report: &SecurityReport) {
    let indicators: Vec<&Finding> = report
        .findings_in(FindingCategory::VulnerabilityIndicator)
        .collect();
    if indicators.is_empty() {
        out.push("\n✅ No vulnerability indicators found in response body".to_string());
        return;
    }
    out.push("\n⚠️  VULNERABILITY INDICATORS:".to_string());
    for finding in indicators {
        out.push(format!("  • '{}' found: {}", finding.subject, finding.detail));
    }
}

fn render_cookies(out: &mut Vec<String>, report: &SecurityReport) {
    let cookies = &report.response.cookies;
    if cookies.is_empty() {
        out.push("\n✅ No cookies set by the response".to_string());
        return;
    }
    out.push("\n🍪 COOKIES ANALYSIS:".to_string());
    for cookie in cookies {
        out.push(format!("  • {}", cookie.name));
        let issues = cookie_issues(cookie);
        if issues.is_empty() {
            out.push("    ✅ Secure, HttpOnly and SameSite set".to_string());
        } else {
            out.push(format!("    ⚠️  Issues: {}", issues.join(", ")));
        }
    }
}

// SameSite is advisory only: listed here but never a finding.
fn cookie_issues(cookie: &Cookie) -> Vec<&'static str> {
    let mut issues = Vec::new();
    if !cookie.secure {
        issues.push("Not marked as Secure");
    }
    if !cookie.http_only {
        issues.push("Not marked as HttpOnly");
    }
    if !cookie.same_site {
        issues.push("No SameSite attribute");
    }
    issues
}

fn render_summary(out: &mut Vec<String>, report: &SecurityReport) {
    out.push("📊 VULNERABILITY SUMMARY:".to_string());
    let summary = vulnerability_summary(report);
    if summary.is_empty() {
        out.push("\n✅ No obvious vulnerabilities detected in initial scan".to_string());
        return;
    }
    out.push(format!("\n🔴 Found {} potential issue(s):", summary.len()));
    for (i, line) in summary.iter().enumerate() {
        out.push(format!("  {}. {}", i + 1, line));
    }
}

fn render_recommendations(out: &mut Vec<String>, report: &SecurityReport) {
    out.push("\n💡 RECOMMENDATIONS:".to_string());
    if report.recommendations.is_empty() {
        out.push("  ✅ No remediation required".to_string());
        return;
    }
    for (i, recommendation) in report.recommendations.iter().enumerate() {
        out.push(format!("  {}. {}", i + 1, recommendation));
    }
}

fn status_marker(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "✅",
        300..=399 => "⚠️",
        _ => "❌",
    }
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
