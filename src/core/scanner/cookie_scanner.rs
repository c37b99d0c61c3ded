// src/core/scanner/cookie_scanner.rs

use crate::core::models::{Cookie, Finding, FindingCategory};
use tracing::debug;

pub const NOT_SECURE: &str = "not marked Secure";
pub const NOT_HTTP_ONLY: &str = "not marked HttpOnly";

/// Flags cookies that lack `Secure` or `HttpOnly`. A cookie yields zero, one
/// or two findings. A missing `SameSite` attribute is not reported here.
pub fn check_cookies(cookies: &[Cookie]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for cookie in cookies {
        debug!(
            cookie = %cookie.name,
            secure = cookie.secure,
            http_only = cookie.http_only,
            same_site = cookie.same_site,
            "Checking cookie."
        );
        if !cookie.secure {
            findings.push(Finding::new(FindingCategory::InsecureCookie, &cookie.name, NOT_SECURE));
        }
        if !cookie.http_only {
            findings.push(Finding::new(FindingCategory::InsecureCookie, &cookie.name, NOT_HTTP_ONLY));
        }
    }
    findings
}
