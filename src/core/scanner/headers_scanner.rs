// src/core/scanner/headers_scanner.rs

use crate::core::knowledge_base::RuleCatalog;
use crate::core::models::{Finding, FindingCategory, ResponseHeaders};
use tracing::debug;

/// Looks a header up by name, ignoring case.
///
/// A header that is present with an empty value still counts as present.
fn check_header<'a>(headers: &'a ResponseHeaders, name: &str) -> Option<&'a str> {
    match headers.get(name) {
        Some(value) => {
            debug!(header_name = name, value, "Header found.");
            Some(value)
        }
        None => {
            debug!(header_name = name, "Header not found.");
            None
        }
    }
}

/// Emits one `MissingSecurityHeader` finding per catalog header that the
/// response does not carry, in catalog order.
///
/// # Arguments
/// * `catalog` - Supplies the security header table.
/// * `headers` - The response headers. Lookup ignores case and an empty
///   value still counts as present.
///
/// # Returns
/// A vector of findings whose subject is the header's canonical name.
pub fn check_security_headers(catalog: &RuleCatalog, headers: &ResponseHeaders) -> Vec<Finding> {
    debug!("Checking security headers.");
    catalog
        .security_headers()
        .iter()
        .filter(|rule| check_header(headers, rule.key()).is_none())
        .map(|rule| {
            Finding::new(
                FindingCategory::MissingSecurityHeader,
                rule.key(),
                rule.description(),
            )
        })
        .collect()
}

/// Emits one `InformationDisclosure` finding per catalog header the response
/// does carry. The finding detail is the header's actual value.
pub fn check_info_disclosure(catalog: &RuleCatalog, headers: &ResponseHeaders) -> Vec<Finding> {
    debug!("Checking information disclosure headers.");
    catalog
        .info_disclosure_headers()
        .filter_map(|name| {
            check_header(headers, name)
                .map(|value| Finding::new(FindingCategory::InformationDisclosure, name, value))
        })
        .collect()
}
