// src/core/models.rs

use crate::core::error::InputError;
use encoding_rs::{Encoding, UTF_8};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;
use strum::{Display, EnumIter, EnumString};
use tracing::warn;
use url::Url;

// --- Request Models ---

/// HTTP methods a scan may be issued with.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
    EnumIter,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl HttpMethod {
    /// Parses a method name, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        raw.trim()
            .parse()
            .map_err(|_| InputError::UnsupportedMethod(raw.to_string()))
    }
}

/// A validated request target. Only `parse` builds one, so anything holding a
/// `RequestDescriptor` has an absolute http(s) URL with a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: Url,
    method: HttpMethod,
}

impl RequestDescriptor {
    pub fn parse(raw: &str, method: HttpMethod) -> Result<Self, InputError> {
        let raw = raw.trim();
        if !raw.contains("://") {
            return Err(InputError::MissingScheme(raw.to_string()));
        }

        let url = Url::parse(raw).map_err(|e| InputError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InputError::UnsupportedScheme {
                    url: raw.to_string(),
                    scheme: other.to_string(),
                });
            }
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(InputError::MissingHost(raw.to_string()));
        }

        Ok(Self { url, method })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host plus the port when one was given explicitly.
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query().filter(|q| !q.is_empty())
    }
}

// --- Response Models ---

/// Response headers in arrival order with case-insensitive lookup.
///
/// Repeated names are folded into the first entry, values joined with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders {
    entries: Vec<(String, String)>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some((_, existing_value)) => {
                existing_value.push_str(", ");
                existing_value.push_str(&value);
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = ResponseHeaders::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// The security-relevant attributes of one `Set-Cookie` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: bool,
}

impl Cookie {
    /// A cookie with no attributes set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secure: false,
            http_only: false,
            same_site: false,
        }
    }

    /// Reads a raw `Set-Cookie` value. Returns `None` when the leading
    /// `name=value` pair is missing or the name is empty.
    pub fn parse_set_cookie(raw: &str) -> Option<Self> {
        let mut segments = raw.split(';');
        let (name, _value) = segments.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name);
        for attribute in segments {
            let key = attribute
                .split_once('=')
                .map_or(attribute, |(key, _)| key)
                .trim();
            if key.eq_ignore_ascii_case("secure") {
                cookie.secure = true;
            } else if key.eq_ignore_ascii_case("httponly") {
                cookie.http_only = true;
            } else if key.eq_ignore_ascii_case("samesite") {
                cookie.same_site = true;
            }
        }
        Some(cookie)
    }
}

/// One intermediate response that redirected elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectHop {
    pub status_code: u16,
    pub url: String,
}

/// Everything the engine gets to see about one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSnapshot {
    pub status_code: u16,
    /// Canonical phrase for `status_code`; empty for codes without one.
    pub reason_phrase: String,
    pub headers: ResponseHeaders,
    pub cookies: Vec<Cookie>,
    pub body: Vec<u8>,
    pub redirect_chain: Vec<RedirectHop>,
    pub elapsed: Duration,
}

impl ResponseSnapshot {
    pub fn new(status_code: u16, reason_phrase: impl Into<String>) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
            headers: ResponseHeaders::new(),
            cookies: Vec::new(),
            body: Vec::new(),
            redirect_chain: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Records a header. `Set-Cookie` values are also parsed into `cookies`.
    pub fn insert_header(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("set-cookie") {
            match Cookie::parse_set_cookie(value) {
                Some(cookie) => self.cookies.push(cookie),
                None => warn!(value, "Ignoring malformed Set-Cookie header."),
            }
        }
        self.headers.insert(name, value);
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_redirect(mut self, status_code: u16, url: impl Into<String>) -> Self {
        self.redirect_chain.push(RedirectHop {
            status_code,
            url: url.into(),
        });
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn size_bytes(&self) -> usize {
        self.body.len()
    }

    /// The `charset` parameter of the `Content-Type` header, if any.
    pub fn charset(&self) -> Option<&str> {
        self.headers
            .get("content-type")?
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"'))
            .filter(|value| !value.is_empty())
    }

    /// The body as text, decoded with the declared charset (UTF-8 when none
    /// is declared or the label is unknown). A body that does not decode
    /// cleanly reads as empty.
    pub fn body_text(&self) -> Cow<'_, str> {
        let encoding = self
            .charset()
            .and_then(|label| {
                let encoding = Encoding::for_label(label.as_bytes());
                if encoding.is_none() {
                    warn!(charset = label, "Unknown charset label, decoding body as UTF-8.");
                }
                encoding
            })
            .unwrap_or(UTF_8);

        match encoding.decode_without_bom_handling_and_without_replacement(&self.body) {
            Some(text) => text,
            None => {
                warn!(
                    charset = encoding.name(),
                    bytes = self.body.len(),
                    "Response body does not decode cleanly, scanning it as empty."
                );
                Cow::Borrowed("")
            }
        }
    }
}

// --- Finding Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// What kind of condition a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum FindingCategory {
    #[strum(to_string = "Insecure Protocol")]
    InsecureProtocol,
    #[strum(to_string = "Missing Security Header")]
    MissingSecurityHeader,
    #[strum(to_string = "Information Disclosure")]
    InformationDisclosure,
    #[strum(to_string = "Sensitive Data Exposure")]
    SensitiveDataExposure,
    #[strum(to_string = "Vulnerability Indicator")]
    VulnerabilityIndicator,
    #[strum(to_string = "Insecure Cookie")]
    InsecureCookie,
}

impl FindingCategory {
    pub fn severity(self) -> Severity {
        match self {
            FindingCategory::SensitiveDataExposure => Severity::Critical,
            FindingCategory::InsecureProtocol
            | FindingCategory::MissingSecurityHeader
            | FindingCategory::InsecureCookie => Severity::Warning,
            FindingCategory::InformationDisclosure | FindingCategory::VulnerabilityIndicator => {
                Severity::Info
            }
        }
    }

    /// Informational categories are shown in their own sections but left
    /// out of the vulnerability summary.
    pub fn is_informational(self) -> bool {
        matches!(
            self,
            FindingCategory::InsecureProtocol | FindingCategory::VulnerabilityIndicator
        )
    }
}

/// A single detected condition. `subject` is the header, pattern, cookie or
/// scheme the finding is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: FindingCategory,
    pub subject: String,
    pub detail: String,
}

impl Finding {
    pub fn new(category: FindingCategory, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            category,
            subject: subject.into(),
            detail: detail.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.category.severity()
    }

    pub fn summary_line(&self) -> String {
        match self.category {
            FindingCategory::InsecureProtocol => format!("Insecure protocol in use: {}", self.subject),
            FindingCategory::MissingSecurityHeader => {
                format!("Missing security header: {}", self.subject)
            }
            FindingCategory::InformationDisclosure => {
                format!("Information disclosure via {}: {}", self.subject, self.detail)
            }
            FindingCategory::SensitiveDataExposure => {
                format!("Sensitive data in response: {}", self.subject)
            }
            FindingCategory::VulnerabilityIndicator => {
                format!("Vulnerability indicator in response: {}", self.subject)
            }
            FindingCategory::InsecureCookie => format!("Cookie '{}' {}", self.subject, self.detail),
        }
    }
}

// --- Main Report ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub url: String,
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub query: Option<String>,
    pub method: HttpMethod,
}

impl From<&RequestDescriptor> for RequestSummary {
    fn from(request: &RequestDescriptor) -> Self {
        Self {
            url: request.url().to_string(),
            scheme: request.scheme().to_string(),
            host: request.authority(),
            path: request.path().to_string(),
            query: request.query().map(String::from),
            method: request.method(),
        }
    }
}

// No elapsed time here; reports must be reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSummary {
    pub status_code: u16,
    pub reason_phrase: String,
    pub size_bytes: usize,
    pub redirect_chain: Vec<RedirectHop>,
    pub headers: ResponseHeaders,
    pub cookies: Vec<Cookie>,
}

impl From<&ResponseSnapshot> for ResponseSummary {
    fn from(response: &ResponseSnapshot) -> Self {
        Self {
            status_code: response.status_code,
            reason_phrase: response.reason_phrase.clone(),
            size_bytes: response.size_bytes(),
            redirect_chain: response.redirect_chain.clone(),
            headers: response.headers.clone(),
            cookies: response.cookies.clone(),
        }
    }
}

/// The outcome of analysing one request/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub request: RequestSummary,
    pub response: ResponseSummary,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<String>,
}

impl SecurityReport {
    pub fn findings_in(&self, category: FindingCategory) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.category == category)
    }

    pub fn count(&self, category: FindingCategory) -> usize {
        self.findings_in(category).count()
    }
}
