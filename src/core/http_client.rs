// src/core/http_client.rs

use crate::core::error::TransportError;
use crate::core::models::{HttpMethod, RedirectHop, RequestDescriptor, ResponseSnapshot};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
pub const DEFAULT_USER_AGENT: &str = "VanguardHttpAnalyzer/0.1";

/// Anything that can turn a request into a response snapshot.
pub trait Fetcher {
    fn fetch(
        &self,
        request: &RequestDescriptor,
    ) -> impl Future<Output = Result<ResponseSnapshot, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Ceiling for the whole exchange, redirects included.
    pub timeout: Duration,
    pub max_redirects: usize,
    /// Accept self-signed or otherwise invalid certificates. On by default so
    /// self-hosted test targets can be scanned.
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            accept_invalid_certs: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `reqwest`-backed fetcher. Redirects are followed by hand so every hop can
/// be recorded in the snapshot.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    options: HttpClientOptions,
}

impl HttpFetcher {
    pub fn new(options: HttpClientOptions) -> Result<Self, TransportError> {
        if options.accept_invalid_certs {
            warn!("TLS certificate verification is disabled.");
        }
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .redirect(Policy::none())
            .timeout(options.timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client.");
                TransportError::Client(e.to_string())
            })?;
        Ok(Self { client, options })
    }

    pub fn options(&self) -> &HttpClientOptions {
        &self.options
    }

    async fn follow(&self, request: &RequestDescriptor) -> Result<ResponseSnapshot, TransportError> {
        let mut url = request.url().clone();
        let mut method = to_reqwest_method(request.method());
        let mut chain = Vec::new();

        loop {
            debug!(%url, %method, hop = chain.len(), "Sending request.");
            let response = self
                .client
                .request(method.clone(), url.clone())
                .send()
                .await
                .map_err(|e| TransportError::from_reqwest(e, self.options.timeout))?;

            let status = response.status();
            let location = if status.is_redirection() {
                response.headers().get(LOCATION).cloned()
            } else {
                None
            };
            let Some(location) = location else {
                return read_snapshot(response, chain, self.options.timeout).await;
            };

            if chain.len() >= self.options.max_redirects {
                warn!(limit = self.options.max_redirects, "Redirect limit reached.");
                return Err(TransportError::TooManyRedirects(self.options.max_redirects));
            }

            let location = location.to_str().map_err(|e| TransportError::InvalidRedirect {
                location: String::from_utf8_lossy(location.as_bytes()).into_owned(),
                reason: e.to_string(),
            })?;
            let next = url.join(location).map_err(|e| TransportError::InvalidRedirect {
                location: location.to_string(),
                reason: e.to_string(),
            })?;

            debug!(status = status.as_u16(), from = %url, to = %next, "Following redirect.");
            chain.push(RedirectHop {
                status_code: status.as_u16(),
                url: url.to_string(),
            });
            method = redirected_method(status, method);
            url = next;
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<ResponseSnapshot, TransportError> {
        info!(url = %request.url(), method = %request.method(), "Fetching target.");
        let started = Instant::now();

        let result = match tokio::time::timeout(self.options.timeout, self.follow(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(self.options.timeout)),
        };

        match result {
            Ok(snapshot) => {
                let elapsed = started.elapsed();
                info!(
                    status = snapshot.status_code,
                    bytes = snapshot.size_bytes(),
                    redirects = snapshot.redirect_chain.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Received response."
                );
                Ok(snapshot.with_elapsed(elapsed))
            }
            Err(e) => {
                error!(url = %request.url(), error = %e, "Request failed.");
                Err(e)
            }
        }
    }
}

async fn read_snapshot(
    response: reqwest::Response,
    redirect_chain: Vec<RedirectHop>,
    timeout: Duration,
) -> Result<ResponseSnapshot, TransportError> {
    let status = response.status();
    // reqwest does not expose the server's reason phrase, only the status
    // code. Non-standard codes (520 and friends) end up with an empty phrase.
    let mut snapshot =
        ResponseSnapshot::new(status.as_u16(), status.canonical_reason().unwrap_or_default());

    for (name, value) in response.headers() {
        match value.to_str() {
            Ok(value) => snapshot.insert_header(name.as_str(), value),
            Err(_) => {
                // Presence is what the header checks look at, so keep it.
                warn!(header_name = %name, "Header value is not visible ASCII, decoding lossily.");
                snapshot.insert_header(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
            }
        }
    }
    snapshot.redirect_chain = redirect_chain;

    let body = response
        .bytes()
        .await
        .map_err(|e| TransportError::from_reqwest(e, timeout))?;
    debug!(bytes = body.len(), "Read response body.");
    Ok(snapshot.with_body(body.to_vec()))
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
    }
}

/// 303 turns everything but HEAD into GET; 301/302 do the same for POST.
/// 307/308 keep the original method.
fn redirected_method(status: StatusCode, method: Method) -> Method {
    match status {
        StatusCode::SEE_OTHER if method != Method::HEAD => Method::GET,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND if method == Method::POST => Method::GET,
        _ => method,
    }
}
