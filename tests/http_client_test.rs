use std::time::Duration;
use vanguard_http_analyzer::core::analyze;
use vanguard_http_analyzer::core::error::TransportError;
use vanguard_http_analyzer::core::http_client::{Fetcher, HttpClientOptions, HttpFetcher};
use vanguard_http_analyzer::core::models::{FindingCategory, HttpMethod, RequestDescriptor};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn fetcher(options: HttpClientOptions) -> HttpFetcher {
    HttpFetcher::new(options).unwrap()
}

fn request(server: &MockServer, route: &str, method: HttpMethod) -> RequestDescriptor {
    RequestDescriptor::parse(&format!("{}{}", server.uri(), route), method).unwrap()
}

#[tokio::test]
async fn test_fetch_builds_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Server", "nginx/1.18")
                .append_header("Set-Cookie", "sid=abc; Path=/")
                .append_header("Set-Cookie", "csrf=xyz; Secure; HttpOnly; SameSite=Strict")
                .set_body_string("Please enter your password"),
        )
        .mount(&mock_server)
        .await;

    let snapshot = fetcher(HttpClientOptions::default())
        .fetch(&request(&mock_server, "/login", HttpMethod::Get))
        .await
        .unwrap();

    assert_eq!(snapshot.status_code, 200);
    assert_eq!(snapshot.reason_phrase, "OK");
    assert_eq!(snapshot.headers.get("server"), Some("nginx/1.18"));
    assert_eq!(snapshot.size_bytes(), "Please enter your password".len());
    assert!(snapshot.redirect_chain.is_empty());

    assert_eq!(snapshot.cookies.len(), 2);
    assert_eq!(snapshot.cookies[0].name, "sid");
    assert!(!snapshot.cookies[0].secure);
    assert_eq!(snapshot.cookies[1].name, "csrf");
    assert!(snapshot.cookies[1].secure && snapshot.cookies[1].http_only && snapshot.cookies[1].same_site);
}

#[tokio::test]
async fn test_fetch_records_redirect_chain() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/moved"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/final"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/final"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .mount(&mock_server)
        .await;

    let snapshot = fetcher(HttpClientOptions::default())
        .fetch(&request(&mock_server, "/old", HttpMethod::Get))
        .await
        .unwrap();

    assert_eq!(snapshot.status_code, 200);
    assert_eq!(snapshot.redirect_chain.len(), 2);
    assert_eq!(snapshot.redirect_chain[0].status_code, 301);
    assert_eq!(snapshot.redirect_chain[0].url, format!("{}/old", mock_server.uri()));
    assert_eq!(snapshot.redirect_chain[1].status_code, 302);
    assert_eq!(snapshot.redirect_chain[1].url, format!("{}/moved", mock_server.uri()));
    assert_eq!(snapshot.body, b"done");
}

#[tokio::test]
async fn test_see_other_switches_post_to_get() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(303).insert_header("Location", "/result"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/result"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let snapshot = fetcher(HttpClientOptions::default())
        .fetch(&request(&mock_server, "/submit", HttpMethod::Post))
        .await
        .unwrap();
    assert_eq!(snapshot.status_code, 200);
    assert_eq!(snapshot.redirect_chain.len(), 1);
}

#[tokio::test]
async fn test_redirect_loop_hits_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&mock_server)
        .await;

    let options = HttpClientOptions {
        max_redirects: 3,
        ..HttpClientOptions::default()
    };
    let result = fetcher(options)
        .fetch(&request(&mock_server, "/loop", HttpMethod::Get))
        .await;
    assert!(matches!(result, Err(TransportError::TooManyRedirects(3))));
}

#[tokio::test]
async fn test_slow_target_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let options = HttpClientOptions {
        timeout: Duration::from_millis(300),
        ..HttpClientOptions::default()
    };
    let result = fetcher(options)
        .fetch(&request(&mock_server, "/slow", HttpMethod::Get))
        .await;
    assert!(matches!(result, Err(TransportError::Timeout(_))));
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error() {
    // Grab a free port, then release it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let request =
        RequestDescriptor::parse(&format!("http://127.0.0.1:{}/", port), HttpMethod::Get).unwrap();
    let result = fetcher(HttpClientOptions::default()).fetch(&request).await;
    assert!(matches!(result, Err(TransportError::Connect(_))));
}

#[tokio::test]
async fn test_error_page_feeds_the_engine() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/1"))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("X-Powered-By", "Express")
                .set_body_string("Error: stack trace at Object.<anonymous>"),
        )
        .mount(&mock_server)
        .await;

    let request = request(&mock_server, "/api/users/1", HttpMethod::Delete);
    let snapshot = fetcher(HttpClientOptions::default())
        .fetch(&request)
        .await
        .unwrap();
    let report = analyze(&request, &snapshot);

    assert_eq!(report.response.status_code, 500);
    assert_eq!(report.response.reason_phrase, "Internal Server Error");
    assert_eq!(report.count(FindingCategory::InsecureProtocol), 1);
    assert_eq!(report.count(FindingCategory::InformationDisclosure), 1);
    assert_eq!(report.count(FindingCategory::VulnerabilityIndicator), 2);
}

#[tokio::test]
async fn test_non_ascii_header_values_keep_their_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Server", "Apache/2.4 (Débian)")
                .insert_header("Content-Security-Policy", "default-src 'self'; report-to café"),
        )
        .mount(&mock_server)
        .await;

    let request = request(&mock_server, "/", HttpMethod::Get);
    let snapshot = fetcher(HttpClientOptions::default())
        .fetch(&request)
        .await
        .unwrap();

    assert_eq!(snapshot.headers.get("server"), Some("Apache/2.4 (Débian)"));
    assert!(snapshot.headers.contains("content-security-policy"));

    let report = analyze(&request, &snapshot);
    assert_eq!(report.count(FindingCategory::InformationDisclosure), 1);
    let missing: Vec<&str> = report
        .findings_in(FindingCategory::MissingSecurityHeader)
        .map(|f| f.subject.as_str())
        .collect();
    assert!(!missing.contains(&"Content-Security-Policy"));
    assert_eq!(missing.len(), 6);
}

#[tokio::test]
async fn test_non_standard_status_has_empty_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/origin-down"))
        .respond_with(ResponseTemplate::new(520))
        .mount(&mock_server)
        .await;

    let snapshot = fetcher(HttpClientOptions::default())
        .fetch(&request(&mock_server, "/origin-down", HttpMethod::Get))
        .await
        .unwrap();
    assert_eq!(snapshot.status_code, 520);
    assert_eq!(snapshot.reason_phrase, "");
}

#[tokio::test]
async fn test_latin1_body_is_decoded_with_its_charset() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cafe"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(b"Caf\xe9 login: password=hunter2".to_vec(), "text/html; charset=iso-8859-1"),
        )
        .mount(&mock_server)
        .await;

    let request = request(&mock_server, "/cafe", HttpMethod::Get);
    let snapshot = fetcher(HttpClientOptions::default())
        .fetch(&request)
        .await
        .unwrap();
    assert_eq!(snapshot.charset(), Some("iso-8859-1"));

    let report = analyze(&request, &snapshot);
    assert_eq!(report.count(FindingCategory::SensitiveDataExposure), 1);
}
