// src/app.rs

use crate::core::error::TransportError;
use crate::core::http_client::Fetcher;
use crate::core::knowledge_base::RuleCatalog;
use crate::core::models::{RequestDescriptor, SecurityReport};
use crate::core::scanner::analyze_with;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

/// What happened to one target.
#[derive(Debug)]
pub enum ScanOutcome {
    Analyzed(SecurityReport),
    Failed { url: String, error: TransportError },
}

impl ScanOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ScanOutcome::Failed { .. })
    }
}

/// Drives the adapter and the engine for a batch of targets.
pub struct App<F> {
    fetcher: Arc<F>,
    catalog: Arc<RuleCatalog>,
    concurrency: usize,
}

impl<F> App<F>
where
    F: Fetcher + Send + Sync + 'static,
{
    pub fn new(fetcher: F, catalog: RuleCatalog, concurrency: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            catalog: Arc::new(catalog),
            concurrency: concurrency.max(1),
        }
    }

    pub async fn scan_one(&self, request: RequestDescriptor) -> ScanOutcome {
        run_scan(self.fetcher.as_ref(), &self.catalog, request).await
    }

    /// Scans every target with at most `concurrency` requests in flight.
    /// Outcomes come back in input order.
    pub async fn scan_all(&self, requests: Vec<RequestDescriptor>) -> Vec<ScanOutcome> {
        info!(targets = requests.len(), concurrency = self.concurrency, "Starting batch scan.");
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        let urls: Vec<String> = requests.iter().map(|r| r.url().to_string()).collect();

        for (index, request) in requests.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let catalog = Arc::clone(&self.catalog);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, run_scan(fetcher.as_ref(), &catalog, request).await)
            });
        }

        let mut outcomes: Vec<Option<ScanOutcome>> = urls.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => error!(error = %e, "Scan task did not complete."),
            }
        }

        // A task that never reported back still counts as a failed target.
        outcomes
            .into_iter()
            .zip(urls)
            .map(|(outcome, url)| {
                outcome.unwrap_or_else(|| ScanOutcome::Failed {
                    url,
                    error: TransportError::Aborted("scan task did not complete".to_string()),
                })
            })
            .collect()
    }
}

async fn run_scan<F: Fetcher>(
    fetcher: &F,
    catalog: &RuleCatalog,
    request: RequestDescriptor,
) -> ScanOutcome {
    match fetcher.fetch(&request).await {
        Ok(snapshot) => ScanOutcome::Analyzed(analyze_with(catalog, &request, &snapshot)),
        Err(error) => ScanOutcome::Failed {
            url: request.url().to_string(),
            error,
        },
    }
}

/// 0 when every target was analysed, 1 when any transport failure occurred.
/// Findings never affect the exit code.
pub fn exit_code(outcomes: &[ScanOutcome]) -> i32 {
    if outcomes.iter().any(ScanOutcome::is_failure) {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{FindingCategory, HttpMethod, ResponseSnapshot};
    use std::time::Duration;

    /// Serves canned responses; any host containing "down" fails to connect.
    struct StubFetcher;

    impl Fetcher for StubFetcher {
        async fn fetch(
            &self,
            request: &RequestDescriptor,
        ) -> Result<ResponseSnapshot, TransportError> {
            let host = request.authority();
            if host.contains("down") {
                return Err(TransportError::Connect(format!("{} refused", host)));
            }
            if host.contains("crash") {
                panic!("stub fetcher crashed on {}", host);
            }
            if host.contains("slow") {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(ResponseSnapshot::new(200, "OK").with_header("Server", &host))
        }
    }

    fn request(url: &str) -> RequestDescriptor {
        RequestDescriptor::parse(url, HttpMethod::Get).unwrap()
    }

    #[tokio::test]
    async fn batch_keeps_input_order() {
        let app = App::new(StubFetcher, RuleCatalog::default(), 2);
        let outcomes = app
            .scan_all(vec![
                request("https://slow.example"),
                request("https://down.example"),
                request("https://fast.example"),
            ])
            .await;

        assert_eq!(outcomes.len(), 3);
        match &outcomes[0] {
            ScanOutcome::Analyzed(report) => assert_eq!(report.request.host, "slow.example"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(outcomes[1].is_failure());
        match &outcomes[2] {
            ScanOutcome::Analyzed(report) => {
                assert_eq!(report.count(FindingCategory::InformationDisclosure), 1)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(exit_code(&outcomes), 1);
    }

    #[tokio::test]
    async fn panicked_task_is_reported_as_failure() {
        let app = App::new(StubFetcher, RuleCatalog::default(), 2);
        let outcomes = app
            .scan_all(vec![
                request("https://fast.example"),
                request("https://crash.example"),
            ])
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].is_failure());
        match &outcomes[1] {
            ScanOutcome::Failed { url, error } => {
                assert_eq!(url, "https://crash.example/");
                assert!(matches!(error, TransportError::Aborted(_)));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(exit_code(&outcomes), 1);
    }

    #[tokio::test]
    async fn findings_do_not_fail_the_run() {
        let app = App::new(StubFetcher, RuleCatalog::default(), 1);
        let outcome = app.scan_one(request("http://fast.example")).await;
        let outcomes = vec![outcome];
        assert_eq!(exit_code(&outcomes), 0);
    }
}
