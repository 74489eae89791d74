//! Integration tests for probing and page retrieval using wiremock

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rmrb_dl::batch::CancelFlag;
use rmrb_dl::config::Config;
use rmrb_dl::date::EditionDate;
use rmrb_dl::error::FetchError;
use rmrb_dl::fetch::{PageFetcher, PaperFetcher, RetryPolicy};
use rmrb_dl::models::{Edition, Layout, PageStatus};
use rmrb_dl::site::SiteUrls;

fn quick_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10))
}

fn fetcher() -> PaperFetcher {
    PaperFetcher::new(&Config::default().network, quick_retry()).unwrap()
}

fn edition_date() -> EditionDate {
    EditionDate::from(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
}

fn pdf_response(len: usize) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/pdf")
        .set_body_bytes(vec![0u8; len])
}

#[tokio::test]
async fn test_probe_returns_body_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cover"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>pageLink</html>"))
        .mount(&server)
        .await;

    let body = fetcher().probe(&format!("{}/cover", server.uri())).await.unwrap();

    assert_eq!(body.as_deref(), Some("<html>pageLink</html>"));
}

#[tokio::test]
async fn test_probe_404_returns_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // definitive absence, no retry
        .mount(&server)
        .await;

    let body = fetcher().probe(&format!("{}/missing", server.uri())).await.unwrap();

    assert_eq!(body, None);
}

#[tokio::test]
async fn test_probe_retries_transient_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&server)
        .await;

    let body = fetcher().probe(&format!("{}/flaky", server.uri())).await.unwrap();

    assert_eq!(body.as_deref(), Some("recovered"));
}

#[tokio::test]
async fn test_probe_gives_up_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let body = fetcher().probe(&format!("{}/broken", server.uri())).await.unwrap();

    assert_eq!(body, None);
}

#[tokio::test]
async fn test_download_streams_to_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.pdf"))
        .respond_with(pdf_response(2048))
        .mount(&server)
        .await;

    let workspace = tempfile::tempdir().unwrap();
    let dest = workspace.path().join("page.pdf");
    let bytes = fetcher()
        .download(&format!("{}/page.pdf", server.uri()), &dest)
        .await
        .unwrap();

    assert_eq!(bytes, 2048);
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 2048);
}

#[tokio::test]
async fn test_download_rejects_non_pdf_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html>interstitial</html>"),
        )
        .expect(3) // wrong media type consumes the shared attempt budget
        .mount(&server)
        .await;

    let workspace = tempfile::tempdir().unwrap();
    let dest = workspace.path().join("page.pdf");
    let err = fetcher()
        .download(&format!("{}/page.pdf", server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NotPdf(_)));
}

#[tokio::test]
async fn test_download_404_is_definitive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // absence is never retried
        .mount(&server)
        .await;

    let workspace = tempfile::tempdir().unwrap();
    let dest = workspace.path().join("page.pdf");
    let err = fetcher()
        .download(&format!("{}/page.pdf", server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NotFound));
}

#[tokio::test]
async fn test_download_rejects_undersized_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.pdf"))
        .respond_with(pdf_response(100))
        .mount(&server)
        .await;

    let workspace = tempfile::tempdir().unwrap();
    let dest = workspace.path().join("page.pdf");
    let err = fetcher()
        .download(&format!("{}/page.pdf", server.uri()), &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Undersized { size: 100 }));
}

#[tokio::test]
async fn test_failed_page_does_not_block_following_pages() {
    let server = MockServer::start().await;
    // page 1 exhausts its three attempts, page 2 downloads fine
    Mock::given(method("GET"))
        .and(path("/images/2024-01/05/rmrb2024010501.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/2024-01/05/rmrb2024010502.pdf"))
        .respond_with(pdf_response(2048))
        .mount(&server)
        .await;

    let page_fetcher = PageFetcher::new(
        Arc::new(fetcher()),
        SiteUrls::with_base(server.uri()),
    );
    let edition = Edition::new(edition_date(), Layout::Legacy, 2);
    let workspace = tempfile::tempdir().unwrap();

    let summary = page_fetcher
        .fetch_edition(&edition, workspace.path(), &CancelFlag::new())
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, vec![1]);
    assert!(workspace.path().join("rmrb2024010502.pdf").exists());
}

#[tokio::test]
async fn test_current_layout_resolves_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pc/layout/202401/05/node_01.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<p class="right btn"><a href="../../../attachement/1/2024-01/05/01/p01.pdf">PDF</a></p>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pc/attachement/1/2024-01/05/01/p01.pdf"))
        .respond_with(pdf_response(4096))
        .mount(&server)
        .await;

    let page_fetcher = PageFetcher::new(
        Arc::new(fetcher()),
        SiteUrls::with_base(server.uri()),
    );
    let edition = Edition::new(edition_date(), Layout::Current, 1);
    let workspace = tempfile::tempdir().unwrap();

    let page = page_fetcher.fetch_page(&edition, 1, workspace.path()).await;

    assert_eq!(page.status, PageStatus::Success);
    assert!(page.url.ends_with("/pc/attachement/1/2024-01/05/01/p01.pdf"));
    assert!(page.file.exists());
}

#[tokio::test]
async fn test_missing_attachment_fails_page_without_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pc/layout/202401/05/node_01.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no links here</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let page_fetcher = PageFetcher::new(
        Arc::new(fetcher()),
        SiteUrls::with_base(server.uri()),
    );
    let edition = Edition::new(edition_date(), Layout::Current, 1);
    let workspace = tempfile::tempdir().unwrap();

    let page = page_fetcher.fetch_page(&edition, 1, workspace.path()).await;

    assert_eq!(page.status, PageStatus::Failed);
    assert!(!page.file.exists());
}

#[tokio::test]
async fn test_cancelled_flag_stops_the_loop_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let page_fetcher = PageFetcher::new(
        Arc::new(fetcher()),
        SiteUrls::with_base(server.uri()),
    );
    let edition = Edition::new(edition_date(), Layout::Legacy, 4);
    let workspace = tempfile::tempdir().unwrap();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let err = page_fetcher
        .fetch_edition(&edition, workspace.path(), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_interruption());
}
