//! Integration tests for the batch controller
//!
//! These tests run full batches against wiremock servers, verifying counter
//! semantics, per-site failure isolation, validity filtering, AdSense
//! enrichment, deadline handling, and the JSON report shape.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wp_harvest::batch::{run_batch, BatchOptions, SiteOutcome};
use wp_harvest::error_handling::ProcessingStats;
use wp_harvest::extract::SourcePriority;

fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build test client")
}

fn test_options() -> BatchOptions {
    BatchOptions {
        limit: 0,
        check_validity: false,
        check_adsense: false,
        check_captcha: false,
        priority: SourcePriority::SitemapFirst,
        deadline: None,
        user_agent: "wp_harvest_test/1.0".to_string(),
    }
}

fn urlset(locs: &[&str]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{loc}</loc></url>"))
        .collect();
    format!(r#"<?xml version="1.0"?><urlset>{entries}</urlset>"#)
}

async fn mount_sitemap(server: &MockServer, locs: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/wp-sitemap-posts-post-1.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(locs)))
        .mount(server)
        .await;
}

/// Three sites where the middle one has no sitemap or feed: the failure is
/// isolated, counters add up, and result order matches input order.
#[tokio::test]
async fn test_batch_isolates_per_site_failures() {
    let good_one = MockServer::start().await;
    let broken = MockServer::start().await;
    let good_two = MockServer::start().await;

    mount_sitemap(&good_one, &[&format!("{}/a", good_one.uri())]).await;
    // broken serves nothing
    mount_sitemap(&good_two, &[&format!("{}/b", good_two.uri())]).await;

    let sites = vec![good_one.uri(), broken.uri(), good_two.uri()];
    let client = test_client();
    let stats = ProcessingStats::new();
    let report = run_batch(&client, &stats, &sites, &test_options()).await;

    assert_eq!(report.total_sites, 3);
    assert_eq!(report.processed_sites, 3);
    assert_eq!(report.successful_sites, 2);
    assert_eq!(report.failed_sites, 1);
    assert_eq!(report.total_urls, 2);

    let ordered: Vec<&String> = report.site_results.iter().map(|(site, _)| site).collect();
    assert_eq!(ordered, vec![&sites[0], &sites[1], &sites[2]]);

    match report.site_results.get(&broken.uri()) {
        Some(SiteOutcome::Failure { error }) => {
            assert!(error.contains("Could not find any sitemap or feed"));
        }
        other => panic!("expected failure for broken site, got {other:?}"),
    }
    assert!(matches!(
        report.site_results.get(&good_one.uri()),
        Some(SiteOutcome::Success { .. })
    ));
    assert!(matches!(
        report.site_results.get(&good_two.uri()),
        Some(SiteOutcome::Success { .. })
    ));
}

/// An unparseable site string fails before any network access and does not
/// count as processed.
#[tokio::test]
async fn test_invalid_url_fails_without_processing() {
    let server = MockServer::start().await;
    mount_sitemap(&server, &[&format!("{}/only", server.uri())]).await;

    let sites = vec!["not a url with spaces".to_string(), server.uri()];
    let client = test_client();
    let stats = ProcessingStats::new();
    let report = run_batch(&client, &stats, &sites, &test_options()).await;

    assert_eq!(report.total_sites, 2);
    assert_eq!(report.processed_sites, 1);
    assert_eq!(report.successful_sites, 1);
    assert_eq!(report.failed_sites, 1);

    match report.site_results.get("not a url with spaces") {
        Some(SiteOutcome::Failure { error }) => assert_eq!(error, "Invalid URL format"),
        other => panic!("expected invalid-url failure, got {other:?}"),
    }
}

/// With validity checking on, only live URLs make it into the per-site list
/// and the aggregate allUrls.
#[tokio::test]
async fn test_validity_filters_dead_urls() {
    let server = MockServer::start().await;
    let base = server.uri();
    let live = format!("{base}/post-live");
    let dead = format!("{base}/post-dead");

    mount_sitemap(&server, &[&live, &dead]).await;
    Mock::given(method("HEAD"))
        .and(path("/post-live"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/post-dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let sites = vec![base.clone()];
    let client = test_client();
    let stats = ProcessingStats::new();
    let options = BatchOptions {
        check_validity: true,
        ..test_options()
    };
    let report = run_batch(&client, &stats, &sites, &options).await;

    assert_eq!(report.total_urls, 2);
    assert_eq!(report.valid_urls, 1);
    assert_eq!(report.invalid_urls, 1);
    assert_eq!(report.all_urls, vec![live.clone()]);

    match report.site_results.get(&base) {
        Some(SiteOutcome::Success {
            total_urls,
            valid_urls,
            invalid_urls,
            urls,
            ..
        }) => {
            assert_eq!(*total_urls, 2);
            assert_eq!(*valid_urls, 1);
            assert_eq!(*invalid_urls, 1);
            assert_eq!(urls, &vec![live]);
        }
        other => panic!("expected success, got {other:?}"),
    }
}

/// AdSense scraping dedupes repeated publisher IDs and never fails the site
/// by itself.
#[tokio::test]
async fn test_adsense_enrichment_dedupes_ids() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head>
                <script src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client=ca-pub-1234567890123456"></script>
                <script src="https://pagead2.googlesyndication.com/pagead/js/adsbygoogle.js?client=ca-pub-1234567890123456"></script>
            </head><body></body></html>"#,
        ))
        .mount(&server)
        .await;
    mount_sitemap(&server, &[&format!("{base}/a")]).await;

    let sites = vec![base.clone()];
    let client = test_client();
    let stats = ProcessingStats::new();
    let options = BatchOptions {
        check_adsense: true,
        ..test_options()
    };
    let report = run_batch(&client, &stats, &sites, &options).await;

    assert_eq!(report.successful_sites, 1);
    let records = report.adsense_results.expect("adsense results requested");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].domain, base);
    assert_eq!(records[0].adsense_codes, vec!["ca-pub-1234567890123456".to_string()]);
}

/// A zero deadline expires immediately: every site is recorded as a
/// deadline failure but the report is still complete.
#[tokio::test]
async fn test_deadline_records_remaining_sites_as_failures() {
    let server_one = MockServer::start().await;
    let server_two = MockServer::start().await;

    let sites = vec![server_one.uri(), server_two.uri()];
    let client = test_client();
    let stats = ProcessingStats::new();
    let options = BatchOptions {
        deadline: Some(Duration::ZERO),
        ..test_options()
    };
    let report = run_batch(&client, &stats, &sites, &options).await;

    assert_eq!(report.total_sites, 2);
    assert_eq!(report.processed_sites, 2);
    assert_eq!(report.failed_sites, 2);
    assert_eq!(report.site_results.len(), 2);
    for (_, outcome) in report.site_results.iter() {
        match outcome {
            SiteOutcome::Failure { error } => assert_eq!(error, "Batch deadline exceeded"),
            other => panic!("expected deadline failure, got {other:?}"),
        }
    }
}

/// Bot-wall mode replaces extraction entirely: no sitemap or feed endpoint
/// is ever fetched, every site gets a verdict, and the site outcome is the
/// zero-URL success record.
#[tokio::test]
async fn test_captcha_mode_skips_extraction() {
    let server = MockServer::start().await;
    let base = server.uri();
    // A perfectly good sitemap that must never be requested in this mode
    mount_sitemap(&server, &[&format!("{base}/a")]).await;

    let sites = vec![base.clone()];
    let client = test_client();
    let stats = ProcessingStats::new();
    let options = BatchOptions {
        check_captcha: true,
        ..test_options()
    };
    let report = run_batch(&client, &stats, &sites, &options).await;

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(
        requests.iter().all(|request| {
            let path = request.url.path();
            !path.contains("sitemap") && !path.contains("feed") && !path.ends_with(".xml")
        }),
        "extraction endpoints must not be probed in bot-wall mode"
    );

    let verdicts = report.captcha_results.as_ref().expect("captcha results requested");
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].domain, base);

    assert_eq!(report.successful_sites, 1);
    assert_eq!(report.failed_sites, 0);
    assert_eq!(report.total_urls, 0);
    match report.site_results.get(&base) {
        Some(SiteOutcome::Success {
            total_urls, urls, ..
        }) => {
            assert_eq!(*total_urls, 0);
            assert!(urls.is_empty());
        }
        other => panic!("expected zero-URL success, got {other:?}"),
    }
}

/// The serialized report carries the documented camelCase field names.
#[tokio::test]
async fn test_report_json_shape() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_sitemap(&server, &[&format!("{base}/a")]).await;

    let sites = vec![base.clone()];
    let client = test_client();
    let stats = ProcessingStats::new();
    let report = run_batch(&client, &stats, &sites, &test_options()).await;

    let json = serde_json::to_value(&report).expect("report serializes");
    assert_eq!(json["totalSites"], 1);
    assert_eq!(json["processedSites"], 1);
    assert_eq!(json["successfulSites"], 1);
    assert_eq!(json["failedSites"], 0);
    assert_eq!(json["totalUrls"], 1);
    // Without --check-validity every delivered URL counts as valid
    assert_eq!(json["validUrls"], 1);
    assert_eq!(json["invalidUrls"], 0);
    assert!(json["allUrls"].is_array());
    assert_eq!(json["siteResults"][&base]["source"], "sitemap");
    assert_eq!(json["siteResults"][&base]["totalUrls"], 1);
    assert_eq!(json["siteResults"][&base]["validUrls"], 1);
    assert_eq!(json["siteResults"][&base]["invalidUrls"], 0);
    // Enrichments were not requested; their keys must be absent entirely
    assert!(json.get("adsenseResults").is_none());
    assert!(json.get("captchaResults").is_none());
}
