//! End-to-end pipeline tests against a local mock HTTP server.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use taskcrawl::config::{FetchSettings, UrlSettings};
use taskcrawl::pipeline::{CrawlError, Crawler, RunOutcome};
use taskcrawl::scrapers::{FetchError, Fetcher, RotationChoice, SequenceRotation};
use taskcrawl::storage::{CsvSink, JsonSink, Persister, SqliteSink};
use taskcrawl::{Task, TaskType};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOOKS_PAGE: &str = r#"<!DOCTYPE html>
<html><body>
  <table>
    <tr><td><a class="bookTitle" href="/book/1"><span>Dune</span></a></td></tr>
    <tr><td><a class="bookTitle" href="/book/2"><span>The Left Hand of Darkness</span></a></td></tr>
    <tr><td><a class="bookTitle" href="/book/3"><span>Dune</span></a></td></tr>
  </table>
</body></html>"#;

fn fast_fetch_settings() -> FetchSettings {
    FetchSettings {
        timeout_secs: 5,
        retry_delay_secs: 0,
        max_retries: 3,
    }
}

fn http_crawler(persister: Persister) -> Crawler {
    let rotation = SequenceRotation::new(vec![
        RotationChoice {
            proxy: None,
            user_agent: "TestAgent/1".to_string(),
        },
        RotationChoice {
            proxy: None,
            user_agent: "TestAgent/2".to_string(),
        },
    ]);
    let settings = fast_fetch_settings();
    Crawler::new(
        Fetcher::http(&settings, Arc::new(rotation)),
        persister,
        UrlSettings::default(),
        settings.max_retries,
    )
}

fn files_with_extension(dir: &Path, extension: &str) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == extension))
        .collect();
    files.sort();
    files
}

#[tokio::test]
async fn test_books_duplicates_removed_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BOOKS_PAGE))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let db = dir.path().join("crawler_data.db");
    let crawler = http_crawler(Persister::standard(dir.path(), &db));
    let task = Task::new(TaskType::Books).with_url(Some(format!("{}/books", server.uri())));

    let outcome = crawler.run(&task).await.unwrap();
    let titles: Vec<_> = outcome
        .records()
        .iter()
        .filter_map(|r| r.get("title"))
        .collect();
    assert_eq!(titles, ["Dune", "The Left Hand of Darkness"]);

    let csv_files = files_with_extension(dir.path(), "csv");
    assert_eq!(csv_files.len(), 1);
    let name = csv_files[0].file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("books_data_"), "unexpected name {name}");
    let contents = fs::read_to_string(&csv_files[0]).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines, ["title", "Dune", "The Left Hand of Darkness"]);

    let json_files = files_with_extension(dir.path(), "json");
    assert_eq!(json_files.len(), 1);
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_files[0]).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);

    let conn = rusqlite::Connection::open(&db).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn test_sqlite_failure_does_not_fail_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BOOKS_PAGE))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    // Parent directory does not exist, so SQLite cannot open the file
    let db = dir.path().join("missing").join("crawler_data.db");
    let crawler = http_crawler(Persister::new(vec![
        Box::new(CsvSink::new(dir.path())),
        Box::new(JsonSink::new(dir.path())),
        Box::new(SqliteSink::new(&db)),
    ]));
    let task = Task::new(TaskType::Books).with_url(Some(format!("{}/books", server.uri())));

    let outcome = crawler.run(&task).await.unwrap();
    let RunOutcome::Completed { report, .. } = outcome else {
        panic!("expected completed run");
    };

    assert_eq!(report.succeeded(), 2);
    let failed: Vec<_> = report.failures().map(|o| o.sink).collect();
    assert_eq!(failed, ["sqlite"]);
    assert_eq!(files_with_extension(dir.path(), "csv").len(), 1);
    assert_eq!(files_with_extension(dir.path(), "json").len(), 1);
}

#[tokio::test]
async fn test_server_errors_are_retried_with_rotated_agents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vpn"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vpn"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<table id="vg_hosts_table"><tbody>
                 <tr><td>10.0.0.1</td><td>Japan</td></tr>
               </tbody></table>"#,
        ))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let crawler = http_crawler(Persister::standard(
        dir.path(),
        &dir.path().join("crawler_data.db"),
    ));
    let task = Task::new(TaskType::Vpn).with_url(Some(format!("{}/vpn", server.uri())));

    let outcome = crawler.run(&task).await.unwrap();
    assert_eq!(outcome.records().len(), 1);
    assert_eq!(outcome.records()[0].get("country"), Some("Japan"));
    assert_eq!(outcome.records()[0].get("ip"), Some("10.0.0.1"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    let agents: Vec<_> = requests
        .iter()
        .map(|r| r.headers.get("user-agent").unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(agents, ["TestAgent/1", "TestAgent/2", "TestAgent/1"]);
}

#[tokio::test]
async fn test_exhausted_retries_fail_run_without_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let crawler = http_crawler(Persister::standard(
        dir.path(),
        &dir.path().join("crawler_data.db"),
    ));
    let task = Task::new(TaskType::Movies).with_url(Some(format!("{}/chart", server.uri())));

    let err = crawler.run(&task).await.unwrap_err();
    assert!(matches!(
        err,
        CrawlError::Fetch(FetchError::Exhausted { attempts: 3, .. })
    ));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_timeout_counts_as_failed_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<div class=\"bookTitle\">Late</div>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        timeout_secs: 1,
        retry_delay_secs: 0,
        max_retries: 2,
    };
    let fetcher = Fetcher::http(&settings, Arc::new(SequenceRotation::direct("TestAgent/1")));

    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()), settings.max_retries)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Exhausted { attempts: 2, .. }));
}

#[tokio::test]
async fn test_empty_listing_reports_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let crawler = http_crawler(Persister::standard(
        dir.path(),
        &dir.path().join("crawler_data.db"),
    ));
    let task = Task::new(TaskType::Vpn).with_url(Some(server.uri()));

    let outcome = crawler.run(&task).await.unwrap();
    assert!(matches!(outcome, RunOutcome::NoData { .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
