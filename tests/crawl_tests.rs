//! Integration tests for the harvester
//!
//! Most tests drive the engine with an in-memory renderer and sink. The
//! wiremock tests run the HTTP renderer against a mock site and check what
//! lands on disk.

use async_trait::async_trait;
use page_harvest::config::{parse_config, Config};
use page_harvest::crawler::{CrawlEngine, HttpRenderer, Renderer};
use page_harvest::output::{CsvSink, Sink};
use page_harvest::record::{ContentRecord, SectionType, TopicLabel, FULL_COLUMNS, TEXT_COLUMNS};
use page_harvest::storage::{RunStatus, SqliteSink};
use page_harvest::{RenderError, SinkResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ORIGIN: &str = "https://example.org/";

/// Serves canned pages, counting renders per URL
#[derive(Default)]
struct FakeSite {
    pages: HashMap<String, String>,
    failing: Vec<String>,
    stalling: Vec<String>,
    renders: Mutex<HashMap<String, usize>>,
}

impl FakeSite {
    fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing.push(url.to_string());
        self
    }

    fn stalling(mut self, url: &str) -> Self {
        self.stalling.push(url.to_string());
        self
    }

    fn render_count(&self, url: &str) -> usize {
        self.renders.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Renderer for FakeSite {
    async fn render(&self, url: &str, _timeout: Duration) -> Result<String, RenderError> {
        *self.renders.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        if self.failing.iter().any(|u| u == url) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                cause: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        if self.stalling.iter().any(|u| u == url) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }

        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }
}

/// Keeps every written record set in memory
#[derive(Default)]
struct MemorySink {
    writes: Mutex<Vec<(String, Vec<ContentRecord>)>>,
    status: Mutex<Option<&'static str>>,
}

impl MemorySink {
    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .writes
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

impl Sink for MemorySink {
    fn write(&self, key: &str, records: &[ContentRecord]) -> SinkResult<()> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), records.to_vec()));
        Ok(())
    }

    fn finish(&self) -> SinkResult<()> {
        *self.status.lock().unwrap() = Some("finished");
        Ok(())
    }

    fn interrupt(&self) -> SinkResult<()> {
        *self.status.lock().unwrap() = Some("interrupted");
        Ok(())
    }
}

fn test_config(origin: &str, extra: &str) -> Config {
    parse_config(&format!(
        r#"
[site]
origin = "{}"

[crawler]
workers = 3

[extraction]
text-mode = "coarse"

{}
"#,
        origin, extra
    ))
    .unwrap()
}

const FORECAST_PAGE: &str = r#"<html>
<head><title>Daily Forecast</title></head>
<body>
  <p>Heavy rain is expected this evening</p>
  <a href="/files/annual.pdf">Annual Report Size: 2.5MB</a>
  <img src="/img/radar.png" alt="Radar image">
</body>
</html>"#;

#[tokio::test]
async fn test_single_page_end_to_end() {
    let site = Arc::new(
        FakeSite::default()
            .page(
                ORIGIN,
                r#"<a href="/forecast/daily">Today's forecast</a>
                   <a href="https://other.example/x">Elsewhere</a>"#,
            )
            .page("https://example.org/forecast/daily", FORECAST_PAGE),
    );
    let sink = Arc::new(MemorySink::default());
    let engine = CrawlEngine::new(&test_config(ORIGIN, ""), site.clone(), sink.clone()).unwrap();

    let report = engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    assert_eq!(report.discovered, 1);
    assert_eq!(report.saved, 1);
    assert_eq!(report.records, 3);
    assert_eq!(site.render_count("https://other.example/x"), 0);

    let writes = sink.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    let (key, records) = &writes[0];
    assert_eq!(key, "forecast_daily");
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.source_type == TopicLabel::Forecast));
    assert!(records.iter().all(|r| r.page_title == "Daily Forecast"));

    assert_eq!(records[0].section_type, SectionType::P);
    assert_eq!(records[0].content_label, "Heavy rain is expected this evening");

    assert_eq!(records[1].section_type, SectionType::Pdf);
    assert_eq!(records[1].notes.as_deref(), Some("2.5MB"));
    assert_eq!(
        records[1].source_url.as_ref().unwrap().as_str(),
        "https://example.org/files/annual.pdf"
    );

    assert_eq!(records[2].section_type, SectionType::Image);
    assert_eq!(records[2].content_label, "Radar image");
    assert_eq!(*sink.status.lock().unwrap(), Some("finished"));
}

#[tokio::test]
async fn test_duplicate_links_extracted_once() {
    let site = Arc::new(
        FakeSite::default()
            .page(
                ORIGIN,
                r##"<a href="/weather">A</a>
                    <a href="/weather#today">B</a>
                    <a href="https://example.org/weather">C</a>
                    <a href="/rainfall">D</a>
                    <a href="/weather">E</a>"##,
            )
            .page(
                "https://example.org/weather",
                "<p>Sunny spells with a chance of showers</p>",
            )
            .page(
                "https://example.org/rainfall",
                "<p>Rainfall totals for the last seven days</p>",
            ),
    );
    let sink = Arc::new(MemorySink::default());
    let engine = CrawlEngine::new(&test_config(ORIGIN, ""), site.clone(), sink.clone()).unwrap();

    let report = engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    assert_eq!(report.discovered, 2);
    assert_eq!(report.visited, 2);
    assert_eq!(site.render_count("https://example.org/weather"), 1);
    assert_eq!(site.render_count("https://example.org/rainfall"), 1);
    assert_eq!(sink.keys(), vec!["rainfall", "weather"]);
}

#[tokio::test]
async fn test_failed_page_does_not_stop_crawl() {
    let mut seed = String::new();
    let mut site = FakeSite::default();
    for name in ["alerts", "nowcast", "energy", "satellite"] {
        let url = format!("https://example.org/{}", name);
        seed.push_str(&format!(r#"<a href="/{}">{}</a>"#, name, name));
        site = site.page(&url, &format!("<p>Latest {} update for the whole region</p>", name));
    }
    let site = Arc::new(site.page(ORIGIN, &seed).failing("https://example.org/nowcast"));
    let sink = Arc::new(MemorySink::default());
    let engine = CrawlEngine::new(&test_config(ORIGIN, ""), site, sink.clone()).unwrap();

    let report = engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    assert_eq!(report.discovered, 4);
    assert_eq!(report.visited, 4);
    assert_eq!(report.saved, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(sink.keys(), vec!["alerts", "energy", "satellite"]);
}

#[tokio::test]
async fn test_pages_without_records_are_not_written() {
    let site = Arc::new(
        FakeSite::default()
            .page(ORIGIN, r#"<a href="/empty">E</a><a href="/full">F</a>"#)
            .page("https://example.org/empty", "<p>too short</p>")
            .page(
                "https://example.org/full",
                r#"<img src="/chart.png" alt="Chart">"#,
            ),
    );
    let sink = Arc::new(MemorySink::default());
    let engine = CrawlEngine::new(&test_config(ORIGIN, ""), site, sink.clone()).unwrap();

    let report = engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    assert_eq!(report.visited, 2);
    assert_eq!(report.saved, 1);
    assert_eq!(report.empty(), 1);
    assert_eq!(sink.keys(), vec!["full"]);
}

#[tokio::test]
async fn test_cancellation_abandons_in_flight_pages() {
    let site = Arc::new(
        FakeSite::default()
            .page(ORIGIN, r#"<a href="/slow-a">A</a><a href="/slow-b">B</a>"#)
            .page("https://example.org/slow-a", FORECAST_PAGE)
            .page("https://example.org/slow-b", FORECAST_PAGE)
            .stalling("https://example.org/slow-a")
            .stalling("https://example.org/slow-b"),
    );
    let sink = Arc::new(MemorySink::default());
    let config = test_config(ORIGIN, "[renderer]\nrender-timeout-ms = 60000");
    let engine = CrawlEngine::new(&config, site, sink.clone()).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(5), engine.run(ORIGIN, cancel))
        .await
        .expect("run should stop soon after cancellation")
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.saved, 0);
    assert!(sink.writes.lock().unwrap().is_empty());
    assert_eq!(*sink.status.lock().unwrap(), Some("interrupted"));
}

#[tokio::test]
async fn test_render_timeout_fails_only_that_page() {
    let site = Arc::new(
        FakeSite::default()
            .page(ORIGIN, r#"<a href="/slow">S</a><a href="/fast">F</a>"#)
            .page("https://example.org/fast", FORECAST_PAGE)
            .stalling("https://example.org/slow"),
    );
    let sink = Arc::new(MemorySink::default());
    let config = test_config(ORIGIN, "[renderer]\nrender-timeout-ms = 200");
    let engine = CrawlEngine::new(&config, site, sink.clone()).unwrap();

    let report = engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.saved, 1);
    assert_eq!(sink.keys(), vec!["fast"]);
}

#[tokio::test]
async fn test_custom_topics_override_defaults() {
    let site = Arc::new(
        FakeSite::default()
            .page(ORIGIN, r#"<a href="/forecast/tides">T</a>"#)
            .page("https://example.org/forecast/tides", FORECAST_PAGE),
    );
    let sink = Arc::new(MemorySink::default());
    let config = test_config(
        ORIGIN,
        r#"
[[topics]]
keyword = "tides"
label = "Ocean Applications"
"#,
    );
    let engine = CrawlEngine::new(&config, site, sink.clone()).unwrap();

    engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    let writes = sink.writes.lock().unwrap();
    assert!(writes[0]
        .1
        .iter()
        .all(|r| r.source_type == TopicLabel::OceanApplications));
}

#[tokio::test]
async fn test_http_harvest_to_csv() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/forecast">F</a><a href="/missing">M</a>"#),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FORECAST_PAGE))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&base_url, "");
    let renderer = Arc::new(HttpRenderer::new(&config.renderer).unwrap());
    let sink = Arc::new(CsvSink::new(dir.path(), config.output.schema).unwrap());
    let engine = CrawlEngine::new(&config, renderer, sink).unwrap();

    let seed = format!("{}/", base_url);
    let report = engine.run(&seed, CancellationToken::new()).await.unwrap();

    assert_eq!(report.saved, 1);
    assert_eq!(report.failed, 1);

    let mut reader = csv::Reader::from_path(dir.path().join("forecast.csv")).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, FULL_COLUMNS);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "Daily Forecast");
    assert_eq!(&rows[0][1], format!("{}/forecast", base_url));
    assert_eq!(&rows[0][2], "Forecast");
    assert_eq!(&rows[1][5], format!("{}/files/annual.pdf", base_url));
    assert_eq!(&rows[1][6], "2.5MB");
    assert!(!dir.path().join("missing.csv").exists());
}

#[tokio::test]
async fn test_harvest_to_sqlite() {
    let site = Arc::new(
        FakeSite::default()
            .page(ORIGIN, r#"<a href="/cyclone">C</a>"#)
            .page("https://example.org/cyclone", FORECAST_PAGE),
    );
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(SqliteSink::new(&dir.path().join("harvest.db"), "cfg-hash").unwrap());
    let engine = CrawlEngine::new(&test_config(ORIGIN, ""), site, sink.clone()).unwrap();

    engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    let rows = sink.records_for("cyclone").unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.source_type == "Cyclone"));
    assert_eq!(rows[1].section_type, "PDF");

    let run = sink.run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, "cfg-hash");
}

#[tokio::test]
async fn test_seed_failure_closes_sqlite_run_as_failed() {
    let site = Arc::new(FakeSite::default().failing(ORIGIN));
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(SqliteSink::new(&dir.path().join("harvest.db"), "cfg-hash").unwrap());
    let engine = CrawlEngine::new(&test_config(ORIGIN, ""), site, sink.clone()).unwrap();

    let result = engine.run(ORIGIN, CancellationToken::new()).await;
    assert!(result.is_err());

    let run = sink.run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.finished_at.is_some());
}

#[tokio::test]
async fn test_text_only_schema_skips_image_only_pages() {
    let site = Arc::new(
        FakeSite::default()
            .page(ORIGIN, r#"<a href="/gallery">G</a><a href="/forecast">F</a>"#)
            .page("https://example.org/gallery", r#"<img src="/a.png" alt="A">"#)
            .page("https://example.org/forecast", FORECAST_PAGE),
    );
    let dir = TempDir::new().unwrap();
    let config = test_config(ORIGIN, "[output]\nschema = \"text-only\"");
    let sink = Arc::new(CsvSink::new(dir.path(), config.output.schema).unwrap());
    let engine = CrawlEngine::new(&config, site, sink).unwrap();

    let report = engine.run(ORIGIN, CancellationToken::new()).await.unwrap();

    assert_eq!(report.visited, 2);
    assert_eq!(report.saved, 1);
    assert_eq!(report.records, 1);
    assert_eq!(report.empty(), 1);
    assert!(!dir.path().join("gallery_text.csv").exists());

    let mut reader = csv::Reader::from_path(dir.path().join("forecast_text.csv")).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, TEXT_COLUMNS);
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][4], "Heavy rain is expected this evening");
}
