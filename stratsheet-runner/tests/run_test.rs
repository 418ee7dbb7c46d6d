//! Integration tests for `run`: fetch fan-out, pipeline, and sinks against an
//! in-memory record source.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use stratsheet_core::record::{RawPerformance, RawQuote, RawTradesInfo};
use stratsheet_core::{OutputFormat, RawEntityRecord, Rendered, Section, SectionSet};
use stratsheet_runner::{
    run, CommitConfig, FetchConfig, FetchError, OutputConfig, RecordSource, RunConfig,
};

// ── Fixtures ─────────────────────────────────────────────────────────

/// Serves canned records; names without one always fail.
struct CannedSource {
    records: HashMap<String, RawEntityRecord>,
    attempts: Mutex<HashMap<String, u32>>,
}

impl CannedSource {
    fn new(names: &[&str]) -> Self {
        Self {
            records: names.iter().map(|n| (n.to_string(), record(n))).collect(),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    fn attempts(&self, name: &str) -> u32 {
        self.attempts.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

impl RecordSource for CannedSource {
    fn name(&self) -> &str {
        "canned"
    }

    fn fetch(&self, name: &str, _code: &str) -> Result<RawEntityRecord, FetchError> {
        *self
            .attempts
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_insert(0) += 1;
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::Network("connection refused".into()))
    }
}

fn record(name: &str) -> RawEntityRecord {
    let label = name.to_uppercase();
    let mut quotes = BTreeMap::new();
    quotes.insert(
        label.clone(),
        vec![
            RawQuote {
                date: "2021-01-01".into(),
                last: 100.0,
            },
            RawQuote {
                date: "2021-01-02".into(),
                last: 110.0,
            },
        ],
    );
    RawEntityRecord {
        label,
        code: format!("STRAT_{}", name.to_uppercase()),
        performance: RawPerformance {
            max_drawdown: -0.1,
            one_year_performance: 0.5,
            three_month_performance: 0.2,
            one_month_performance: 0.1,
            one_week_performance: 0.0,
            last12_month_perfs: vec![],
            quotes,
        },
        trades_info: RawTradesInfo::default(),
    }
}

fn config(format: OutputFormat, file: Option<String>) -> RunConfig {
    let mut config = RunConfig {
        fetch: FetchConfig {
            max_tries: 3,
            parallel: true,
            proxy: false,
        },
        output: OutputConfig { file },
        ..Default::default()
    };
    config.render.entities = vec!["cat".into(), "tige".into(), "lion".into()];
    config.render.sections = SectionSet::default().with(Section::Quotes);
    config.render.format = format;
    config
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 8, 16, 1, 30, 0).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn unavailable_entity_is_skipped_after_all_attempts() {
    let source = CannedSource::new(&["cat", "lion"]);
    let out = run(&config(OutputFormat::Json, None), &source, now()).unwrap();

    assert_eq!(out.skipped, vec!["tige"]);
    assert_eq!(source.attempts("tige"), 3);
    assert_eq!(source.attempts("cat"), 1);

    let v: serde_json::Value = serde_json::from_str(&out.text).unwrap();
    let bots: Vec<&String> = v["bots"].as_object().unwrap().keys().collect();
    assert_eq!(bots.len(), 2);
    assert!(v["bots"].get("tige").is_none());
    assert_eq!(v["v"], "210816-0130z");
}

#[test]
fn file_sink_expands_template_and_writes_text() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("%DATETIME%-stratSheet.tsv");
    let source = CannedSource::new(&["cat", "tige", "lion"]);
    let cfg = config(
        OutputFormat::Tsv,
        Some(template.to_string_lossy().into_owned()),
    );

    let out = run(&cfg, &source, now()).unwrap();
    let path = out.written_to.expect("file written");
    assert_eq!(path, dir.path().join("210816-0130z-stratSheet.tsv"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), out.text);
    assert!(matches!(out.rendered, Rendered::Matrix(_)));
    // Header plus one row per entity.
    assert_eq!(out.text.lines().count(), 4);
}

#[test]
fn sink_failures_do_not_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the write fail.
    let blocked = dir.path().join("taken");
    std::fs::create_dir(&blocked).unwrap();

    let mut cfg = config(
        OutputFormat::Json5,
        Some(blocked.to_string_lossy().into_owned()),
    );
    cfg.commit = Some(CommitConfig {
        url: "http://127.0.0.1:9/contents/strats.json".into(),
        token: "t0k".into(),
    });

    let source = CannedSource::new(&["cat"]);
    let out = run(&cfg, &source, now()).unwrap();
    assert!(out.written_to.is_none());
    assert!(!out.committed);
    assert!(out.text.starts_with("{\nv: '210816-0130z'"));
}

#[test]
fn sequential_fetch_gives_same_text() {
    let source = CannedSource::new(&["cat", "tige", "lion"]);
    let parallel = run(&config(OutputFormat::Json, None), &source, now()).unwrap();

    let mut cfg = config(OutputFormat::Json, None);
    cfg.fetch.parallel = false;
    let sequential = run(&cfg, &source, now()).unwrap();
    assert_eq!(parallel.text, sequential.text);
}

#[test]
fn invalid_config_is_an_error() {
    let mut cfg = config(OutputFormat::Json, None);
    cfg.render.entities.push("yeti".into());
    let source = CannedSource::new(&[]);
    let err = run(&cfg, &source, now()).unwrap_err();
    assert!(format!("{err:#}").contains("yeti"));
}
