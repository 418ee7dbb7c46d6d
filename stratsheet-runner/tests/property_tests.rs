//! Property-based tests for the proxy rewrite and the retry loop.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use proptest::prelude::*;

use stratsheet_core::record::{RawPerformance, RawTradesInfo};
use stratsheet_core::RawEntityRecord;
use stratsheet_runner::{fetch_with_retry, proxify, FetchError, RecordSource};

// ── Fixtures ─────────────────────────────────────────────────────────

/// Fails the first `failures` calls, then succeeds.
struct FailingFirst {
    failures: u32,
    calls: AtomicU32,
}

impl RecordSource for FailingFirst {
    fn name(&self) -> &str {
        "failing-first"
    }

    fn fetch(&self, name: &str, code: &str) -> Result<RawEntityRecord, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err(FetchError::Network("reset".into()));
        }
        Ok(RawEntityRecord {
            label: name.to_uppercase(),
            code: code.to_string(),
            performance: RawPerformance {
                max_drawdown: 0.0,
                one_year_performance: 0.0,
                three_month_performance: 0.0,
                one_month_performance: 0.0,
                one_week_performance: 0.0,
                last12_month_perfs: vec![],
                quotes: BTreeMap::new(),
            },
            trades_info: RawTradesInfo::default(),
        })
    }
}

// ── Proxy rewrite ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn proxify_keeps_scheme_and_path(
        labels in prop::collection::vec("[a-z][a-z0-9]{0,8}", 1..4),
        path in "(/[A-Za-z0-9_]{1,10}){0,4}",
    ) {
        let host = labels.join(".");
        let url = format!("https://{host}{path}");
        let out = proxify(&url);

        let expected_host = format!("{}.translate.goog", labels.join("-"));
        prop_assert_eq!(out, format!("https://{expected_host}{path}"));
    }
}

// ── Retry ────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn retry_stops_at_first_success_or_budget(failures in 0u32..8, max_tries in 1u32..6) {
        let source = FailingFirst {
            failures,
            calls: AtomicU32::new(0),
        };
        let outcome = fetch_with_retry(&source, "cat", max_tries);

        prop_assert_eq!(source.calls.load(Ordering::SeqCst), (failures + 1).min(max_tries));
        prop_assert_eq!(outcome.is_available(), failures < max_tries);
    }
}
