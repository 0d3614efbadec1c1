use std::sync::{Arc, Mutex};

use econ_data_approval::IngestionError;
use econ_data_approval::ingestion::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionOptions, IngestionSeverity,
    IngestionStats, SpreadsheetFormat, TracingObserver, ingest_from_path, ingest_workbook,
};
use rust_xlsxwriter::Workbook;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(String, IngestionStats)>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push((ctx.filename.clone(), stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        if ctx.filename.ends_with(".xlsx") {
            assert_eq!(ctx.format, Some(SpreadsheetFormat::Xlsx));
        }
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn sheet(header: &[&str], rows: &[[&str; 3]]) -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    for (c, h) in header.iter().enumerate() {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            if !v.is_empty() {
                ws.write_string(r as u32 + 1, c as u16, *v).unwrap();
            }
        }
    }
    wb.save_to_buffer().unwrap()
}

fn options(obs: &Arc<RecordingObserver>, alert_at_or_above: IngestionSeverity) -> IngestionOptions {
    IngestionOptions {
        observer: Some(obs.clone()),
        alert_at_or_above,
    }
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let bytes = sheet(
        &["date", "series", "value"],
        &[["2023-01-01", "GDP", "1"], ["2023-02-01", "GDP", ""], ["", "GDP", "3"]],
    );

    ingest_workbook(&bytes, "gdp.xlsx", &options(&obs, IngestionSeverity::Critical)).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(
        successes,
        vec![(
            "gdp.xlsx".to_string(),
            IngestionStats {
                rows: 3,
                observations: 2,
                warnings: 2,
            }
        )]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn missing_columns_fail_without_alert_below_threshold() {
    let obs = Arc::new(RecordingObserver::default());
    let bytes = sheet(&["date", "series", "units"], &[["2023-01-01", "GDP", "USD"]]);

    let err = ingest_workbook(&bytes, "gdp.xlsx", &options(&obs, IngestionSeverity::Critical)).unwrap_err();
    assert!(matches!(err, IngestionError::MissingColumns { .. }));

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
    assert!(obs.successes.lock().unwrap().is_empty());
}

#[test]
fn alert_fires_when_threshold_is_met() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = options(&obs, IngestionSeverity::Error);

    let _ = ingest_workbook(b"not a workbook", "gdp.xlsx", &opts).unwrap_err();
    let _ = ingest_workbook(b"", "gdp.ods", &opts).unwrap_err();

    assert_eq!(
        obs.failures.lock().unwrap().clone(),
        vec![IngestionSeverity::Error, IngestionSeverity::Error]
    );
    assert_eq!(
        obs.alerts.lock().unwrap().clone(),
        vec![IngestionSeverity::Error, IngestionSeverity::Error]
    );
}

#[test]
fn unreadable_path_is_a_critical_failure_and_alerts() {
    let obs = Arc::new(RecordingObserver::default());
    let err = ingest_from_path(
        "tests/fixtures/does_not_exist.xlsx",
        &options(&obs, IngestionSeverity::Critical),
    )
    .unwrap_err();

    assert!(matches!(err, IngestionError::Io(_)));
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
}

#[test]
fn composite_fans_out_to_every_observer() {
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestionObserver>> = vec![a.clone(), b.clone(), Arc::new(TracingObserver)];
    let opts = IngestionOptions {
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        alert_at_or_above: IngestionSeverity::Error,
    };

    let bytes = sheet(&["date", "series", "value"], &[["2023-01-01", "GDP", "1"]]);
    ingest_workbook(&bytes, "gdp.xlsx", &opts).unwrap();
    let _ = ingest_workbook(b"junk", "gdp.xlsx", &opts).unwrap_err();

    for obs in [&a, &b] {
        assert_eq!(obs.successes.lock().unwrap().len(), 1);
        assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
        assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    }
}
