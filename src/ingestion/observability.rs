use std::fmt;
use std::sync::Arc;

use crate::error::IngestionError;

use super::pipeline::SpreadsheetFormat;

/// Severity of a failed ingestion, used for observer callbacks and alerting thresholds.
///
/// Row-level issues never fail an upload; they surface through [`IngestionStats::warnings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// The upload was rejected (bad extension, unreadable workbook, missing columns).
    Error,
    /// Infrastructure failure, typically I/O.
    Critical,
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Name of the uploaded file.
    pub filename: String,
    /// Reader chosen for the file, if the extension was recognized.
    pub format: Option<SpreadsheetFormat>,
}

/// Stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Data rows read from the sheet.
    pub rows: usize,
    /// Observations produced.
    pub observations: usize,
    /// Row-level warnings collected.
    pub warnings: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits ingestion events as `tracing` events.
///
/// Successful uploads with row warnings are logged at `warn`, clean uploads at `info`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        if stats.warnings > 0 {
            tracing::warn!(
                filename = %ctx.filename,
                format = ?ctx.format,
                rows = stats.rows,
                observations = stats.observations,
                warnings = stats.warnings,
                "ingested with row warnings"
            );
        } else {
            tracing::info!(
                filename = %ctx.filename,
                format = ?ctx.format,
                rows = stats.rows,
                observations = stats.observations,
                "ingested"
            );
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            filename = %ctx.filename,
            format = ?ctx.format,
            severity = ?severity,
            error = %error,
            "ingestion failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            alert = true,
            filename = %ctx.filename,
            format = ?ctx.format,
            severity = ?severity,
            error = %error,
            "ingestion alert"
        );
    }
}
