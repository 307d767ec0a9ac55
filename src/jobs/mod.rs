//! Scheduled Jobs
//!
//! Background maintenance for the stock ledger. The audit job walks every
//! stock item, compares stored balances with a fresh recomputation and
//! optionally rewrites drifted rows.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::interval;

use crate::error::AppError;
use crate::ledger::{LedgerEngine, LedgerStore};

// =========================================================================
// Ledger audit
// =========================================================================

/// Outcome of one audit pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub items_checked: usize,
    pub items_with_drift: usize,
    pub rows_corrected: usize,
    pub errors: Vec<String>,
}

/// Verify every ledger chain, repairing drift when `repair` is set.
///
/// A failure on one stock item is recorded and the pass continues.
pub async fn audit_ledgers<S: LedgerStore>(
    engine: &LedgerEngine<S>,
    repair: bool,
) -> Result<AuditSummary, JobError> {
    let keys = engine.store().stock_item_keys().await.map_err(AppError::from)?;
    let mut summary = AuditSummary::default();

    for (tenant_id, stock_item_id) in keys {
        summary.items_checked += 1;

        let drift = match engine.verify(tenant_id, stock_item_id).await {
            Ok(drift) => drift,
            Err(e) => {
                summary
                    .errors
                    .push(format!("{tenant_id}/{stock_item_id}: {e}"));
                continue;
            }
        };

        if drift.is_empty() {
            continue;
        }

        summary.items_with_drift += 1;
        tracing::warn!(
            tenant_id = %tenant_id,
            stock_item_id = %stock_item_id,
            drifted_rows = drift.len(),
            "Ledger chain out of balance"
        );

        if repair {
            match engine.repair(tenant_id, stock_item_id).await {
                Ok(corrected) => summary.rows_corrected += corrected,
                Err(e) => summary
                    .errors
                    .push(format!("{tenant_id}/{stock_item_id}: {e}")),
            }
        }
    }

    if summary.items_with_drift > 0 || !summary.errors.is_empty() {
        tracing::info!(
            items_checked = summary.items_checked,
            items_with_drift = summary.items_with_drift,
            rows_corrected = summary.rows_corrected,
            errors = summary.errors.len(),
            "Ledger audit finished"
        );
    }

    Ok(summary)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// Interval between ledger audits (default: 1 hour)
    pub ledger_audit_interval: Duration,
    /// Rewrite drifted balances instead of only reporting them
    pub repair_drift: bool,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            ledger_audit_interval: Duration::from_secs(3600),
            repair_drift: true,
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler<S> {
    engine: LedgerEngine<S>,
    config: JobSchedulerConfig,
}

impl<S> JobScheduler<S>
where
    S: LedgerStore + 'static,
{
    /// Create a new job scheduler
    pub fn new(engine: LedgerEngine<S>) -> Self {
        Self {
            engine,
            config: JobSchedulerConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(engine: LedgerEngine<S>, config: JobSchedulerConfig) -> Self {
        Self { engine, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.ledger_audit_interval.as_secs(),
            "Job scheduler started"
        );

        let mut audit_interval = interval(self.config.ledger_audit_interval);

        loop {
            audit_interval.tick().await;
            if let Err(e) = audit_ledgers(&self.engine, self.config.repair_drift).await {
                tracing::error!(error = %e, "Ledger audit failed");
            }
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match audit_ledgers(&self.engine, self.config.repair_drift).await {
            Ok(summary) => {
                report.errors.extend(summary.errors.iter().cloned());
                report.ledger_audit = summary;
            }
            Err(e) => report.errors.push(format!("Ledger audit: {}", e)),
        }

        report.completed_at = Utc::now();
        report
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub ledger_audit: AuditSummary,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    App(#[from] AppError),
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Quantity, StockItemId, TenantId};
    use crate::ledger::MemoryLedgerStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    async fn seeded_engine() -> (LedgerEngine<MemoryLedgerStore>, TenantId, StockItemId) {
        let engine = LedgerEngine::new(MemoryLedgerStore::new());
        let tenant = TenantId::new();
        let item = StockItemId::new();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        engine.register_stock_item(tenant, item, "Ink", dec!(30)).await.unwrap();
        engine.append_entry(tenant, item, day, dec!(5), dec!(0)).await.unwrap();
        engine.append_entry(tenant, item, day, dec!(5), dec!(1)).await.unwrap();
        (engine, tenant, item)
    }

    #[test]
    fn test_job_scheduler_config_default() {
        let config = JobSchedulerConfig::default();
        assert_eq!(config.ledger_audit_interval, Duration::from_secs(3600));
        assert!(config.repair_drift);
    }

    #[test]
    fn test_maintenance_report_default() {
        let report = MaintenanceReport::default();
        assert_eq!(report.ledger_audit.items_checked, 0);
        assert_eq!(report.errors.len(), 0);
    }

    #[tokio::test]
    async fn test_audit_clean_ledgers() {
        let (engine, _, _) = seeded_engine().await;

        let summary = audit_ledgers(&engine, true).await.unwrap();
        assert_eq!(summary.items_checked, 1);
        assert_eq!(summary.items_with_drift, 0);
        assert_eq!(summary.rows_corrected, 0);
    }

    #[tokio::test]
    async fn test_audit_reports_without_repair() {
        let (engine, tenant, item) = seeded_engine().await;
        engine
            .store()
            .corrupt_remaining(tenant, item, 1, Quantity::ZERO)
            .await
            .unwrap();

        let summary = audit_ledgers(&engine, false).await.unwrap();
        assert_eq!(summary.items_with_drift, 1);
        assert_eq!(summary.rows_corrected, 0);
        assert_eq!(engine.verify(tenant, item).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_scheduler_run_once_repairs() {
        let (engine, tenant, item) = seeded_engine().await;
        engine
            .store()
            .corrupt_remaining(tenant, item, 1, Quantity::ZERO)
            .await
            .unwrap();

        let scheduler = JobScheduler::new(engine);
        let report = scheduler.run_all_once().await;

        assert!(report.errors.is_empty());
        assert_eq!(report.ledger_audit.items_with_drift, 1);
        assert_eq!(report.ledger_audit.rows_corrected, 1);
    }
}
