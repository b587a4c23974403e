pub mod alerts;
pub mod error;
pub mod recurring;
pub mod store;

#[cfg(test)]
pub mod testing;

pub use error::{EngineError, Result};

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::warn;

use recurring::SweepResult;
use store::LedgerStore;

/// Tuning knobs shared by the sweep entry points.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Upper bound on the time spent on a single template or rule. A stuck
    /// item is abandoned and counted as that item's error, so it cannot
    /// stall the rest of the batch.
    pub item_timeout: Duration,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            item_timeout: Duration::from_secs(30),
        }
    }
}

/// Combined outcome of a full sweep cycle.
#[derive(Debug, Clone, Default)]
pub struct FullSweepSummary {
    pub recurring: SweepResult,
    /// Users whose alert rules were evaluated.
    pub users: usize,
    pub alerts_triggered: usize,
    pub alert_errors: usize,
}

/// Runs one full sweep cycle: materializes due recurring templates, then
/// evaluates every user's alert rules.
///
/// This is the entry point a periodic external trigger (cron) is expected to
/// invoke. The two halves are independent; a failing alert sweep for one
/// user is counted and never blocks another user's sweep.
pub async fn run_full_sweep(
    store: &dyn LedgerStore,
    now: DateTime<Utc>,
) -> Result<FullSweepSummary> {
    let recurring = recurring::run_recurring_sweep(store, now).await?;

    let users = store.list_user_ids().await?;
    let mut summary = FullSweepSummary {
        recurring,
        users: users.len(),
        ..Default::default()
    };
    for user_id in users {
        match alerts::run_alert_sweep(store, user_id, now).await {
            Ok(result) => {
                summary.alerts_triggered += result.triggered;
                summary.alert_errors += result.errors;
            }
            Err(err) => {
                warn!("Alert sweep failed for user id={}: {}", user_id, err);
                summary.alert_errors += 1;
            }
        }
    }

    Ok(summary)
}
