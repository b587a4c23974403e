use chrono::{DateTime, Utc};
use model::entities::{alert_history, spending_alert, spending_alert::AlertType};
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, Result};
use crate::store::LedgerStore;
use crate::SweepOptions;

use super::threshold::check_budget_threshold;
use super::unusual::check_unusual_spending;

/// Aggregate outcome of one alert sweep for a single user.
#[derive(Debug, Clone, Default)]
pub struct AlertCheckResult {
    /// Rules that fired this sweep.
    pub triggered: usize,
    /// Rules whose evaluation failed and was skipped.
    pub errors: usize,
    /// The history entries written by this sweep.
    pub alerts: Vec<alert_history::Model>,
}

/// Evaluates every enabled alert rule for one user, with default options.
///
/// Rules are independent: a failure in one is logged and counted, never
/// allowed to suppress the others. Only total unavailability of the store is
/// returned as an error.
pub async fn run_alert_sweep(
    store: &dyn LedgerStore,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<AlertCheckResult> {
    run_alert_sweep_with_options(store, user_id, now, &SweepOptions::default()).await
}

#[instrument(skip(store, options), fields(user_id = user_id, now = %now))]
pub async fn run_alert_sweep_with_options(
    store: &dyn LedgerStore,
    user_id: i32,
    now: DateTime<Utc>,
    options: &SweepOptions,
) -> Result<AlertCheckResult> {
    let rules = store.list_enabled_alert_rules(user_id).await?;
    debug!("Evaluating {} enabled alert rules", rules.len());

    let mut result = AlertCheckResult::default();
    for rule in &rules {
        let outcome = tokio::time::timeout(options.item_timeout, evaluate_rule(store, rule, now))
            .await
            .unwrap_or_else(|_| {
                Err(EngineError::Timeout(format!(
                    "evaluation of rule id={} exceeded {:?}",
                    rule.id, options.item_timeout
                )))
            });
        match outcome {
            Ok(Some(alert)) => {
                result.triggered += 1;
                result.alerts.push(alert);
            }
            Ok(None) => {}
            Err(err) => {
                warn!("Evaluation of rule id={} failed: {}", rule.id, err);
                result.errors += 1;
            }
        }
    }

    info!(
        triggered = result.triggered,
        errors = result.errors,
        "Alert sweep finished"
    );
    Ok(result)
}

async fn evaluate_rule(
    store: &dyn LedgerStore,
    rule: &spending_alert::Model,
    now: DateTime<Utc>,
) -> Result<Option<alert_history::Model>> {
    match rule.alert_type {
        AlertType::BudgetThreshold => check_budget_threshold(store, rule, now).await,
        AlertType::UnusualSpending => check_unusual_spending(store, rule, now).await,
        // Reserved rule types: recognized, not evaluated yet
        AlertType::GoalMilestone | AlertType::RecurringDue => Ok(None),
    }
}
