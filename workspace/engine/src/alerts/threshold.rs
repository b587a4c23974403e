use chrono::{DateTime, Utc};
use model::entities::{
    alert_history::{self, Severity},
    spending_alert::{self, AlertType},
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::store::{LedgerStore, NewAlertHistory};

/// Evaluates a budget-threshold rule: fires when the spend-to-budget ratio
/// has reached the rule's configured percentage.
///
/// Severity escalates on fixed cutoffs independent of the configured
/// threshold: 100% of the budget is Critical, 90% is Warning, anything else
/// at or above the threshold is Info.
///
/// There is no deduplication window. While the condition holds, every sweep
/// appends another history entry.
#[instrument(skip(store, rule), fields(rule_id = rule.id, user_id = rule.user_id))]
pub async fn check_budget_threshold(
    store: &dyn LedgerStore,
    rule: &spending_alert::Model,
    now: DateTime<Utc>,
) -> Result<Option<alert_history::Model>> {
    // A misconfigured rule is a no-op, not an error: sweeps must not crash
    // on bad configuration. It is logged distinctly from "did not fire" so
    // the misconfiguration is at least visible somewhere.
    let (Some(budget_id), Some(threshold)) = (rule.budget_id, rule.threshold) else {
        warn!(
            "Rule id={} is missing a budget or threshold and can never fire",
            rule.id
        );
        return Ok(None);
    };
    let Some(budget) = store.find_budget(budget_id).await? else {
        warn!(
            "Rule id={} references budget id={} which does not exist",
            rule.id, budget_id
        );
        return Ok(None);
    };
    if budget.amount <= Decimal::ZERO {
        warn!(
            "Rule id={} references budget id={} with a non-positive amount",
            rule.id, budget.id
        );
        return Ok(None);
    }

    let spent = store
        .sum_expenses(
            rule.user_id,
            budget.category_id,
            budget.start_date,
            budget.end_date,
        )
        .await?;
    let percentage = spent / budget.amount * Decimal::from(100);

    if percentage < threshold {
        debug!(
            "Budget {} is at {}% of its limit, below the {}% threshold",
            budget.name,
            percentage.round_dp(1),
            threshold
        );
        return Ok(None);
    }

    let severity = if percentage >= Decimal::from(100) {
        Severity::Critical
    } else if percentage >= Decimal::from(90) {
        Severity::Warning
    } else {
        Severity::Info
    };

    let rounded = percentage.round_dp(1);
    let entry = NewAlertHistory {
        user_id: rule.user_id,
        alert_id: rule.id,
        alert_type: AlertType::BudgetThreshold,
        title: format!("Budget alert: {}", budget.name),
        message: format!(
            "You have spent {} of your {} budget for {} ({}% of the limit).",
            spent, budget.amount, budget.name, rounded
        ),
        severity,
        metadata: Some(json!({
            "budget_id": budget.id,
            "budget_amount": budget.amount,
            "spent": spent,
            "percentage": percentage,
            "threshold": threshold,
        })),
        created_at: now,
    };

    let saved = store.insert_alert_history(entry).await?;
    store.mark_rule_triggered(rule.id, now).await?;
    info!(
        "Budget threshold alert fired for rule id={} at {}% ({:?})",
        rule.id, rounded, saved.severity
    );
    Ok(Some(saved))
}
