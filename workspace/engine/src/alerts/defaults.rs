use model::entities::spending_alert::{self, AlertType};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::error::Result;
use crate::store::{LedgerStore, NewAlertRule};

/// Threshold percentage the stock budget rule ships with.
const DEFAULT_THRESHOLD: i64 = 80;

/// Provisions the stock alert rules for a freshly created user: a budget
/// threshold at 80% and the unusual-spending monitor.
///
/// The threshold rule is created without a bound budget and stays inert
/// until the user binds one. Calling this twice creates a second pair of
/// rules; callers treat it as a one-time setup step.
#[instrument(skip(store))]
pub async fn initialize_default_alerts(
    store: &dyn LedgerStore,
    user_id: i32,
) -> Result<Vec<spending_alert::Model>> {
    let defaults = [
        NewAlertRule {
            user_id,
            alert_type: AlertType::BudgetThreshold,
            budget_id: None,
            category_id: None,
            threshold: Some(Decimal::from(DEFAULT_THRESHOLD)),
            enabled: true,
        },
        NewAlertRule {
            user_id,
            alert_type: AlertType::UnusualSpending,
            budget_id: None,
            category_id: None,
            threshold: None,
            enabled: true,
        },
    ];

    let mut created = Vec::new();
    for rule in defaults {
        created.push(store.insert_alert_rule(rule).await?);
    }

    info!(
        "Provisioned {} default alert rules for user id={}",
        created.len(),
        user_id
    );
    Ok(created)
}
