use chrono::{DateTime, Duration, Utc};
use model::entities::{
    alert_history::{self, Severity},
    spending_alert::{self, AlertType},
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::store::{LedgerStore, NewAlertHistory};

/// How far back the rolling average looks.
const LOOKBACK_DAYS: i64 = 30;

/// Minimum number of expense entries in the window before the signal is
/// considered meaningful.
const MIN_SAMPLE: usize = 10;

/// Evaluates an unusual-spending rule: fires when today's expenses exceed
/// twice the trailing 30-day daily average. Severity is always Warning.
///
/// Like the threshold check, this has no deduplication window: further
/// sweeps on the same day keep firing while the condition holds.
#[instrument(skip(store, rule), fields(rule_id = rule.id, user_id = rule.user_id))]
pub async fn check_unusual_spending(
    store: &dyn LedgerStore,
    rule: &spending_alert::Model,
    now: DateTime<Utc>,
) -> Result<Option<alert_history::Model>> {
    let today = now.date_naive();
    let since = today - Duration::days(LOOKBACK_DAYS);

    let recent = store.list_recent_expenses(rule.user_id, since).await?;
    if recent.len() < MIN_SAMPLE {
        debug!(
            "Only {} expenses since {}, not enough signal for rule id={}",
            recent.len(),
            since,
            rule.id
        );
        return Ok(None);
    }

    let total: Decimal = recent.iter().map(|expense| expense.amount).sum();
    let avg_daily = total / Decimal::from(LOOKBACK_DAYS);
    let today_spend: Decimal = recent
        .iter()
        .filter(|expense| expense.date == today)
        .map(|expense| expense.amount)
        .sum();

    if today_spend <= avg_daily * Decimal::from(2) {
        debug!(
            "Today's spend {} is within twice the daily average {}",
            today_spend,
            avg_daily.round_dp(2)
        );
        return Ok(None);
    }

    // avg_daily is positive here: today's rows are part of the window, so a
    // firing today_spend forces a positive total
    let ratio = (today_spend / avg_daily).round_dp(2);
    let entry = NewAlertHistory {
        user_id: rule.user_id,
        alert_id: rule.id,
        alert_type: AlertType::UnusualSpending,
        title: "Unusual spending detected".to_string(),
        message: format!(
            "Today's spending of {} is {}x your 30-day daily average of {}.",
            today_spend,
            ratio,
            avg_daily.round_dp(2)
        ),
        severity: Severity::Warning,
        metadata: Some(json!({
            "today_spend": today_spend,
            "avg_daily": avg_daily,
            "ratio": ratio,
            "lookback_days": LOOKBACK_DAYS,
            "sample_size": recent.len(),
        })),
        created_at: now,
    };

    let saved = store.insert_alert_history(entry).await?;
    store.mark_rule_triggered(rule.id, now).await?;
    info!(
        "Unusual spending alert fired for rule id={}: {} vs daily average {}",
        rule.id,
        today_spend,
        avg_daily.round_dp(2)
    );
    Ok(Some(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SeaOrmLedgerStore;
    use crate::testing::{new_account, new_expense, new_unusual_rule, new_user, setup_db, utc_at};
    use chrono::NaiveDate;
    use sea_orm::EntityTrait;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Ten 200.00 expenses spread over the 14 days before "today"
    /// (2024-03-15), then `today_cents` spent today. 30-day total is
    /// 2800.00 + today.
    async fn scenario(
        today_cents: i64,
    ) -> (
        sea_orm::DatabaseConnection,
        SeaOrmLedgerStore,
        spending_alert::Model,
    ) {
        let db = setup_db().await.unwrap();
        let store = SeaOrmLedgerStore::new(db.clone());
        let user = new_user(&db).await.unwrap();
        let account = new_account(&db, &user).await.unwrap();
        for day in 1..=14 {
            new_expense(
                &db,
                &user,
                &account,
                None,
                Decimal::new(20000, 2),
                date(2024, 3, day),
            )
            .await
            .unwrap();
        }
        new_expense(
            &db,
            &user,
            &account,
            None,
            Decimal::new(today_cents, 2),
            date(2024, 3, 15),
        )
        .await
        .unwrap();
        let rule = new_unusual_rule(&db, &user).await.unwrap();
        (db, store, rule)
    }

    #[tokio::test]
    async fn test_fires_when_today_exceeds_twice_the_average() {
        // 30-day total 2800 + 200 = 3000, average 100; the extra cent tips
        // today's spend over double the average
        let (_db, store, rule) = scenario(20001).await;
        let alert = check_unusual_spending(&store, &rule, utc_at(2024, 3, 15))
            .await
            .unwrap()
            .expect("should fire above twice the average");
        assert_eq!(alert.severity, Severity::Warning);
        assert_eq!(alert.alert_type, AlertType::UnusualSpending);
        let metadata = alert.metadata.unwrap();
        assert_eq!(metadata["sample_size"], 15);
    }

    #[tokio::test]
    async fn test_exactly_twice_the_average_does_not_fire() {
        // Total 3000, average exactly 100, today 200.00: the comparison is
        // strict
        let (db, store, rule) = scenario(20000).await;
        let alert = check_unusual_spending(&store, &rule, utc_at(2024, 3, 15))
            .await
            .unwrap();
        assert!(alert.is_none());

        let history = alert_history::Entity::find().all(&db).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_sample_is_a_noop() {
        let db = setup_db().await.unwrap();
        let store = SeaOrmLedgerStore::new(db.clone());
        let user = new_user(&db).await.unwrap();
        let account = new_account(&db, &user).await.unwrap();
        // Nine expenses, one short of the minimum sample, with a wildly
        // anomalous spend today
        for day in 1..=8 {
            new_expense(
                &db,
                &user,
                &account,
                None,
                Decimal::new(1000, 2),
                date(2024, 3, day),
            )
            .await
            .unwrap();
        }
        new_expense(
            &db,
            &user,
            &account,
            None,
            Decimal::new(100000, 2),
            date(2024, 3, 15),
        )
        .await
        .unwrap();
        let rule = new_unusual_rule(&db, &user).await.unwrap();

        let alert = check_unusual_spending(&store, &rule, utc_at(2024, 3, 15))
            .await
            .unwrap();
        assert!(alert.is_none());
    }

    #[tokio::test]
    async fn test_expenses_outside_the_window_are_ignored() {
        let db = setup_db().await.unwrap();
        let store = SeaOrmLedgerStore::new(db.clone());
        let user = new_user(&db).await.unwrap();
        let account = new_account(&db, &user).await.unwrap();
        // Plenty of history, but all of it older than the 30-day window
        for day in 1..=12 {
            new_expense(
                &db,
                &user,
                &account,
                None,
                Decimal::new(20000, 2),
                date(2023, 12, day),
            )
            .await
            .unwrap();
        }
        new_expense(
            &db,
            &user,
            &account,
            None,
            Decimal::new(50000, 2),
            date(2024, 3, 15),
        )
        .await
        .unwrap();
        let rule = new_unusual_rule(&db, &user).await.unwrap();

        let alert = check_unusual_spending(&store, &rule, utc_at(2024, 3, 15))
            .await
            .unwrap();
        assert!(alert.is_none());
    }
}
