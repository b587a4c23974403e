use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use model::entities::{
    alert_history, budget, spending_alert, transaction, user,
    alert_history::Severity,
    spending_alert::AlertType,
    transaction::TransactionKind,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::trace;

use crate::error::Result;

/// Field set for a new ledger row materialized from a recurring template.
#[derive(Debug, Clone)]
pub struct NewInstance {
    pub user_id: i32,
    pub account_id: i32,
    pub category_id: Option<i32>,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub description: String,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub parent_template_id: i32,
}

/// Template columns written when an instance is materialized.
///
/// `expected_due` is the `next_due_date` value the sweep read before
/// computing the step; the store uses it as an optimistic guard so two
/// concurrent sweeps cannot both advance the same template.
#[derive(Debug, Clone)]
pub struct TemplateAdvance {
    pub expected_due: Option<NaiveDate>,
    pub last_generated_date: DateTime<Utc>,
    pub next_due_date: NaiveDate,
}

/// Field set for a new alert history entry.
#[derive(Debug, Clone)]
pub struct NewAlertHistory {
    pub user_id: i32,
    pub alert_id: i32,
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Field set for a new alert rule.
#[derive(Debug, Clone)]
pub struct NewAlertRule {
    pub user_id: i32,
    pub alert_type: AlertType,
    pub budget_id: Option<i32>,
    pub category_id: Option<i32>,
    pub threshold: Option<Decimal>,
    pub enabled: bool,
}

/// Capability contract between the engines and the ledger database.
///
/// The engines depend on this trait rather than on a concrete connection so
/// that the persistence side stays swappable and the sweeps stay testable
/// against doubles.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Templates due for materialization: recurring, frequency set, and
    /// `next_due_date` on or before `now`'s date (or not yet initialized).
    async fn list_due_templates(&self, now: DateTime<Utc>) -> Result<Vec<transaction::Model>>;

    /// Recurring templates whose `next_due_date` has never been set.
    async fn list_uninitialized_templates(&self) -> Result<Vec<transaction::Model>>;

    /// Sets `next_due_date` on a template, only if it is still null.
    /// Returns whether a write happened.
    async fn initialize_due_date(&self, template_id: i32, next_due: NaiveDate) -> Result<bool>;

    /// Inserts the generated instance and advances the template in a single
    /// atomic transaction, guarded on the template's previously-read
    /// `next_due_date`. Returns `false` (and writes nothing) when the guard
    /// misses, i.e. a concurrent sweep already advanced this template.
    async fn materialize_template(
        &self,
        template: &transaction::Model,
        instance: NewInstance,
        advance: TemplateAdvance,
    ) -> Result<bool>;

    async fn list_enabled_alert_rules(&self, user_id: i32)
        -> Result<Vec<spending_alert::Model>>;

    async fn find_budget(&self, budget_id: i32) -> Result<Option<budget::Model>>;

    /// Sum of concrete expense entries for one user and category within the
    /// inclusive date range.
    async fn sum_expenses(
        &self,
        user_id: i32,
        category_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal>;

    /// Concrete expense entries for one user dated on or after `since`.
    async fn list_recent_expenses(
        &self,
        user_id: i32,
        since: NaiveDate,
    ) -> Result<Vec<transaction::Model>>;

    async fn insert_alert_history(&self, entry: NewAlertHistory) -> Result<alert_history::Model>;

    async fn mark_rule_triggered(&self, rule_id: i32, at: DateTime<Utc>) -> Result<()>;

    async fn insert_alert_rule(&self, rule: NewAlertRule) -> Result<spending_alert::Model>;

    /// All user ids, for the full-sweep entry point that evaluates every
    /// user's rules.
    async fn list_user_ids(&self) -> Result<Vec<i32>>;
}

/// [`LedgerStore`] backed by a SeaORM connection.
#[derive(Clone, Debug)]
pub struct SeaOrmLedgerStore {
    db: DatabaseConnection,
}

impl SeaOrmLedgerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LedgerStore for SeaOrmLedgerStore {
    async fn list_due_templates(&self, now: DateTime<Utc>) -> Result<Vec<transaction::Model>> {
        let today = now.date_naive();
        trace!("Listing recurring templates due on or before {}", today);
        let templates = transaction::Entity::find()
            .filter(transaction::Column::IsRecurring.eq(true))
            .filter(transaction::Column::Frequency.is_not_null())
            .filter(
                Condition::any()
                    .add(transaction::Column::NextDueDate.lte(today))
                    .add(transaction::Column::NextDueDate.is_null()),
            )
            .all(&self.db)
            .await?;
        Ok(templates)
    }

    async fn list_uninitialized_templates(&self) -> Result<Vec<transaction::Model>> {
        let templates = transaction::Entity::find()
            .filter(transaction::Column::IsRecurring.eq(true))
            .filter(transaction::Column::Frequency.is_not_null())
            .filter(transaction::Column::NextDueDate.is_null())
            .all(&self.db)
            .await?;
        Ok(templates)
    }

    async fn initialize_due_date(&self, template_id: i32, next_due: NaiveDate) -> Result<bool> {
        // Guarded on null so re-running the backfill never moves a date
        let result = transaction::Entity::update_many()
            .col_expr(transaction::Column::NextDueDate, Expr::value(next_due))
            .filter(transaction::Column::Id.eq(template_id))
            .filter(transaction::Column::NextDueDate.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn materialize_template(
        &self,
        template: &transaction::Model,
        instance: NewInstance,
        advance: TemplateAdvance,
    ) -> Result<bool> {
        let txn = self.db.begin().await?;

        transaction::ActiveModel {
            user_id: Set(instance.user_id),
            account_id: Set(instance.account_id),
            category_id: Set(instance.category_id),
            amount: Set(instance.amount),
            kind: Set(instance.kind),
            description: Set(instance.description),
            notes: Set(instance.notes),
            date: Set(instance.date),
            is_recurring: Set(false),
            frequency: Set(None),
            last_generated_date: Set(None),
            next_due_date: Set(None),
            parent_template_id: Set(Some(instance.parent_template_id)),
            is_pending: Set(false),
            is_projected: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut guard = transaction::Entity::update_many()
            .col_expr(
                transaction::Column::LastGeneratedDate,
                Expr::value(advance.last_generated_date),
            )
            .col_expr(
                transaction::Column::NextDueDate,
                Expr::value(advance.next_due_date),
            )
            .filter(transaction::Column::Id.eq(template.id));
        guard = match advance.expected_due {
            Some(due) => guard.filter(transaction::Column::NextDueDate.eq(due)),
            None => guard.filter(transaction::Column::NextDueDate.is_null()),
        };

        let result = guard.exec(&txn).await?;
        if result.rows_affected == 0 {
            // Another sweep advanced this template between our read and
            // write; drop the instance insert along with the transaction.
            txn.rollback().await?;
            return Ok(false);
        }

        txn.commit().await?;
        Ok(true)
    }

    async fn list_enabled_alert_rules(
        &self,
        user_id: i32,
    ) -> Result<Vec<spending_alert::Model>> {
        let rules = spending_alert::Entity::find()
            .filter(spending_alert::Column::UserId.eq(user_id))
            .filter(spending_alert::Column::Enabled.eq(true))
            .all(&self.db)
            .await?;
        Ok(rules)
    }

    async fn find_budget(&self, budget_id: i32) -> Result<Option<budget::Model>> {
        let budget = budget::Entity::find_by_id(budget_id).one(&self.db).await?;
        Ok(budget)
    }

    async fn sum_expenses(
        &self,
        user_id: i32,
        category_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal> {
        let total: Option<Option<Decimal>> = transaction::Entity::find()
            .select_only()
            .column_as(transaction::Column::Amount.sum(), "total")
            .filter(transaction::Column::UserId.eq(user_id))
            .filter(transaction::Column::CategoryId.eq(category_id))
            .filter(transaction::Column::Kind.eq(TransactionKind::Expense))
            .filter(transaction::Column::IsRecurring.eq(false))
            .filter(transaction::Column::Date.between(from, to))
            .into_tuple()
            .one(&self.db)
            .await?;
        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    async fn list_recent_expenses(
        &self,
        user_id: i32,
        since: NaiveDate,
    ) -> Result<Vec<transaction::Model>> {
        let expenses = transaction::Entity::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .filter(transaction::Column::Kind.eq(TransactionKind::Expense))
            .filter(transaction::Column::IsRecurring.eq(false))
            .filter(transaction::Column::Date.gte(since))
            .order_by_asc(transaction::Column::Date)
            .all(&self.db)
            .await?;
        Ok(expenses)
    }

    async fn insert_alert_history(&self, entry: NewAlertHistory) -> Result<alert_history::Model> {
        let saved = alert_history::ActiveModel {
            user_id: Set(entry.user_id),
            alert_id: Set(entry.alert_id),
            alert_type: Set(entry.alert_type),
            title: Set(entry.title),
            message: Set(entry.message),
            severity: Set(entry.severity),
            is_read: Set(false),
            metadata: Set(entry.metadata),
            created_at: Set(entry.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(saved)
    }

    async fn mark_rule_triggered(&self, rule_id: i32, at: DateTime<Utc>) -> Result<()> {
        spending_alert::Entity::update_many()
            .col_expr(spending_alert::Column::LastTriggeredAt, Expr::value(at))
            .filter(spending_alert::Column::Id.eq(rule_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn insert_alert_rule(&self, rule: NewAlertRule) -> Result<spending_alert::Model> {
        let saved = spending_alert::ActiveModel {
            user_id: Set(rule.user_id),
            alert_type: Set(rule.alert_type),
            budget_id: Set(rule.budget_id),
            category_id: Set(rule.category_id),
            threshold: Set(rule.threshold),
            enabled: Set(rule.enabled),
            last_triggered_at: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(saved)
    }

    async fn list_user_ids(&self) -> Result<Vec<i32>> {
        let ids = user::Entity::find()
            .select_only()
            .column(user::Column::Id)
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }
}
