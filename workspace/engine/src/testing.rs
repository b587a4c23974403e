//! Shared fixtures and store doubles for the engine tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use migration::{Migrator, MigratorTrait};
use model::entities::{
    account, alert_history, budget, category, spending_alert, spending_alert::AlertType,
    transaction, transaction::TransactionKind, user,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, Set};

use crate::error::{EngineError, Result as EngineResult};
use crate::store::{
    LedgerStore, NewAlertHistory, NewAlertRule, NewInstance, SeaOrmLedgerStore, TemplateAdvance,
};

pub type Result<T> = std::result::Result<T, DbErr>;

pub async fn setup_db() -> Result<DatabaseConnection> {
    // Connect to the SQLite database
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    // Try to apply migrations first
    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Noon UTC on the given day.
pub fn utc_at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub async fn new_user(db: &DatabaseConnection) -> Result<user::Model> {
    static USER_ID: AtomicU64 = AtomicU64::new(0);

    let current_id = USER_ID.fetch_add(1, Ordering::SeqCst);
    user::ActiveModel {
        username: Set(format!("user_{}", current_id)),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_account(db: &DatabaseConnection, user: &user::Model) -> Result<account::Model> {
    account::ActiveModel {
        name: Set("Test account".to_string()),
        description: Set(Some("Account for sweep testing".to_string())),
        currency_code: Set("USD".to_string()),
        owner_id: Set(user.id),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_category(db: &DatabaseConnection) -> Result<category::Model> {
    static CATEGORY_ID: AtomicU64 = AtomicU64::new(0);

    let current_id = CATEGORY_ID.fetch_add(1, Ordering::SeqCst);
    category::ActiveModel {
        name: Set(format!("Category {}", current_id)),
        description: Set(None),
        parent_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_template(
    db: &DatabaseConnection,
    user: &user::Model,
    account: &account::Model,
    amount: Decimal,
    frequency: &str,
    anchor: NaiveDate,
    next_due: Option<NaiveDate>,
) -> Result<transaction::Model> {
    new_template_with_category(db, user, account, None, amount, frequency, anchor, next_due).await
}

#[allow(clippy::too_many_arguments)]
pub async fn new_template_with_category(
    db: &DatabaseConnection,
    user: &user::Model,
    account: &account::Model,
    category_id: Option<i32>,
    amount: Decimal,
    frequency: &str,
    anchor: NaiveDate,
    next_due: Option<NaiveDate>,
) -> Result<transaction::Model> {
    transaction::ActiveModel {
        user_id: Set(user.id),
        account_id: Set(account.id),
        category_id: Set(category_id),
        amount: Set(amount),
        kind: Set(TransactionKind::Expense),
        description: Set("Rent".to_string()),
        notes: Set(None),
        date: Set(anchor),
        is_recurring: Set(true),
        frequency: Set(Some(frequency.to_string())),
        last_generated_date: Set(None),
        next_due_date: Set(next_due),
        parent_template_id: Set(None),
        is_pending: Set(false),
        is_projected: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_expense(
    db: &DatabaseConnection,
    user: &user::Model,
    account: &account::Model,
    category_id: Option<i32>,
    amount: Decimal,
    date: NaiveDate,
) -> Result<transaction::Model> {
    transaction::ActiveModel {
        user_id: Set(user.id),
        account_id: Set(account.id),
        category_id: Set(category_id),
        amount: Set(amount),
        kind: Set(TransactionKind::Expense),
        description: Set("Expense".to_string()),
        notes: Set(None),
        date: Set(date),
        is_recurring: Set(false),
        frequency: Set(None),
        last_generated_date: Set(None),
        next_due_date: Set(None),
        parent_template_id: Set(None),
        is_pending: Set(false),
        is_projected: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_budget(
    db: &DatabaseConnection,
    user: &user::Model,
    category: &category::Model,
    name: &str,
    amount: Decimal,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<budget::Model> {
    budget::ActiveModel {
        user_id: Set(user.id),
        name: Set(name.to_string()),
        category_id: Set(category.id),
        amount: Set(amount),
        start_date: Set(start_date),
        end_date: Set(end_date),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_threshold_rule(
    db: &DatabaseConnection,
    user: &user::Model,
    budget_id: Option<i32>,
    threshold: Option<Decimal>,
) -> Result<spending_alert::Model> {
    spending_alert::ActiveModel {
        user_id: Set(user.id),
        alert_type: Set(AlertType::BudgetThreshold),
        budget_id: Set(budget_id),
        category_id: Set(None),
        threshold: Set(threshold),
        enabled: Set(true),
        last_triggered_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_unusual_rule(
    db: &DatabaseConnection,
    user: &user::Model,
) -> Result<spending_alert::Model> {
    new_rule(db, user, AlertType::UnusualSpending).await
}

pub async fn new_rule(
    db: &DatabaseConnection,
    user: &user::Model,
    alert_type: AlertType,
) -> Result<spending_alert::Model> {
    spending_alert::ActiveModel {
        user_id: Set(user.id),
        alert_type: Set(alert_type),
        budget_id: Set(None),
        category_id: Set(None),
        threshold: Set(None),
        enabled: Set(true),
        last_triggered_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn disable_rule(db: &DatabaseConnection, rule_id: i32) -> Result<()> {
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
    use sea_orm::sea_query::Expr;

    spending_alert::Entity::update_many()
        .col_expr(spending_alert::Column::Enabled, Expr::value(false))
        .filter(spending_alert::Column::Id.eq(rule_id))
        .exec(db)
        .await?;
    Ok(())
}

/// A [`LedgerStore`] that delegates to the real SeaORM store but fails
/// selected operations, for exercising per-item error isolation.
pub struct FaultyStore {
    inner: SeaOrmLedgerStore,
    fail_materialize_for: Option<i32>,
    fail_sum_expenses: bool,
}

impl FaultyStore {
    pub fn failing_materialize(inner: SeaOrmLedgerStore, template_id: i32) -> Self {
        Self {
            inner,
            fail_materialize_for: Some(template_id),
            fail_sum_expenses: false,
        }
    }

    pub fn failing_sum_expenses(inner: SeaOrmLedgerStore) -> Self {
        Self {
            inner,
            fail_materialize_for: None,
            fail_sum_expenses: true,
        }
    }
}

#[async_trait]
impl LedgerStore for FaultyStore {
    async fn list_due_templates(
        &self,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<transaction::Model>> {
        self.inner.list_due_templates(now).await
    }

    async fn list_uninitialized_templates(&self) -> EngineResult<Vec<transaction::Model>> {
        self.inner.list_uninitialized_templates().await
    }

    async fn initialize_due_date(
        &self,
        template_id: i32,
        next_due: NaiveDate,
    ) -> EngineResult<bool> {
        self.inner.initialize_due_date(template_id, next_due).await
    }

    async fn materialize_template(
        &self,
        template: &transaction::Model,
        instance: NewInstance,
        advance: TemplateAdvance,
    ) -> EngineResult<bool> {
        if self.fail_materialize_for == Some(template.id) {
            return Err(EngineError::Template(format!(
                "injected failure for template id={}",
                template.id
            )));
        }
        self.inner
            .materialize_template(template, instance, advance)
            .await
    }

    async fn list_enabled_alert_rules(
        &self,
        user_id: i32,
    ) -> EngineResult<Vec<spending_alert::Model>> {
        self.inner.list_enabled_alert_rules(user_id).await
    }

    async fn find_budget(&self, budget_id: i32) -> EngineResult<Option<budget::Model>> {
        self.inner.find_budget(budget_id).await
    }

    async fn sum_expenses(
        &self,
        user_id: i32,
        category_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Decimal> {
        if self.fail_sum_expenses {
            return Err(EngineError::Rule(
                "injected failure in expense aggregation".to_string(),
            ));
        }
        self.inner.sum_expenses(user_id, category_id, from, to).await
    }

    async fn list_recent_expenses(
        &self,
        user_id: i32,
        since: NaiveDate,
    ) -> EngineResult<Vec<transaction::Model>> {
        self.inner.list_recent_expenses(user_id, since).await
    }

    async fn insert_alert_history(
        &self,
        entry: NewAlertHistory,
    ) -> EngineResult<alert_history::Model> {
        self.inner.insert_alert_history(entry).await
    }

    async fn mark_rule_triggered(&self, rule_id: i32, at: DateTime<Utc>) -> EngineResult<()> {
        self.inner.mark_rule_triggered(rule_id, at).await
    }

    async fn insert_alert_rule(
        &self,
        rule: NewAlertRule,
    ) -> EngineResult<spending_alert::Model> {
        self.inner.insert_alert_rule(rule).await
    }

    async fn list_user_ids(&self) -> EngineResult<Vec<i32>> {
        self.inner.list_user_ids().await
    }
}
