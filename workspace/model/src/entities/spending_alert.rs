use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{budget, category, user};

/// The kind of condition a spending alert rule watches for.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AlertType {
    /// Spend-to-budget ratio crossed the configured percentage.
    #[sea_orm(string_value = "BudgetThreshold")]
    BudgetThreshold,
    /// A day's spend significantly exceeds the rolling historical average.
    #[sea_orm(string_value = "UnusualSpending")]
    UnusualSpending,
    /// Reserved rule type; recognized but not evaluated yet.
    #[sea_orm(string_value = "GoalMilestone")]
    GoalMilestone,
    /// Reserved rule type; recognized but not evaluated yet.
    #[sea_orm(string_value = "RecurringDue")]
    RecurringDue,
}

/// A spending alert rule: one standing condition the alert engine evaluates
/// on every sweep for the owning user. The engine only ever reads these and
/// bumps `last_triggered_at`; creation and editing belong to the CRUD
/// surface.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "spending_alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub alert_type: AlertType,
    /// The budget a threshold rule is bound to. A threshold rule without a
    /// budget can never fire.
    pub budget_id: Option<i32>,
    pub category_id: Option<i32>,
    /// Threshold percentage for budget rules (e.g. 80 means "alert at 80%
    /// of the budget").
    #[sea_orm(column_type = "Decimal(Some((7, 2)))", nullable)]
    pub threshold: Option<Decimal>,
    #[sea_orm(default_value = "true")]
    pub enabled: bool,
    pub last_triggered_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "budget::Entity",
        from = "Column::BudgetId",
        to = "budget::Column::Id",
        on_delete = "SetNull"
    )]
    Budget,
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::alert_history::Entity")]
    AlertHistory,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::alert_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
