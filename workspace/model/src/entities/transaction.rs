use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use std::fmt;
use std::str::FromStr;

use super::{account, category, user};

/// Whether a transaction adds money to or removes money from an account.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(7))")]
pub enum TransactionKind {
    #[sea_orm(string_value = "Income")]
    Income,
    #[sea_orm(string_value = "Expense")]
    Expense,
}

/// How often a recurring template materializes a new ledger entry.
///
/// Stored as plain text on the row rather than as a database enum: a row
/// carrying an unrecognized value must fail on its own when the scheduler
/// parses it, instead of poisoning every query that touches the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Biweekly => "Biweekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored frequency value is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFrequencyError(pub String);

impl fmt::Display for ParseFrequencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized frequency {:?}", self.0)
    }
}

impl std::error::Error for ParseFrequencyError {}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

/// A row in the ledger.
///
/// Concrete entries and recurring templates share this table. A template is a
/// row with `is_recurring = true` whose `next_due_date` the scheduler
/// advances; a generated instance is a concrete row whose
/// `parent_template_id` points back at the template that produced it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub account_id: i32,
    pub category_id: Option<i32>,
    /// The magnitude of the transaction. Direction is carried by `kind`.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub description: String,
    pub notes: Option<String>,
    /// For a concrete entry, the ledger date. For a template, the original
    /// anchor date the recurrence was created with.
    pub date: NaiveDate,
    /// Marks this row as a recurring template rather than a concrete entry.
    #[sea_orm(default_value = "false")]
    pub is_recurring: bool,
    /// Recurrence period, parseable as [`Frequency`]. Must be set when
    /// `is_recurring` is true.
    pub frequency: Option<String>,
    /// When the scheduler last materialized an instance from this template.
    pub last_generated_date: Option<DateTimeUtc>,
    /// The next date this template is due. Monotonically non-decreasing once
    /// initialized; null until `initialize_due_dates` or the first sweep.
    pub next_due_date: Option<NaiveDate>,
    /// Set on generated instances, pointing back at the template row.
    pub parent_template_id: Option<i32>,
    #[sea_orm(default_value = "false")]
    pub is_pending: bool,
    #[sea_orm(default_value = "false")]
    pub is_projected: bool,
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
        belongs_to = "account::Entity",
        from = "Column::AccountId",
        to = "account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    /// Generated instances point back at the template that produced them.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentTemplateId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    ParentTemplate,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
