use sea_orm::entity::prelude::*;

use super::{spending_alert, user};

/// How urgent a fired alert is, used by the UI for prioritization.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum Severity {
    #[sea_orm(string_value = "Info")]
    Info,
    #[sea_orm(string_value = "Warning")]
    Warning,
    #[sea_orm(string_value = "Critical")]
    Critical,
}

/// One fired alert. Append-only: the engine creates these and the UI reads
/// them; nothing ever updates or deletes a row except the user's read flag.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alert_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// The rule that produced this entry.
    pub alert_id: i32,
    pub alert_type: spending_alert::AlertType,
    pub title: String,
    pub message: String,
    pub severity: Severity,
    #[sea_orm(default_value = "false")]
    pub is_read: bool,
    /// The inputs that produced the alert (spent amount, percentage,
    /// averages), kept so the UI can render details without recomputing.
    pub metadata: Option<Json>,
    pub created_at: DateTimeUtc,
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
        belongs_to = "spending_alert::Entity",
        from = "Column::AlertId",
        to = "spending_alert::Column::Id",
        on_delete = "Cascade"
    )]
    SpendingAlert,
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<spending_alert::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SpendingAlert.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
