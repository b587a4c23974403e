use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create spending_alerts table (the rule definitions)
        manager
            .create_table(
                Table::create()
                    .table(SpendingAlerts::Table)
                    .if_not_exists()
                    .col(pk_auto(SpendingAlerts::Id))
                    .col(integer(SpendingAlerts::UserId))
                    .col(string_len(SpendingAlerts::AlertType, 16))
                    .col(integer_null(SpendingAlerts::BudgetId))
                    .col(integer_null(SpendingAlerts::CategoryId))
                    .col(decimal_len_null(SpendingAlerts::Threshold, 7, 2))
                    .col(boolean(SpendingAlerts::Enabled).default(true))
                    .col(timestamp_with_time_zone_null(
                        SpendingAlerts::LastTriggeredAt,
                    ))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spending_alert_user")
                            .from(SpendingAlerts::Table, SpendingAlerts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spending_alert_budget")
                            .from(SpendingAlerts::Table, SpendingAlerts::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spending_alert_category")
                            .from(SpendingAlerts::Table, SpendingAlerts::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create alert_history table (append-only firings)
        manager
            .create_table(
                Table::create()
                    .table(AlertHistory::Table)
                    .if_not_exists()
                    .col(pk_auto(AlertHistory::Id))
                    .col(integer(AlertHistory::UserId))
                    .col(integer(AlertHistory::AlertId))
                    .col(string_len(AlertHistory::AlertType, 16))
                    .col(string(AlertHistory::Title))
                    .col(string(AlertHistory::Message))
                    .col(string_len(AlertHistory::Severity, 8))
                    .col(boolean(AlertHistory::IsRead).default(false))
                    .col(json_null(AlertHistory::Metadata))
                    .col(timestamp_with_time_zone(AlertHistory::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_history_user")
                            .from(AlertHistory::Table, AlertHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alert_history_alert")
                            .from(AlertHistory::Table, AlertHistory::AlertId)
                            .to(SpendingAlerts::Table, SpendingAlerts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The UI lists a user's alerts newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_alert_history_user_created_at")
                    .table(AlertHistory::Table)
                    .col(AlertHistory::UserId)
                    .col(AlertHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlertHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SpendingAlerts::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum SpendingAlerts {
    Table,
    Id,
    UserId,
    AlertType,
    BudgetId,
    CategoryId,
    Threshold,
    Enabled,
    LastTriggeredAt,
}

#[derive(DeriveIden)]
enum AlertHistory {
    Table,
    Id,
    UserId,
    AlertId,
    AlertType,
    Title,
    Message,
    Severity,
    IsRead,
    Metadata,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Budgets {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
}
