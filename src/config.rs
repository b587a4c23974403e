use anyhow::Result;
use sea_orm::{Database, DatabaseConnection};
use tracing::info;

/// Fallback database URL when neither the CLI flag nor `DATABASE_URL` is set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://finledger.db";

/// Connects to the configured database.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;
    Ok(db)
}
