use anyhow::Result;
use engine::recurring::initialize_due_dates;
use engine::store::SeaOrmLedgerStore;
use tracing::info;

use crate::config::connect;

pub async fn init_due_dates(database_url: &str) -> Result<()> {
    let db = connect(database_url).await?;
    let store = SeaOrmLedgerStore::new(db);

    let initialized = initialize_due_dates(&store).await?;
    info!(
        "Backfilled next due dates for {} recurring templates",
        initialized
    );
    Ok(())
}
