use anyhow::Result;
use chrono::Utc;
use engine::recurring::run_recurring_sweep;
use engine::store::SeaOrmLedgerStore;
use tracing::info;

use crate::config::connect;

pub async fn run_sweep_recurring(database_url: &str) -> Result<()> {
    let db = connect(database_url).await?;
    let store = SeaOrmLedgerStore::new(db);

    let result = run_recurring_sweep(&store, Utc::now()).await?;
    info!(
        processed = result.processed,
        created = result.created,
        errors = result.errors,
        "Recurring sweep complete"
    );
    Ok(())
}
