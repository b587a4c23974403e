use anyhow::Result;
use chrono::Utc;
use engine::run_full_sweep;
use engine::store::SeaOrmLedgerStore;
use tracing::info;

use crate::config::connect;

pub async fn run_sweep(database_url: &str) -> Result<()> {
    let db = connect(database_url).await?;
    let store = SeaOrmLedgerStore::new(db);

    let summary = run_full_sweep(&store, Utc::now()).await?;
    info!(
        templates_processed = summary.recurring.processed,
        instances_created = summary.recurring.created,
        template_errors = summary.recurring.errors,
        users = summary.users,
        alerts_triggered = summary.alerts_triggered,
        alert_errors = summary.alert_errors,
        "Full sweep complete"
    );
    Ok(())
}
