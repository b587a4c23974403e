use anyhow::Result;
use chrono::Utc;
use engine::alerts::run_alert_sweep;
use engine::store::SeaOrmLedgerStore;
use tracing::info;

use crate::config::connect;

pub async fn run_sweep_alerts(database_url: &str, user_id: i32) -> Result<()> {
    let db = connect(database_url).await?;
    let store = SeaOrmLedgerStore::new(db);

    let result = run_alert_sweep(&store, user_id, Utc::now()).await?;
    for alert in &result.alerts {
        info!("Fired {:?} alert: {}", alert.severity, alert.title);
    }
    info!(
        triggered = result.triggered,
        errors = result.errors,
        "Alert sweep complete for user id={}",
        user_id
    );
    Ok(())
}
