use anyhow::Result;
use engine::alerts::initialize_default_alerts;
use engine::store::SeaOrmLedgerStore;
use tracing::info;

use crate::config::connect;

pub async fn setup_user(database_url: &str, user_id: i32) -> Result<()> {
    let db = connect(database_url).await?;
    let store = SeaOrmLedgerStore::new(db);

    let created = initialize_default_alerts(&store, user_id).await?;
    for rule in &created {
        info!("Created {:?} rule id={}", rule.alert_type, rule.id);
    }
    info!(
        "Provisioned {} default alert rules for user id={}",
        created.len(),
        user_id
    );
    Ok(())
}
