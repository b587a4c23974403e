use chrono::{DateTime, Utc};
use model::entities::transaction::{self, Frequency};
use tracing::{debug, info, instrument, warn};

use crate::error::{EngineError, Result};
use crate::store::{LedgerStore, NewInstance, TemplateAdvance};
use crate::SweepOptions;

use super::schedule::next_occurrence;

/// Aggregate outcome of one recurring sweep.
///
/// Per-item failures never abort the sweep; they are counted here and the
/// caller decides what to do with the numbers. These counters and the logs
/// are the only observability surface a sweep has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepResult {
    /// Templates that were due and got looked at.
    pub processed: usize,
    /// Instances actually written to the ledger.
    pub created: usize,
    /// Templates that failed and were skipped.
    pub errors: usize,
}

/// Runs one recurring-transaction sweep with default options.
///
/// Materializes one concrete ledger entry for every due template and
/// advances the template's due date. A failure for one template never aborts
/// the sweep for the others; only total unavailability of the store is
/// returned as an error.
pub async fn run_recurring_sweep(
    store: &dyn LedgerStore,
    now: DateTime<Utc>,
) -> Result<SweepResult> {
    run_recurring_sweep_with_options(store, now, &SweepOptions::default()).await
}

#[instrument(skip(store, options), fields(now = %now))]
pub async fn run_recurring_sweep_with_options(
    store: &dyn LedgerStore,
    now: DateTime<Utc>,
    options: &SweepOptions,
) -> Result<SweepResult> {
    let due = store.list_due_templates(now).await?;
    info!("Found {} recurring templates due for generation", due.len());

    let mut result = SweepResult::default();
    for template in &due {
        result.processed += 1;
        match tokio::time::timeout(options.item_timeout, materialize_one(store, template, now))
            .await
        {
            Ok(Ok(true)) => {
                result.created += 1;
            }
            Ok(Ok(false)) => {
                debug!(
                    "Template id={} was advanced by a concurrent sweep, skipping",
                    template.id
                );
            }
            Ok(Err(err)) => {
                warn!("Failed to materialize template id={}: {}", template.id, err);
                result.errors += 1;
            }
            Err(_) => {
                warn!(
                    "Materializing template id={} exceeded {:?}",
                    template.id, options.item_timeout
                );
                result.errors += 1;
            }
        }
    }

    info!(
        processed = result.processed,
        created = result.created,
        errors = result.errors,
        "Recurring sweep finished"
    );
    Ok(result)
}

/// Generates one instance from a due template and advances the template,
/// atomically. Returns `Ok(false)` when a concurrent sweep got there first.
async fn materialize_one(
    store: &dyn LedgerStore,
    template: &transaction::Model,
    now: DateTime<Utc>,
) -> Result<bool> {
    let raw = template.frequency.as_deref().ok_or_else(|| {
        EngineError::Template(format!("template id={} has no frequency", template.id))
    })?;
    let frequency: Frequency = raw
        .parse()
        .map_err(|err| EngineError::Template(format!("template id={}: {}", template.id, err)))?;

    let anchor = template.next_due_date.unwrap_or(template.date);
    let next = next_occurrence(anchor, frequency);

    debug!(
        "Materializing template id={} ({}), due {} -> next due {}",
        template.id, frequency, anchor, next
    );

    let instance = NewInstance {
        user_id: template.user_id,
        account_id: template.account_id,
        category_id: template.category_id,
        amount: template.amount,
        kind: template.kind.clone(),
        description: format!("{} (recurring)", template.description),
        notes: template.notes.clone(),
        // The instance is dated with the sweep time, not the nominal due
        // date; the template's next_due_date stays the scheduling anchor.
        date: now.date_naive(),
        parent_template_id: template.id,
    };
    let advance = TemplateAdvance {
        expected_due: template.next_due_date,
        last_generated_date: now,
        next_due_date: next,
    };

    store.materialize_template(template, instance, advance).await
}

/// One-time backfill: sets `next_due_date` on every recurring template that
/// lacks one, stepping once from the template's anchor date. Idempotent:
/// the write only happens while the column is still null.
#[instrument(skip(store))]
pub async fn initialize_due_dates(store: &dyn LedgerStore) -> Result<usize> {
    let templates = store.list_uninitialized_templates().await?;
    debug!("Backfilling due dates for {} templates", templates.len());

    let mut initialized = 0;
    for template in &templates {
        let Some(raw) = template.frequency.as_deref() else {
            warn!("Skipping template id={}: no frequency", template.id);
            continue;
        };
        let frequency = match raw.parse::<Frequency>() {
            Ok(frequency) => frequency,
            Err(err) => {
                warn!("Skipping template id={}: {}", template.id, err);
                continue;
            }
        };
        let next = next_occurrence(template.date, frequency);
        if store.initialize_due_date(template.id, next).await? {
            initialized += 1;
        }
    }

    info!("Initialized next due date for {} templates", initialized);
    Ok(initialized)
}
