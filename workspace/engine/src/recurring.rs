pub mod schedule;
pub mod sweep;

pub use schedule::next_occurrence;
pub use sweep::{initialize_due_dates, run_recurring_sweep, SweepResult};
