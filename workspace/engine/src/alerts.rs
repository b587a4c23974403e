pub mod defaults;
pub mod sweep;
pub mod threshold;
pub mod unusual;

pub use defaults::initialize_default_alerts;
pub use sweep::{run_alert_sweep, AlertCheckResult};
pub use threshold::check_budget_threshold;
pub use unusual::check_unusual_spending;
