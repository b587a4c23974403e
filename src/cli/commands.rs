pub mod init_due_dates;
pub mod initdb;
pub mod setup_user;
pub mod sweep;
pub mod sweep_alerts;
pub mod sweep_recurring;

pub use init_due_dates::init_due_dates;
pub use initdb::init_database;
pub use setup_user::setup_user;
pub use sweep::run_sweep;
pub use sweep_alerts::run_sweep_alerts;
pub use sweep_recurring::run_sweep_recurring;
