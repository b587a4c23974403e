//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the ledger application here: the
//! transaction table (which doubles as the recurring-template store),
//! the budget envelopes, and the spending-alert rule/history pair.

pub mod account;
pub mod alert_history;
pub mod budget;
pub mod category;
pub mod spending_alert;
pub mod transaction;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::alert_history::Entity as AlertHistory;
    pub use super::budget::Entity as Budget;
    pub use super::category::Entity as Category;
    pub use super::spending_alert::Entity as SpendingAlert;
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
}
