pub mod account;
pub mod chart;
pub mod entry;
pub mod ledger;

pub use account::{Account, AccountType};
pub use entry::{JournalEntry, Transaction};
pub use ledger::{AccountBalance, JournalRepository, Ledger};
