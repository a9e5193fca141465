pub mod commission;
pub mod factory;
pub mod memory;
pub mod models;
pub mod orchestrator;
pub mod refund;
pub mod repository;
pub mod wallet;

pub use commission::{CommissionCalculator, CommissionSplit};
pub use factory::JournalEntryFactory;
pub use memory::MemoryStore;
pub use models::{Booking, BookingStatus, CalculationType, CommissionModel};
pub use orchestrator::SettlementOrchestrator;
pub use refund::{Refund, RefundStatus};
pub use wallet::{Wallet, WalletTransaction, WalletTransactionKind};
