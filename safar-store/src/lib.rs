pub mod app_config;
pub mod booking_repo;
pub mod commission_repo;
pub mod database;
pub mod journal_repo;
pub mod refund_repo;
pub mod unit_of_work;
pub mod wallet_repo;

pub use booking_repo::PgBookingRepository;
pub use commission_repo::PgCommissionModelRepository;
pub use database::DbClient;
pub use journal_repo::PgJournalRepository;
pub use refund_repo::PgRefundRepository;
pub use unit_of_work::PgSettlementUnitOfWork;
pub use wallet_repo::PgWalletRepository;
