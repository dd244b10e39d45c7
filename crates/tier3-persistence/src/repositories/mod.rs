pub mod avt;
pub mod catalog;
pub mod daily_count;
pub mod profile;
pub mod transaction;
pub mod validation_log;

pub use avt::{AvtRepository, SqlxAvtRepository};
pub use catalog::{CatalogRepository, SqlxCatalogRepository};
pub use daily_count::{DailyCountRepository, SqlxDailyCountRepository};
pub use profile::{ProfileRepository, SqlxProfileRepository};
pub use transaction::{SqlxTransactionRepository, TransactionRepository, TransactionSummary};
pub use validation_log::{SqlxValidationLogRepository, ValidationLogEntry, ValidationLogRepository};
