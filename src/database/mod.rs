pub mod audit;
pub mod manager;
pub mod models;
pub mod users;

pub use audit::{AuditError, AuditSink, PgAuditSink};
pub use manager::{DatabaseError, DatabaseManager};
pub use users::{DirectoryError, PgUserDirectory, UserDirectory};
