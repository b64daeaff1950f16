pub mod file_store;
pub mod lease_repo;
pub mod memory_store;
pub mod pg_store;
pub mod record_repo;
pub mod record_store;
pub mod user_repo;

pub use file_store::FileStore;
pub use lease_repo::LeaseRepository;
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;
pub use record_repo::{Record, RecordRepository};
pub use record_store::{Collection, RecordStore, Store, Transaction, WriteBatch};
pub use user_repo::UserRepository;
