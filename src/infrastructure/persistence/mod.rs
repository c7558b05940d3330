mod memory_stores;
mod pg_content_store;
mod pg_job_store;
mod pg_pool;

pub use memory_stores::{MemoryDocumentStore, MemoryJobStore, MemoryResultStore};
pub use pg_content_store::{PgDocumentStore, PgResultStore};
pub use pg_job_store::PgJobStore;
pub use pg_pool::create_pool;
