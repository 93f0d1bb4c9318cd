pub mod memory;
pub mod pool;
pub mod queries;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use pool::create_pool;
pub use repository::{AuditLog, InvoiceRepository, TemplateStore};
pub use store::PgStore;
