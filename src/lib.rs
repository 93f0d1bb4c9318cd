pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod mail;
pub mod models;
pub mod scheduler;
pub mod service;

pub use config::AppConfig;
pub use db::{create_pool, MemoryStore, PgStore};
pub use error::{NoticeError, Result};
pub use service::NoticeDispatcher;
