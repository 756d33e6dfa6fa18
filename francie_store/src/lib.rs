#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Message log implementations.
//!
//! - [`DatabaseMessageStore`]: sea-orm backed, SQLite or PostgreSQL
//! - [`InMemoryMessageStore`]: process-local, for tests and throwaway runs

mod database;
mod memory;

pub use database::DatabaseMessageStore;
pub use francie_core::MessageStore;
pub use memory::InMemoryMessageStore;
