// src/store/mod.rs

//! Persistence adapters the server can run the approval engine on.

pub mod pg;

pub use pg::PgEntityStore;
