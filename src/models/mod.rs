//! Core data models for the resource store.
//!
//! Resources and categories map to database tables; both serialize
//! naturally as JSON via `serde`.

pub mod category;
pub mod resource;
