//! Resource store: UUID-identified resources with key/value content maps,
//! persisted transactionally in SQLite and served over HTTP.

pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
