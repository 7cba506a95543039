//! Represents a resource category — read-only reference data.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Default name of the category assigned to attachment-derived resources.
pub const DEFAULT_CONTENT_CATEGORY: &str = "Content";

/// A named classification applied to a resource.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct Category {
    /// Primary key, referenced by `resources.category`.
    pub id: i64,

    /// Unique category name (e.g. "Content").
    pub name: String,

    /// Human readable description.
    pub description: String,
}
