//! Persistence layer: the content codec, category lookup and the
//! transactional resource repository.

pub mod categories;
pub mod codec;
pub mod error;
pub mod resources;

pub use categories::CategoryLookup;
pub use error::{RepoError, RepoResult};
pub use resources::{RepositoryPolicy, ResourceRepository};
