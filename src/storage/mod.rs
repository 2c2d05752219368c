pub mod codec;
pub mod keys;
pub mod models;
mod repository;

pub use repository::{PurgeStats, Repository, RepositoryError};
