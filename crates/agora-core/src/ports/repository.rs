use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, User, Vote};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
///
/// The `active` lookups ignore soft-deleted accounts.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Usernames stay reserved after a soft delete, so this checks every row.
    async fn username_exists(&self, username: &str) -> Result<bool, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Filter and pagination for post listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Case-insensitive substring matched against the title.
    pub search: String,
    pub limit: u64,
    pub skip: u64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            limit: 10,
            skip: 0,
        }
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Posts matching the query, newest first.
    async fn search(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError>;
}

/// Vote repository, keyed by `(user_id, post_id)`.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Vote>, RepoError>;

    /// Fails with [`RepoError::Constraint`] if the pair already exists.
    async fn create(&self, vote: Vote) -> Result<Vote, RepoError>;

    async fn delete(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError>;

    /// Vote totals per post. Posts without votes are absent from the map.
    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError>;
}
