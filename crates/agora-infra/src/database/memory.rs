//! In-memory store - used when no database is configured, and in tests.
//!
//! Mirrors the constraints of the PostgreSQL schema: unique active email,
//! unique username, one vote per `(user, post)` pair on an existing post,
//! and cascading deletes.
//! Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agora_core::domain::{Post, User, Vote};
use agora_core::error::RepoError;
use agora_core::ports::{
    BaseRepository, PostQuery, PostRepository, UserRepository, VoteRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    votes: HashMap<(Uuid, Uuid), Vote>,
}

impl Tables {
    fn check_user_unique(&self, candidate: &User) -> Result<(), RepoError> {
        for user in self.users.values().filter(|u| u.id != candidate.id) {
            if user.username == candidate.username {
                return Err(RepoError::Constraint(format!(
                    "duplicate username '{}'",
                    candidate.username
                )));
            }
            if !user.is_deleted() && !candidate.is_deleted() && user.email == candidate.email {
                return Err(RepoError::Constraint("duplicate email".to_string()));
            }
        }
        Ok(())
    }

    fn remove_post(&mut self, post_id: Uuid) -> Option<Post> {
        let removed = self.posts.remove(&post_id)?;
        self.votes.retain(|(_, voted_post), _| *voted_post != post_id);
        Some(removed)
    }
}

/// Shared handle to the in-memory tables. Clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            tables: self.tables.clone(),
        }
    }

    pub fn votes(&self) -> InMemoryVoteRepository {
        InMemoryVoteRepository {
            tables: self.tables.clone(),
        }
    }
}

pub struct InMemoryUserRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn create(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&entity.id) {
            return Err(RepoError::Constraint("duplicate user id".to_string()));
        }
        tables.check_user_unique(&entity)?;
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        tables.check_user_unique(&entity)?;
        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.owner_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.votes.retain(|(voter, _), _| *voter != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_active_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| !u.is_deleted() && u.email == email)
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.username == username))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }
}

pub struct InMemoryPostRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).cloned())
    }

    async fn create(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.contains_key(&entity.id) {
            return Err(RepoError::Constraint("duplicate post id".to_string()));
        }
        tables.posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&entity.id) {
            Some(existing) => {
                *existing = entity.clone();
                Ok(entity)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn search(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let needle = query.search.to_lowercase();
        let tables = self.tables.read().await;

        let mut matches: Vec<&Post> = tables
            .posts
            .values()
            .filter(|p| needle.is_empty() || p.title.to_lowercase().contains(&needle))
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        Ok(matches.into_iter().skip(skip).take(limit).cloned().collect())
    }
}

pub struct InMemoryVoteRepository {
    tables: Arc<RwLock<Tables>>,
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn find(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Vote>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.votes.get(&(user_id, post_id)).cloned())
    }

    async fn create(&self, vote: Vote) -> Result<Vote, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&vote.post_id) {
            return Err(RepoError::MissingReference(format!(
                "post {} does not exist",
                vote.post_id
            )));
        }
        let key = (vote.user_id, vote.post_id);
        if tables.votes.contains_key(&key) {
            return Err(RepoError::Constraint("duplicate vote".to_string()));
        }
        tables.votes.insert(key, vote.clone());
        Ok(vote)
    }

    async fn delete(&self, user_id: Uuid, post_id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .votes
            .remove(&(user_id, post_id))
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }

    async fn count_by_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>, RepoError> {
        let tables = self.tables.read().await;
        let mut counts = HashMap::new();
        for (_, post_id) in tables.votes.keys() {
            if post_ids.contains(post_id) {
                *counts.entry(*post_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}
