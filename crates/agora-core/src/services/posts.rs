//! Post publishing with owner-only mutation.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Post, PostDetails, User};
use crate::error::DomainError;
use crate::ports::{PostQuery, PostRepository, UserRepository, VoteRepository};

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    /// Defaults to `true` when absent.
    pub published: Option<bool>,
}

/// Partial post update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
    votes: Arc<dyn VoteRepository>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        users: Arc<dyn UserRepository>,
        votes: Arc<dyn VoteRepository>,
    ) -> Self {
        Self {
            posts,
            users,
            votes,
        }
    }

    pub async fn create(&self, owner: &User, new_post: NewPost) -> Result<PostDetails, DomainError> {
        let post = Post::new(
            owner.id,
            new_post.title,
            new_post.content,
            new_post.published.unwrap_or(true),
        );
        let post = self.posts.create(post).await?;

        Ok(PostDetails {
            post,
            owner: owner.clone(),
            votes: 0,
        })
    }

    /// `limit` and `skip` must fit the storage layer's signed 64-bit range.
    pub async fn list(&self, query: &PostQuery) -> Result<Vec<PostDetails>, DomainError> {
        for (name, value) in [("limit", query.limit), ("skip", query.skip)] {
            if i64::try_from(value).is_err() {
                return Err(DomainError::Validation(format!(
                    "{name} must be at most {}",
                    i64::MAX
                )));
            }
        }

        let posts = self.posts.search(query).await?;
        self.with_details(posts).await
    }

    pub async fn get(&self, id: Uuid) -> Result<PostDetails, DomainError> {
        let post = self.find(id).await?;
        let mut details = self.with_details(vec![post]).await?;
        details
            .pop()
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn update(
        &self,
        id: Uuid,
        requester: Uuid,
        changes: PostChanges,
    ) -> Result<PostDetails, DomainError> {
        let mut post = self.find_owned(id, requester).await?;

        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(published) = changes.published {
            post.published = published;
        }
        post.updated_at = chrono::Utc::now();

        let post = self.posts.update(post).await?;
        let mut details = self.with_details(vec![post]).await?;
        details
            .pop()
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn delete(&self, id: Uuid, requester: Uuid) -> Result<(), DomainError> {
        self.find_owned(id, requester).await?;
        self.posts.delete(id).await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    async fn find_owned(&self, id: Uuid, requester: Uuid) -> Result<Post, DomainError> {
        let post = self.find(id).await?;
        if !post.is_owned_by(requester) {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }

    /// Attach owners and vote totals, preserving the input order.
    async fn with_details(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let mut owner_ids: Vec<Uuid> = posts.iter().map(|p| p.owner_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<Uuid, User> = self
            .users
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let counts = self.votes.count_by_posts(&post_ids).await?;

        posts
            .into_iter()
            .map(|post| {
                let owner = owners.get(&post.owner_id).cloned().ok_or_else(|| {
                    DomainError::Internal(format!("owner of post {} is missing", post.id))
                })?;
                let votes = counts.get(&post.id).copied().unwrap_or(0);
                Ok(PostDetails { post, owner, votes })
            })
            .collect()
    }
}
