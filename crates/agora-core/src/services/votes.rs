//! Like/unlike on posts.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Vote, VoteDirection};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, VoteRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Added,
    Removed,
}

impl VoteOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            VoteOutcome::Added => "successfully added vote",
            VoteOutcome::Removed => "successfully deleted vote",
        }
    }
}

pub struct VoteService {
    posts: Arc<dyn PostRepository>,
    votes: Arc<dyn VoteRepository>,
}

impl VoteService {
    pub fn new(posts: Arc<dyn PostRepository>, votes: Arc<dyn VoteRepository>) -> Self {
        Self { posts, votes }
    }

    /// `Add` fails with a conflict if the like exists; `Remove` fails with
    /// not-found if it does not. Neither is idempotent.
    pub async fn vote(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, DomainError> {
        if self.posts.find_by_id(post_id).await?.is_none() {
            return Err(DomainError::not_found("Post", post_id));
        }

        let existing = self.votes.find(user_id, post_id).await?;

        match direction {
            VoteDirection::Add => {
                if existing.is_some() {
                    return Err(already_voted(user_id, post_id));
                }
                self.votes
                    .create(Vote::new(user_id, post_id))
                    .await
                    .map_err(|e| match e {
                        RepoError::Constraint(_) => already_voted(user_id, post_id),
                        RepoError::MissingReference(_) => DomainError::not_found("Post", post_id),
                        other => other.into(),
                    })?;
                Ok(VoteOutcome::Added)
            }
            VoteDirection::Remove => {
                if existing.is_none() {
                    return Err(vote_not_found());
                }
                self.votes
                    .delete(user_id, post_id)
                    .await
                    .map_err(|e| match e {
                        RepoError::NotFound => vote_not_found(),
                        other => other.into(),
                    })?;
                Ok(VoteOutcome::Removed)
            }
        }
    }
}

fn vote_not_found() -> DomainError {
    DomainError::NotFound("Vote does not exist".to_string())
}

fn already_voted(user_id: Uuid, post_id: Uuid) -> DomainError {
    DomainError::Duplicate(format!(
        "User {user_id} has already voted on post {post_id}"
    ))
}
