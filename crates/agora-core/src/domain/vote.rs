use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vote entity - a like from one user on one post.
///
/// Keyed by the `(user_id, post_id)` pair; at most one row exists per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(user_id: Uuid, post_id: Uuid) -> Self {
        Self {
            user_id,
            post_id,
            created_at: Utc::now(),
        }
    }
}

/// Requested vote action: `1` likes a post, `0` removes the like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Remove,
    Add,
}

impl TryFrom<i64> for VoteDirection {
    type Error = String;

    fn try_from(dir: i64) -> Result<Self, Self::Error> {
        match dir {
            0 => Ok(VoteDirection::Remove),
            1 => Ok(VoteDirection::Add),
            other => Err(format!("dir must be 0 or 1 (got {other})")),
        }
    }
}
