//! Domain entities - the core business objects.

mod post;
mod user;
mod vote;

pub use post::{Post, PostDetails};
pub use user::{User, UserRole};
pub use vote::{Vote, VoteDirection};
