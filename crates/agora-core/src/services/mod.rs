//! Domain services - the business rules behind each HTTP endpoint.
//!
//! Services only talk to the ports, so they run unchanged against
//! PostgreSQL or the in-memory store.

mod auth;
mod posts;
mod users;
pub mod validation;
mod votes;

pub use auth::{AuthService, IssuedToken};
pub use posts::{NewPost, PostChanges, PostService};
pub use users::{NewUser, PasswordChange, ProfileChanges, UserService};
pub use votes::{VoteOutcome, VoteService};
