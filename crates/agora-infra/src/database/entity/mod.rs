//! SeaORM entities for the `users`, `posts` and `votes` tables.

pub mod post;
pub mod user;
pub mod vote;
