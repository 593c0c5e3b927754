//! Application state - shared across all handlers.

use std::sync::Arc;

use agora_core::ports::{
    PasswordService, PostRepository, TokenService, UserRepository, VoteRepository,
};
use agora_core::services::{AuthService, PostService, UserService, VoteService};
use agora_infra::database::{DatabaseConfig, InMemoryDatabase};
use agora_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "postgres")]
use agora_infra::database::{
    PostgresPostRepository, PostgresUserRepository, PostgresVoteRepository, connect,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    pub votes: Arc<VoteService>,
}

/// The three repositories every service draws from.
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub votes: Arc<dyn VoteRepository>,
}

impl Repositories {
    pub fn in_memory(db: &InMemoryDatabase) -> Self {
        Self {
            users: Arc::new(db.users()),
            posts: Arc::new(db.posts()),
            votes: Arc::new(db.votes()),
        }
    }

    #[cfg(feature = "postgres")]
    async fn postgres(config: &DatabaseConfig) -> Result<Self, sea_orm::DbErr> {
        let conn = connect(config).await?;

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            votes: Arc::new(PostgresVoteRepository::new(conn)),
        })
    }
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, jwt: JwtConfig) -> Self {
        let repos = Self::repositories(db_config).await;

        let state = Self::from_parts(
            repos,
            Arc::new(Argon2PasswordService::new()),
            Arc::new(JwtTokenService::new(jwt)),
        );

        tracing::info!("Application state initialized");
        state
    }

    /// Wire the services over explicit ports.
    pub fn from_parts(
        repos: Repositories,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(repos.users.clone(), passwords.clone())),
            auth: Arc::new(AuthService::new(repos.users.clone(), passwords, tokens)),
            posts: Arc::new(PostService::new(
                repos.posts.clone(),
                repos.users,
                repos.votes.clone(),
            )),
            votes: Arc::new(VoteService::new(repos.posts, repos.votes)),
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(db_config: Option<&DatabaseConfig>) -> Repositories {
        match db_config {
            Some(config) => match Repositories::postgres(config).await {
                Ok(repos) => repos,
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Repositories::in_memory(&InMemoryDatabase::new())
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Repositories::in_memory(&InMemoryDatabase::new())
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(db_config: Option<&DatabaseConfig>) -> Repositories {
        if db_config.is_some() {
            tracing::warn!("Built without the postgres feature; ignoring DATABASE_URL.");
        }
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Repositories::in_memory(&InMemoryDatabase::new())
    }
}
