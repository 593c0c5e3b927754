//! Like/unlike handler.

use actix_web::{HttpResponse, web};

use agora_core::domain::VoteDirection;
use agora_shared::dto::{MessageResponse, VoteRequest};

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /vote
pub async fn vote(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let direction = VoteDirection::try_from(req.dir).map_err(AppError::BadRequest)?;

    let outcome = state.votes.vote(user.id, req.post_id, direction).await?;

    tracing::debug!(user_id = %user.id, post_id = %req.post_id, ?outcome, "Vote recorded");
    Ok(HttpResponse::Created().json(MessageResponse::new(outcome.message())))
}
