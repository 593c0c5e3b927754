//! Account handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use agora_core::domain::{User, UserRole};
use agora_core::services::{NewUser, PasswordChange, ProfileChanges};
use agora_shared::dto::{
    ChangePasswordRequest, DeleteAccountRequest, RegisterUserRequest, UpdateUserRequest,
    UserResponse,
};

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        username: user.username.clone(),
        role: user.role.to_string(),
        created_at: user.created_at,
    }
}

/// POST /users
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let role: UserRole = req.role.parse().map_err(AppError::BadRequest)?;

    let user = state
        .users
        .register(NewUser {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role,
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    Ok(HttpResponse::Created().json(user_response(&user)))
}

/// GET /users/me
pub async fn me(CurrentUser(user): CurrentUser) -> HttpResponse {
    HttpResponse::Ok().json(user_response(&user))
}

/// GET /users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state.users.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user_response(&user)))
}

/// PATCH /users/me
pub async fn update_me(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let updated = state
        .users
        .update_profile(
            user.id,
            ProfileChanges {
                email: req.email,
                first_name: req.first_name,
                last_name: req.last_name,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(user_response(&updated)))
}

/// PATCH /users/me/password
pub async fn change_password(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<ChangePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    state
        .users
        .change_password(
            user.id,
            PasswordChange {
                current_password: req.current_password,
                new_password: req.new_password,
                confirm_password: req.confirm_password,
            },
        )
        .await?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /users/me
pub async fn delete_me(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<DeleteAccountRequest>,
) -> AppResult<HttpResponse> {
    state
        .users
        .delete_account(user.id, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "Account soft-deleted");
    Ok(HttpResponse::NoContent().finish())
}
