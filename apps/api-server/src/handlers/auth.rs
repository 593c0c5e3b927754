//! Authentication handlers.

use actix_web::{Either, HttpResponse, web};

use agora_shared::dto::{LoginForm, LoginRequest, TokenResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /login
///
/// Takes a JSON body or an OAuth2 password-flow form, where the email
/// travels in `username`.
pub async fn login(
    state: web::Data<AppState>,
    body: Either<web::Json<LoginRequest>, web::Form<LoginForm>>,
) -> AppResult<HttpResponse> {
    let (email, password) = match body {
        Either::Left(json) => {
            let req = json.into_inner();
            (req.email, req.password)
        }
        Either::Right(form) => {
            let form = form.into_inner();
            let email = form
                .username
                .or(form.email)
                .ok_or_else(|| AppError::BadRequest("username is required".to_string()))?;
            (email, form.password)
        }
    };

    let issued = state.auth.login(&email, &password).await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: issued.access_token,
        token_type: "bearer".to_string(),
        expires_in: u64::try_from(issued.expires_in).unwrap_or(0),
    }))
}
