//! Post handlers. Every route here requires a bearer token.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use agora_core::domain::PostDetails;
use agora_core::ports::PostQuery;
use agora_core::services::{NewPost, PostChanges};
use agora_shared::dto::{
    CreatePostRequest, ListPostsQuery, PostResponse, PostWithVotesResponse, UpdatePostRequest,
};

use super::users::user_response;
use crate::middleware::auth::CurrentUser;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn post_response(details: &PostDetails) -> PostResponse {
    let post = &details.post;
    PostResponse {
        id: post.id,
        title: post.title.clone(),
        content: post.content.clone(),
        published: post.published,
        created_at: post.created_at,
        owner_id: post.owner_id,
        owner: user_response(&details.owner),
    }
}

fn post_with_votes(details: &PostDetails) -> PostWithVotesResponse {
    PostWithVotesResponse {
        post: post_response(details),
        votes: details.votes,
    }
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let created = state
        .posts
        .create(
            &user,
            NewPost {
                title: req.title,
                content: req.content,
                published: req.published,
            },
        )
        .await?;

    tracing::info!(post_id = %created.post.id, user_id = %user.id, "Post created");
    Ok(HttpResponse::Created().json(post_response(&created)))
}

/// GET /posts?limit=&skip=&search=
pub async fn list_posts(
    state: web::Data<AppState>,
    _user: CurrentUser,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let defaults = PostQuery::default();

    let posts = state
        .posts
        .list(&PostQuery {
            search: query.search.unwrap_or(defaults.search),
            limit: query.limit.unwrap_or(defaults.limit),
            skip: query.skip.unwrap_or(defaults.skip),
        })
        .await?;

    let body: Vec<PostWithVotesResponse> = posts.iter().map(post_with_votes).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    _user: CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let details = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_with_votes(&details)))
}

/// PUT /posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let updated = state
        .posts
        .update(
            path.into_inner(),
            user.id,
            PostChanges {
                title: req.title,
                content: req.content,
                published: req.published,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post_response(&updated)))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    CurrentUser(user): CurrentUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state.posts.delete(post_id, user.id).await?;

    tracing::info!(post_id = %post_id, user_id = %user.id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}
