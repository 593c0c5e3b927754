//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;
mod users;
mod votes;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::{
    form_error_handler, json_error_handler, path_error_handler, query_error_handler,
};

/// Configure all application routes and extractor error handling.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::FormConfig::default().error_handler(form_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        // Public routes
        .route("/", web::get().to(health::root))
        .route("/health", web::get().to(health::health_check))
        .route("/login", web::post().to(auth::login))
        .route("/users", web::post().to(users::register))
        // `/users/me` must be registered before `/users/{id}`
        .service(
            web::resource("/users/me")
                .route(web::get().to(users::me))
                .route(web::patch().to(users::update_me))
                .route(web::delete().to(users::delete_me)),
        )
        .route("/users/me/password", web::patch().to(users::change_password))
        .route("/users/{id}", web::get().to(users::get_user))
        // Posts
        .service(
            web::resource("/posts")
                .route(web::post().to(posts::create_post))
                .route(web::get().to(posts::list_posts)),
        )
        .service(
            web::resource("/posts/{id}")
                .route(web::get().to(posts::get_post))
                .route(web::put().to(posts::update_post))
                .route(web::delete().to(posts::delete_post)),
        )
        // Votes
        .route("/vote", web::post().to(votes::vote));
}
