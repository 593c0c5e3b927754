//! HTTP contract tests over the in-memory store.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use rstest::rstest;
use serde_json::{Value, json};

use agora_core::ports::VoteRepository;
use agora_infra::database::InMemoryDatabase;
use agora_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::{AppState, Repositories};

const PASSWORD: &str = "Secr3t!pass";

fn test_state(db: &InMemoryDatabase) -> AppState {
    AppState::from_parts(
        Repositories::in_memory(db),
        Arc::new(Argon2PasswordService::with_cost(1024, 1).unwrap()),
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "contract-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "agora-test".to_string(),
        })),
    )
}

fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    test_app_on(&InMemoryDatabase::new())
}

/// App over a store the test keeps a handle to.
fn test_app_on(db: &InMemoryDatabase) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(web::Data::new(test_state(db)))
        .configure(configure_routes)
}

async fn send(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, value)
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn register(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Value {
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/users").set_json(json!({
            "email": email,
            "password": PASSWORD,
            "role": "donor",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");
    body
}

async fn login(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    send(
        app,
        test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": email, "password": password })),
    )
    .await
}

/// Register an account and return its profile together with a fresh token.
async fn signup(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> (Value, String) {
    let user = register(app, email).await;
    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().expect("token").to_string();
    (user, token)
}

async fn create_post(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    token: &str,
    title: &str,
) -> Value {
    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/posts")
            .insert_header(bearer(token))
            .set_json(json!({ "title": title, "content": "body text" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

async fn vote(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    token: &str,
    post_id: &Value,
    dir: i64,
) -> (StatusCode, Value) {
    send(
        app,
        test::TestRequest::post()
            .uri("/vote")
            .insert_header(bearer(token))
            .set_json(json!({ "post_id": post_id, "dir": dir })),
    )
    .await
}

#[actix_web::test]
async fn root_and_health_respond() {
    let app = test::init_service(test_app()).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Agora API is running");

    let (status, body) = send(&app, test::TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn registered_user_is_retrievable() {
    let app = test::init_service(test_app()).await;

    let (status, created) = send(
        &app,
        test::TestRequest::post().uri("/users").set_json(json!({
            "email": "ada.lovelace@example.com",
            "password": PASSWORD,
            "firstName": "Ada",
            "role": "receiver",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "adalovelace");
    assert_eq!(created["firstName"], "Ada");
    assert!(created.get("lastName").is_none());
    assert!(created.get("password").is_none());
    assert!(created.get("passwordHash").is_none());

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(&app, test::TestRequest::get().uri(&format!("/users/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, token) = login(&app, "ada.lovelace@example.com", PASSWORD).await;
    let token = token["access_token"].as_str().unwrap();
    let (status, me) = send(
        &app,
        test::TestRequest::get().uri("/users/me").insert_header(bearer(token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], created["id"]);
    assert_eq!(me["role"], "receiver");
}

#[rstest]
#[case(json!({"email": "not-an-email", "password": PASSWORD, "role": "donor"}))]
#[case(json!({"email": "a@example.com", "password": "short1!", "role": "donor"}))]
#[case(json!({"email": "a@example.com", "password": "NoDigits!!", "role": "donor"}))]
#[case(json!({"email": "a@example.com", "password": PASSWORD, "role": "admin"}))]
#[case(json!({"email": "a@example.com", "password": PASSWORD}))]
#[actix_web::test]
async fn register_rejects_invalid_input(#[case] payload: Value) {
    let app = test::init_service(test_app()).await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/users").set_json(payload),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn email_is_unique_and_usernames_get_suffixes() {
    let app = test::init_service(test_app()).await;

    let first = register(&app, "sam@example.com").await;
    let second = register(&app, "sam@example.org").await;
    let third = register(&app, "s.am@example.net").await;

    assert_eq!(first["username"], "sam");
    assert_eq!(second["username"], "sam1");
    assert_eq!(third["username"], "sam2");

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/users").set_json(json!({
            "email": "sam@example.com",
            "password": PASSWORD,
            "role": "receiver",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email is already in use");
}

#[actix_web::test]
async fn login_accepts_form_bodies_and_rejects_bad_credentials() {
    let app = test::init_service(test_app()).await;
    register(&app, "form@example.com").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/login")
            .set_form([("username", "form@example.com"), ("password", PASSWORD)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);

    let (status, body) = login(&app, "form@example.com", "Wr0ng!pass").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid Credentials");

    let (status, _) = login(&app, "nobody@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn json_login_rejects_unknown_fields() {
    let app = test::init_service(test_app()).await;
    register(&app, "strict@example.com").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/login").set_json(json!({
            "email": "strict@example.com",
            "password": PASSWORD,
            "remember_me": true,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[rstest]
#[case(None)]
#[case(Some("Bearer not-a-jwt"))]
#[case(Some("Basic Zm9vOmJhcg=="))]
#[actix_web::test]
async fn protected_routes_require_a_valid_token(#[case] authorization: Option<&str>) {
    let app = test::init_service(test_app()).await;

    let mut req = test::TestRequest::get().uri("/posts");
    if let Some(value) = authorization {
        req = req.insert_header((header::AUTHORIZATION, value));
    }
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Unauthorized");
}

#[actix_web::test]
async fn profile_update_keeps_role_immutable() {
    let app = test::init_service(test_app()).await;
    register(&app, "taken@example.com").await;
    let (user, token) = signup(&app, "grace@example.com").await;

    let (status, _) = send(
        &app,
        test::TestRequest::patch()
            .uri("/users/me")
            .insert_header(bearer(&token))
            .set_json(json!({ "role": "receiver" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        test::TestRequest::patch()
            .uri("/users/me")
            .insert_header(bearer(&token))
            .set_json(json!({ "email": "taken@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email is already in use");

    let (status, updated) = send(
        &app,
        test::TestRequest::patch()
            .uri("/users/me")
            .insert_header(bearer(&token))
            .set_json(json!({ "firstName": "Grace", "lastName": "Hopper" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["firstName"], "Grace");
    assert_eq!(updated["lastName"], "Hopper");
    assert_eq!(updated["email"], user["email"]);
    assert_eq!(updated["role"], "donor");
}

#[actix_web::test]
async fn change_password_checks_current_and_confirmation() {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "linus@example.com").await;
    let new_password = "N3w!password";

    let change = |current: &str, confirm: &str| {
        test::TestRequest::patch()
            .uri("/users/me/password")
            .insert_header(bearer(&token))
            .set_json(json!({
                "currentPassword": current,
                "newPassword": new_password,
                "confirmPassword": confirm,
            }))
    };

    let (status, _) = send(&app, change("Wr0ng!pass", new_password)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, change(PASSWORD, "Mismatch!1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, change(PASSWORD, new_password)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = login(&app, "linus@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, "linus@example.com", new_password).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn soft_deleted_user_cannot_authenticate() {
    let app = test::init_service(test_app()).await;
    let (user, token) = signup(&app, "gone@example.com").await;
    let id = user["id"].as_str().unwrap();

    let delete = |password: &str| {
        test::TestRequest::delete()
            .uri("/users/me")
            .insert_header(bearer(&token))
            .set_json(json!({ "password": password }))
    };

    let (status, _) = send(&app, delete("short")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, delete("Wr0ng!pass")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, delete(PASSWORD)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = login(&app, "gone@example.com", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri("/users/me").insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, test::TestRequest::get().uri(&format!("/users/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The email is free again; the username is not.
    let again = register(&app, "gone@example.com").await;
    assert_eq!(again["username"], "gone1");
}

#[actix_web::test]
async fn malformed_ids_are_bad_requests() {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "ids@example.com").await;

    let (status, _) = send(&app, test::TestRequest::get().uri("/users/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/posts/42")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn created_post_is_retrievable_with_owner_and_votes() {
    let app = test::init_service(test_app()).await;
    let (user, token) = signup(&app, "writer@example.com").await;

    let created = create_post(&app, &token, "Hello Agora").await;
    assert_eq!(created["title"], "Hello Agora");
    assert_eq!(created["published"], true);
    assert_eq!(created["ownerId"], user["id"]);
    assert_eq!(created["owner"]["username"], "writer");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{id}"))
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["Post"], created);
    assert_eq!(fetched["votes"], 0);

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}", uuid::Uuid::new_v4()))
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["title"], "Not Found");
}

#[actix_web::test]
async fn listing_is_newest_first_searchable_and_paginated() {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "lister@example.com").await;

    create_post(&app, &token, "Rust tips").await;
    create_post(&app, &token, "Gardening").await;
    create_post(&app, &token, "rust in production").await;

    let list = |query: &str| {
        test::TestRequest::get()
            .uri(&format!("/posts{query}"))
            .insert_header(bearer(&token))
    };
    let titles = |body: &Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|item| item["Post"]["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = send(&app, list("")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&body),
        vec!["rust in production", "Gardening", "Rust tips"]
    );

    let (_, body) = send(&app, list("?search=RUST")).await;
    assert_eq!(titles(&body), vec!["rust in production", "Rust tips"]);

    let (_, body) = send(&app, list("?limit=1&skip=1")).await;
    assert_eq!(titles(&body), vec!["Gardening"]);

    let (status, _) = send(&app, list("?limit=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[case("?limit=9223372036854775808")]
#[case("?skip=9223372036854775808")]
#[case("?limit=18446744073709551615&skip=1")]
#[actix_web::test]
async fn pagination_beyond_signed_range_is_rejected(#[case] query: &str) {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "paging@example.com").await;

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts{query}"))
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn largest_signed_limit_is_accepted() {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "wide@example.com").await;
    create_post(&app, &token, "Only one").await;

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/posts?limit=9223372036854775807")
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn whitespace_search_is_matched_literally() {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "spaces@example.com").await;
    create_post(&app, &token, "alpha").await;
    create_post(&app, &token, "two words").await;

    let (status, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/posts?search=%20")
            .insert_header(bearer(&token)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["Post"]["title"], "two words");

    let (_, body) = send(
        &app,
        test::TestRequest::get()
            .uri("/posts?search=")
            .insert_header(bearer(&token)),
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn only_the_owner_may_change_a_post() {
    let app = test::init_service(test_app()).await;
    let (_, owner) = signup(&app, "owner@example.com").await;
    let (_, intruder) = signup(&app, "intruder@example.com").await;

    let post = create_post(&app, &owner, "Mine").await;
    let uri = format!("/posts/{}", post["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&intruder))
            .set_json(json!({ "title": "Yours now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&uri).insert_header(bearer(&intruder)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&owner))
            .set_json(json!({ "published": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Mine");
    assert_eq!(updated["published"], false);

    let (status, _) = send(
        &app,
        test::TestRequest::delete().uri(&uri).insert_header(bearer(&owner)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri(&uri).insert_header(bearer(&owner)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn votes_are_unique_per_user_and_post() {
    let app = test::init_service(test_app()).await;
    let (_, author) = signup(&app, "author@example.com").await;
    let (_, fan) = signup(&app, "fan@example.com").await;
    let post = create_post(&app, &author, "Like me").await;
    let post_id = &post["id"];

    let (status, body) = vote(&app, &fan, post_id, 1).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "successfully added vote");

    let (status, _) = vote(&app, &fan, post_id, 1).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, fetched) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}", post_id.as_str().unwrap()))
            .insert_header(bearer(&fan)),
    )
    .await;
    assert_eq!(fetched["votes"], 1);

    let (status, body) = vote(&app, &fan, post_id, 0).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "successfully deleted vote");

    let (status, body) = vote(&app, &fan, post_id, 0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Vote does not exist");
}

#[actix_web::test]
async fn deleting_a_post_removes_its_votes() {
    let db = InMemoryDatabase::new();
    let app = test::init_service(test_app_on(&db)).await;
    let (_, author) = signup(&app, "cascade@example.com").await;
    let (fan, fan_token) = signup(&app, "follower@example.com").await;
    let post = create_post(&app, &author, "Short lived").await;
    let post_id: uuid::Uuid = post["id"].as_str().unwrap().parse().unwrap();
    let fan_id: uuid::Uuid = fan["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = vote(&app, &fan_token, &post["id"], 1).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(db.votes().find(fan_id, post_id).await.unwrap().is_some());

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/posts/{post_id}"))
            .insert_header(bearer(&author)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(db.votes().find(fan_id, post_id).await.unwrap().is_none());
    assert!(
        db.votes()
            .count_by_posts(&[post_id])
            .await
            .unwrap()
            .is_empty()
    );

    let (status, body) = vote(&app, &fan_token, &post["id"], 0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().starts_with("Post with id"));
}

#[rstest]
#[case(2, StatusCode::BAD_REQUEST)]
#[case(-1, StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn vote_direction_must_be_zero_or_one(#[case] dir: i64, #[case] expected: StatusCode) {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "dir@example.com").await;
    let post = create_post(&app, &token, "Directions").await;

    let (status, _) = vote(&app, &token, &post["id"], dir).await;

    assert_eq!(status, expected);
}

#[actix_web::test]
async fn voting_on_a_missing_post_is_not_found() {
    let app = test::init_service(test_app()).await;
    let (_, token) = signup(&app, "lost@example.com").await;

    let (status, body) = vote(&app, &token, &json!(uuid::Uuid::new_v4()), 1).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().starts_with("Post with id"));
}
