use api::auth::generate_jwt;
use api::routes::routes;
use axum::Router;
use db::models::user::{self, Role};
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use util::state::AppState;

/// Builds the full `/api` router over a fresh in-memory database.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    let db = setup_test_db().await;
    let state = AppState::new(db.clone());
    let app = Router::new().nest("/api", routes()).with_state(state);
    (app, db)
}

pub fn auth_header(user: &user::Model) -> String {
    let (token, _) = generate_jwt(user.id, user.role);
    format!("Bearer {token}")
}

pub async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    full_name: &str,
    role: Role,
) -> user::Model {
    user::Model::create(
        db,
        username,
        &format!("{username}@example.com"),
        "not-a-real-hash",
        full_name,
        role,
    )
    .await
    .expect("failed to seed user")
}
