use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use uuid::Uuid;

use shepherd::api::{self, middleware::session::AppState};
use shepherd::config::Config;
use shepherd::db;
use shepherd::models::{
    member::MemberData, ministry::MinistryData, Credential, Member, MemberRole, Ministry, Role,
};
use shepherd::services::credentials;

pub const PASSWORD: &str = "correct horse battery staple";

/// Connects to `DATABASE_URL` and applies migrations. Returns `None` when no
/// database is configured so the suite is skipped rather than failed.
pub async fn test_pool() -> Option<PgPool> {
    let _ = dotenvy::dotenv();

    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database-backed test");
        return None;
    };

    let pool = db::create_pool(&url).await.expect("failed to connect to DATABASE_URL");
    db::run_migrations(&pool).await.expect("failed to run migrations");

    Some(pool)
}

pub fn app(pool: PgPool) -> Router {
    let config = Config {
        database_url: String::new(),
        base_url: "http://localhost:3000".to_string(),
        host: "127.0.0.1".to_string(),
        port: 3000,
        cookie_secure: false,
        enforce_pastor_zone_ownership: true,
        bootstrap_admin_email: None,
        bootstrap_admin_password: None,
    };
    let state = AppState { pool, config };

    api::router(state.clone())
        .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
        .with_state(state)
}

pub async fn member(pool: &PgPool, first_name: &str) -> Member {
    let data = MemberData {
        first_name: first_name.to_string(),
        last_name: "Test".to_string(),
        email: Some(format!("{}-{}@shepherd.test", first_name.to_lowercase(), Uuid::new_v4())),
        ..Default::default()
    };

    Member::create(pool, &data).await.unwrap()
}

/// A member who can sign in with `PASSWORD`
pub async fn member_with_login(pool: &PgPool, first_name: &str, roles: &[&str]) -> Member {
    let member = member(pool, first_name).await;

    let hashed = credentials::hash_secret(PASSWORD).unwrap();
    Credential::set(pool, member.id, &hashed).await.unwrap();

    for name in roles {
        let role = Role::find_by_name(pool, name).await.unwrap().unwrap();
        MemberRole::assign(pool, member.id, role.id).await.unwrap();
    }

    member
}

pub async fn ministry(pool: &PgPool, name: &str) -> Ministry {
    let data = MinistryData {
        name: format!("{} {}", name, Uuid::new_v4()),
        description: None,
    };

    Ministry::create(pool, &data).await.unwrap()
}

/// Signs in through the API and returns the session cookie pair
pub async fn sign_in(app: &Router, member: &Member) -> String {
    let body = serde_json::json!({
        "email": member.email.as_deref().unwrap(),
        "password": PASSWORD,
    });

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .unwrap()
        .to_string()
}

pub async fn send(
    app: &Router,
    cookie: &str,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> StatusCode {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie);

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.clone().oneshot(request).await.unwrap().status()
}
