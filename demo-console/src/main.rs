use axum::{
    Json,
    routing::{Router, get},
};
use serde_json::{Value, json};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use console_auth::{Role, UserDirectory, UserRecord, UserStatus};
use console_auth_axum::{AuthUser, CONSOLE_AUTH_ROUTE_PREFIX, console_auth_router};

async fn index(user: Option<AuthUser>) -> Json<Value> {
    match user {
        Some(u) => Json(json!({
            "success": true,
            "message": format!("Hello, {}!", u.username),
            "role": u.role,
        })),
        None => Json(json!({
            "success": true,
            "message": "Hello, anonymous user",
        })),
    }
}

/// Seed the directory from `DEMO_USERS`, e.g. `alice:admin,bob:viewer`.
async fn seed_users() -> Result<(), Box<dyn std::error::Error>> {
    let Ok(users) = std::env::var("DEMO_USERS") else {
        return Ok(());
    };

    for entry in users.split(',').filter(|e| !e.trim().is_empty()) {
        let (username, role) = entry.trim().split_once(':').unwrap_or((entry.trim(), "viewer"));
        let role = match role {
            "admin" => Role::Admin,
            _ => Role::Viewer,
        };
        UserDirectory::upsert_user(UserRecord::new(username, UserStatus::Active, role)).await?;
        tracing::info!(username, %role, "Seeded demo user");
    }
    Ok(())
}

/// With `DEMO_BOOTSTRAP=1`, log a superuser token pair so the first passkey
/// can be enrolled with `Authorization: Bearer <access_token>`.
fn bootstrap_superuser() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("DEMO_BOOTSTRAP").as_deref() != Ok("1") {
        return Ok(());
    }

    let username = console_auth::superuser()?;
    let pair = console_auth::issue_token_pair(username, Role::Superuser)?;
    tracing::warn!(
        username,
        access_token = %pair.access_token,
        refresh_token = %pair.refresh_token,
        "Bootstrap tokens issued, do not enable DEMO_BOOTSTRAP outside local testing"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "demo_console=debug,console_auth=debug,console_auth_axum=debug,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    console_auth_axum::init().await?;
    seed_users().await?;
    bootstrap_superuser()?;

    let app = Router::new()
        .route("/", get(index))
        .nest(CONSOLE_AUTH_ROUTE_PREFIX.as_str(), console_auth_router());

    let addr = std::env::var("DEMO_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    tracing::info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
