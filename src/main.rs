use axum::{routing::get, Router};
use gigboard::{auth, chats, db, gigs, profiles, reviews, AppState, Config};
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let db_pool = db::connect(&config.database_url).await?;
    db::init_schema(&db_pool).await?;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(2)));

    let bind_addr = config.bind_addr.clone();
    let app_state = AppState { db_pool, config };

    let app = Router::new()
        .route("/", get(index))
        .nest("/auth", auth::router())
        .nest("/profile", profiles::router())
        .nest("/gigs", gigs::router())
        .nest("/chats", chats::router())
        .nest("/reviews", reviews::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("gigboard listening on {bind_addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> &'static str {
    "gigboard API is running"
}
