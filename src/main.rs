use harlem4tech::{AppState, Markdown, activities, auth, db, include_res, listings, messages, profiles};
use axum::{
    debug_handler, response::IntoResponse, routing::get, Router,
};
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("harlem4tech=debug,tower_http=info")),
        )
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(2)));

    let db_pool = db::connect(dotenv::var("DATABASE_URL")?.as_str()).await?;

    let app_state = AppState {
        db_pool,
        feed: broadcast::channel(256).0,
        names: Default::default(),
    };

    let app = Router::new()
        .route("/", get(welcome))
        .route("/about", get(about))
        .route("/how-it-works", get(how_it_works))

        .nest("/auth", auth::router())
        .nest("/p", profiles::router())
        .nest("/l", listings::router())
        .nest("/m", messages::router())
        .nest("/activity", activities::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

#[debug_handler]
async fn welcome() -> impl IntoResponse {
    Markdown(include_res!(str, "/pages/welcome.md"))
}

#[debug_handler]
async fn about() -> impl IntoResponse {
    Markdown(include_res!(str, "/pages/about.md"))
}

#[debug_handler]
async fn how_it_works() -> impl IntoResponse {
    Markdown(include_res!(str, "/pages/how_it_works.md"))
}
