use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use config::{Env, ServerConfig};
use dotenv::dotenv;
use mimalloc::MiMalloc;
use store::{Access, CommentArea, PgStore, QuestionBank};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod bank;
mod comment;
mod config;
mod error;
mod extract;
mod identity;
mod models;
mod params;
mod schema;
mod store;
mod utils;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Clone)]
pub struct App {
    config: Arc<ServerConfig>,
    comments: Arc<dyn CommentArea>,
    bank: Arc<dyn QuestionBank>,
    access: Arc<dyn Access>,
    /// Recently started practice sessions by submission, see
    /// `bank::session::start_quiz`
    start_quiz_guard: Arc<retainer::Cache<String, i32>>,
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter(|origin| {
            // credentialed requests cannot be allowed from any origin
            if origin.as_str() == "*" {
                tracing::warn!("Ignoring wildcard CORS origin, list the allowed origins instead");
                return false;
            }
            true
        })
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin `{origin}`");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn router(app: App) -> Router {
    let studentquiz = Router::<App>::new()
        .merge(comment::routes::route())
        .merge(bank::routes::route());

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/mod/studentquiz", studentquiz)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&app.config))
        .with_state(app)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "studentquiz=debug,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config::current_env() == Env::Production {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config = ServerConfig::new_from_env();
    tracing::info!(env = ?config.env, bind_addr = %config.bind_addr, "Loaded configuration");

    let store = Arc::new(PgStore::connect(
        &config.database_url,
        config.database_pool_size,
    )?);

    let start_quiz_guard = Arc::new(retainer::Cache::<String, i32>::new());
    let monitor = start_quiz_guard.clone();
    tokio::spawn(async move {
        monitor.monitor(4, 0.25, Duration::from_secs(3)).await;
    });

    let bind_addr = config.bind_addr;
    let app = App {
        config: Arc::new(config),
        comments: store.clone(),
        bank: store.clone(),
        access: store,
        start_quiz_guard,
    };

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, router(app)).await?;

    Ok(())
}

#[cfg(test)]
pub fn test_app(store: store::memory::MemoryStore) -> Router {
    let store = Arc::new(store);
    router(App {
        config: Arc::new(ServerConfig::for_tests()),
        comments: store.clone(),
        bank: store.clone(),
        access: store,
        start_quiz_guard: Arc::new(retainer::Cache::new()),
    })
}
