use std::{net::SocketAddr, sync::Arc};

use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use config::{Env, ServerConfig};
use dotenv::dotenv;
use store::{PgStore, Store};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod feed;
mod identity;
mod json;
mod schema;
mod store;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Clone)]
pub struct App {
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    init_tracing();

    let config = ServerConfig::new_from_env();

    let store = PgStore::connect(&config.database_url, config.database_pool_size)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let app = router(App {
        store: Arc::new(store),
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "comments_api=debug,tower_http=debug".into());

    // The config isn't loaded yet, so look at the variable directly
    let production = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");

    if production {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

pub fn router(state: App) -> Router {
    let cors = match (&state.config.cors_allowed_origin, &state.config.env) {
        (Some(origin), _) => match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([
                        axum::http::header::AUTHORIZATION,
                        axum::http::header::CONTENT_TYPE,
                        axum::http::HeaderName::from_static(identity::TOKEN_HEADER),
                    ]),
            ),
            Err(e) => {
                tracing::error!("Invalid CORS_ALLOWED_ORIGIN `{origin}`: {e}");
                None
            }
        },
        (None, Env::Dev) => Some(CorsLayer::permissive()),
        (None, _) => None,
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/comments", feed::routes::route())
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
