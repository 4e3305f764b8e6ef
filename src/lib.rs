//! Poll-voting site: list questions, vote on a choice, see the results.
//!
//! # Pages
//!
//! - `GET /polls` latest visible questions
//! - `GET /polls/{id}` voting form
//! - `GET /polls/{id}/results` vote counts
//! - `POST /polls/{id}/vote` form field `choice`
//!
//! A question is visible once its publish time has passed and it has at least
//! one choice. The same data is served as JSON under `/api`, together with
//! the admin endpoints that create and delete questions.
//!
//! # Setup
//!
//! Configuration comes from the environment (or a `.env` file):
//!
//! ```sh
//! DATABASE_URL=sqlite://polls.db PORT=3030 RUST_LOG=info cargo run
//! ```
use tokio::{net::TcpListener, signal};
use tracing::info;

pub mod admin;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod poll;
pub mod routes;
pub mod state;
pub mod views;

use config::Config;
use error::Result;
use state::AppState;

pub async fn start_server() -> Result<()> {
    let config = Config::load()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&config).await?;
    db::migrate(&pool).await?;

    let address = format!("0.0.0.0:{}", config.port);
    let app = routes::create_routes(AppState::new(pool.clone(), config));

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
