//! HTTP API.
//!
//! An `axum` router over the same services the CLI uses. Each request
//! resolves its caller through the [`IdentityChain`], then runs its store
//! work on the blocking pool with a connection of its own:
//!
//! ```text
//! request ──▶ Credentials ──▶ IdentityChain ──▶ spawn_blocking(Db::open ─▶ service) ──▶ JSON
//! ```
//!
//! Writers take `BEGIN IMMEDIATE` transactions, so concurrent completions for
//! the same user queue on SQLite's busy timeout instead of racing.

use crate::api::{Credentials, IdentityChain};
use crate::db::db::Db;
use crate::libs::clock::SharedClock;
use crate::libs::messages::Message;
use crate::msg_info;
use axum::http::HeaderMap;
use axum::routing::{get, patch, post, put};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

pub mod error;
pub mod handlers;

use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub identity: Arc<IdentityChain>,
    pub clock: SharedClock,
}

impl AppState {
    pub fn new(db_path: PathBuf, identity: IdentityChain, clock: SharedClock) -> Self {
        Self {
            db_path,
            identity: Arc::new(identity),
            clock,
        }
    }

    /// User id of the caller.
    pub async fn caller(&self, headers: &HeaderMap) -> Result<String, ApiError> {
        Ok(self.identity.resolve(&Credentials::from_headers(headers)).await?)
    }

    /// Runs `work` against a fresh connection on the blocking pool.
    pub async fn with_db<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        F: FnOnce(Db) -> crate::error::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        let clock = self.clock.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let db = Db::open(&path)?.with_clock(clock);
            work(db)
        })
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

        Ok(outcome?)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/tasks/:id",
            get(handlers::get_task).put(handlers::edit_task).delete(handlers::delete_task),
        )
        .route("/tasks/:id/complete", patch(handlers::complete_task))
        .route("/tasks/:id/defer", patch(handlers::defer_task))
        .route("/tasks/:id/duplicate", post(handlers::duplicate_task))
        .route("/streak/checkin", post(handlers::check_in))
        .route("/stats", get(handlers::stats))
        .route("/categories", get(handlers::list_categories).post(handlers::create_category))
        .route(
            "/categories/:id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/tags", get(handlers::list_tags).post(handlers::create_tag))
        .route("/tags/:id", put(handlers::update_tag).delete(handlers::delete_tag))
        .route("/profile", get(handlers::profile).post(handlers::register))
        .with_state(state)
}

/// Serves the API on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    msg_info!(Message::ServerStarting(listener.local_addr()?.to_string()));

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    msg_info!(Message::ServerStopped);
    Ok(())
}
