use std::path::PathBuf;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tana_core::error::TanaError;
use tana_core::models::{ShowDetail, ShowPatch, ShowRecord, SoundtrackRecord};

use crate::db::DbHandle;
use crate::error::{ApiError, Result};

#[derive(Clone)]
pub struct AppState {
    pub db: DbHandle,
    /// Directory served under `/media`; cover paths resolve into it.
    pub media_root: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/anime", get(list_anime))
        .route("/api/anime/search/:query", get(search_anime))
        .route("/api/anime/:id", get(get_anime).patch(update_anime))
        .route("/api/soundtracks", get(list_soundtracks))
        .route("/api/health", get(health))
        .nest_service("/media", ServeDir::new(&state.media_root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /api/anime
///
/// Every show in the library, in id order.
async fn list_anime(State(state): State<AppState>) -> Result<Json<Vec<ShowRecord>>> {
    let shows = state
        .db
        .all_shows()
        .await
        .map_err(|e| internal(e, "Failed to fetch anime shows"))?;
    Ok(Json(shows))
}

/// GET /api/anime/:id
///
/// One show joined with its soundtrack info.
async fn get_anime(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShowDetail>> {
    state
        .db
        .get_show_detail(id)
        .await
        .map_err(|e| internal(e, "Failed to fetch anime details"))?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Anime not found".to_string()))
}

/// GET /api/anime/search/:query
///
/// Case-insensitive substring match over both name columns.
async fn search_anime(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<ShowRecord>>> {
    let shows = state
        .db
        .search_shows(query)
        .await
        .map_err(|e| internal(e, "Failed to search anime"))?;
    Ok(Json(shows))
}

/// PATCH /api/anime/:id
///
/// Apply a watch-progress patch and return the stored row.
async fn update_anime(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ShowPatch>,
) -> Result<Json<ShowRecord>> {
    let show = state.db.update_show(id, patch).await.map_err(|e| match e {
        TanaError::NotFound(_) => ApiError::NotFound("Anime not found".to_string()),
        TanaError::Validation(message) => ApiError::Validation(message),
        e => internal(e, "Failed to update anime"),
    })?;

    tracing::info!(
        id,
        progress = ?patch.anilist_progress,
        status = ?patch.watch_status,
        "Watch state updated"
    );

    Ok(Json(show))
}

/// GET /api/soundtracks
///
/// Every tracked soundtrack directory.
async fn list_soundtracks(
    State(state): State<AppState>,
) -> Result<Json<Vec<SoundtrackRecord>>> {
    let soundtracks = state
        .db
        .all_soundtracks()
        .await
        .map_err(|e| internal(e, "Failed to fetch soundtracks"))?;
    Ok(Json(soundtracks))
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Log the real failure, serve the endpoint's public message.
fn internal(err: TanaError, message: &str) -> ApiError {
    tracing::error!(error = %err, "{message}");
    ApiError::Internal(message.to_string())
}
