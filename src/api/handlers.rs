//! API Handlers
//!
//! HTTP request handlers for each presence analyzer endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{Cached, MemoryCache};
use crate::config::Config;
use crate::data::{
    average_start_end, group_by_weekday, group_start_end_by_weekday, mean, PresenceLoader,
    UserId, UserPresence, UsersLoader, WEEKDAY_ABBR,
};
use crate::error::{PresenceError, Result};
use crate::models::{
    HealthResponse, MeanTimeRow, PresenceRow, StartEndRow, StatsResponse, UserResponse,
};

/// Application state shared across all handlers.
///
/// Holds the cache and the cached loaders built on top of it.
#[derive(Clone)]
pub struct AppState {
    /// Shared memoization cache
    pub cache: Arc<MemoryCache>,
    /// Cached presence CSV loader
    pub presence: Arc<Cached<PresenceLoader, MemoryCache>>,
    /// Cached users XML loader
    pub users: Arc<Cached<UsersLoader, MemoryCache>>,
}

impl AppState {
    /// Creates a new AppState whose loaders read the configured files
    /// through `cache`.
    pub fn new(config: &Config, cache: Arc<MemoryCache>) -> Self {
        let ttl = config.cache_ttl();
        let presence = Cached::new(PresenceLoader::new(&config.data_csv), ttl, Arc::clone(&cache));
        let users = Cached::new(UsersLoader::new(&config.user_data_xml), ttl, Arc::clone(&cache));

        Self {
            cache,
            presence: Arc::new(presence),
            users: Arc::new(users),
        }
    }

    /// Creates a new AppState with a fresh cache.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config, Arc::new(MemoryCache::new()))
    }

    /// Presence of one user, or `UserNotFound`.
    pub fn user_presence(&self, user_id: UserId) -> Result<UserPresence> {
        let data = self.presence.call(&())?;
        data.get(&user_id).cloned().ok_or_else(|| {
            tracing::debug!(user_id, "User not found");
            PresenceError::UserNotFound(user_id)
        })
    }

    /// Listing of every user with presence data.
    pub fn list_users(&self) -> Result<Vec<UserResponse>> {
        let presence = self.presence.call(&())?;
        let users = self.users.call(&())?;

        Ok(presence
            .keys()
            .map(|&user_id| UserResponse::new(user_id, users.get(&user_id)))
            .collect())
    }
}

/// Runs a cache-backed load on the blocking pool.
///
/// Cache populations read files while holding the population lock, which
/// must not happen on a runtime worker thread.
async fn blocking<T, F>(load: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(load)
        .await
        .map_err(|e| PresenceError::Internal(e.to_string()))?
}

/// Handler for GET /api/v1/users
///
/// Users listing for the dropdown.
pub async fn users_handler(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let users = blocking(move || state.list_users()).await?;
    Ok(Json(users))
}

/// Handler for GET /api/v1/mean_time_weekday/:user_id
///
/// Mean presence time of the user grouped by weekday.
pub async fn mean_time_weekday_handler(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<MeanTimeRow>>> {
    let user_data = blocking(move || state.user_presence(user_id)).await?;
    let weekdays = group_by_weekday(&user_data);

    let rows = WEEKDAY_ABBR
        .iter()
        .zip(weekdays.iter())
        .map(|(&day, intervals)| (day, mean(intervals)))
        .collect();

    Ok(Json(rows))
}

/// Handler for GET /api/v1/presence_weekday/:user_id
///
/// Total presence time of the user grouped by weekday, after a header row.
pub async fn presence_weekday_handler(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<PresenceRow>>> {
    let user_data = blocking(move || state.user_presence(user_id)).await?;
    let weekdays = group_by_weekday(&user_data);

    let rows = std::iter::once(PresenceRow::header())
        .chain(
            WEEKDAY_ABBR
                .iter()
                .zip(weekdays.iter())
                .map(|(&day, intervals)| PresenceRow::Day(day, intervals.iter().sum())),
        )
        .collect();

    Ok(Json(rows))
}

/// Handler for GET /api/v1/presence_start_end/:user_id
///
/// Mean start and end of work of the user for every weekday.
pub async fn presence_start_end_handler(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<StartEndRow>>> {
    let user_data = blocking(move || state.user_presence(user_id)).await?;
    let weekdays = group_start_end_by_weekday(&user_data);

    Ok(Json(average_start_end(&weekdays)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
