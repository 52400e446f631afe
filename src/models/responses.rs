//! Response DTOs for the presence API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStatsSnapshot;
use crate::data::{PersonalData, UserId};

/// Entry of the users listing (GET /api/v1/users)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    /// Name from the users XML, or `User <id>` when unknown
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserResponse {
    /// Builds a listing entry, falling back to a generated name.
    pub fn new(user_id: UserId, personal: Option<&PersonalData>) -> Self {
        match personal {
            Some(personal) => Self {
                user_id,
                name: personal.name.clone(),
                avatar_url: Some(personal.avatar_url.clone()),
            },
            None => Self {
                user_id,
                name: format!("User {user_id}"),
                avatar_url: None,
            },
        }
    }
}

/// Row of GET /api/v1/mean_time_weekday: `[day, mean_seconds]`
pub type MeanTimeRow = (&'static str, f64);

/// Row of GET /api/v1/presence_start_end: `[day, mean_start, mean_end]`
pub type StartEndRow = (&'static str, f64, f64);

/// Row of GET /api/v1/presence_weekday
///
/// Serialized as a two-element JSON array; the first row is a header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PresenceRow {
    Header(&'static str, &'static str),
    Day(&'static str, i64),
}

impl PresenceRow {
    pub fn header() -> Self {
        PresenceRow::Header("Weekday", "Presence (s)")
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of producer runs stored in the cache
    pub populations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStatsSnapshot> for StatsResponse {
    fn from(stats: CacheStatsSnapshot) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            populations: stats.populations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error message describing what went wrong
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_response_with_personal_data() {
        let personal = PersonalData {
            name: "Maria K.".to_string(),
            avatar_url: "https://intranet.example.com/api/images/users/10".to_string(),
        };
        let resp = UserResponse::new(10, Some(&personal));

        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "user_id": 10,
                "name": "Maria K.",
                "avatar_url": "https://intranet.example.com/api/images/users/10",
            })
        );
    }

    #[test]
    fn test_user_response_default_name() {
        let resp = UserResponse::new(11, None);
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"user_id": 11, "name": "User 11"})
        );
    }

    #[test]
    fn test_presence_rows_serialize_as_arrays() {
        let rows = vec![PresenceRow::header(), PresenceRow::Day("Mon", 24_123)];
        assert_eq!(
            serde_json::to_value(&rows).unwrap(),
            json!([["Weekday", "Presence (s)"], ["Mon", 24123]])
        );
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let resp = StatsResponse::from(CacheStatsSnapshot {
            hits: 80,
            misses: 20,
            populations: 20,
            total_entries: 2,
        });
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.populations, 20);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("User not found");
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"success": false, "message": "User not found"})
        );
    }
}
