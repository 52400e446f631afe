//! Response models for the presence API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    ErrorResponse, HealthResponse, MeanTimeRow, PresenceRow, StartEndRow, StatsResponse, UserResponse,
};
