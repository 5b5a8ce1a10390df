use serde::Serialize;
use sqlx::FromRow;

/// Liveness probe sentinel, one row per successful probe
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HealthCheck {
    pub check_id: i64,
    pub checked_at: String,
}
