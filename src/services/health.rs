use crate::error::{AppError, Result};
use crate::instrumentation::timed;
use crate::AppState;

/// Liveness probe backed by a metadata store write
pub struct HealthService;

impl HealthService {
    pub async fn check(state: &AppState) -> Result<()> {
        let sink = &*state.instrumentation;
        match timed(sink, "db.health_check", state.metadata.record_health_check()).await {
            Ok(check) => {
                tracing::debug!(check_id = check.check_id, "Health check recorded");
                Ok(())
            }
            Err(e) => {
                sink.increment("healthz.failure");
                Err(AppError::DependencyUnavailable(format!(
                    "health check write failed: {}",
                    e
                )))
            }
        }
    }
}
