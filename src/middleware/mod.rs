pub mod admission;
pub mod metrics;
pub mod request_id;

pub use admission::{admission_gate, RouteName};
pub use metrics::track_metrics;
pub use request_id::request_id;
