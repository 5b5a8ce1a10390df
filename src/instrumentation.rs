//! Timers and counters for request handling and store operations.
//!
//! Call sites always hold an `Arc<dyn Instrumentation>`; when metrics are
//! disabled that is a `NoopInstrumentation`.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::future::Future;
use std::time::{Duration, Instant};

pub trait Instrumentation: Send + Sync {
    /// Count one occurrence of `event`
    fn increment(&self, event: &str);

    /// Record how long `operation` took
    fn observe(&self, operation: &str, elapsed: Duration);

    /// Exposition text, if this sink can be scraped
    fn render(&self) -> Option<String> {
        None
    }
}

/// Sink used when metrics are disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstrumentation;

impl Instrumentation for NoopInstrumentation {
    fn increment(&self, _event: &str) {}

    fn observe(&self, _operation: &str, _elapsed: Duration) {}
}

/// Prometheus-backed sink with its own registry
pub struct PrometheusInstrumentation {
    registry: Registry,
    events: IntCounterVec,
    durations: HistogramVec,
}

impl PrometheusInstrumentation {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let events = IntCounterVec::new(
            Opts::new("filegate_events_total", "Total events by name"),
            &["event"],
        )?;
        let durations = HistogramVec::new(
            HistogramOpts::new(
                "filegate_operation_duration_seconds",
                "Duration of requests and store operations",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["operation"],
        )?;

        registry.register(Box::new(events.clone()))?;
        registry.register(Box::new(durations.clone()))?;

        Ok(Self {
            registry,
            events,
            durations,
        })
    }
}

impl Instrumentation for PrometheusInstrumentation {
    fn increment(&self, event: &str) {
        self.events.with_label_values(&[event]).inc();
    }

    fn observe(&self, operation: &str, elapsed: Duration) {
        self.durations
            .with_label_values(&[operation])
            .observe(elapsed.as_secs_f64());
    }

    fn render(&self) -> Option<String> {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return None;
        }
        String::from_utf8(buffer).ok()
    }
}

/// Await `operation`, recording its duration under `name`.
pub async fn timed<F, T>(sink: &dyn Instrumentation, name: &str, operation: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let output = operation.await;
    sink.observe(name, started.elapsed());
    output
}
