use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

// ── Label types ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureLabel {
    pub kind: String,
}

// ── Metrics registry ───────────────────────────────────────────────────────────

pub struct DebriefMetrics {
    pub registry: Registry,

    // Sessions
    pub sessions_started: Counter,
    pub sessions_completed: Counter,
    pub sessions_failed: Family<FailureLabel, Counter>,
    pub sessions_cancelled: Counter,

    // Wall time of the outbound call plus parsing, successful sessions only
    pub analysis_duration: Histogram,

    // History (set on each scrape)
    pub history_size: Gauge,

    // Uptime (set on each scrape)
    pub uptime_seconds: Gauge,
}

impl DebriefMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let sessions_started: Counter = Counter::default();
        registry.register(
            "debrief_sessions_started",
            "Analysis sessions started",
            sessions_started.clone(),
        );

        let sessions_completed: Counter = Counter::default();
        registry.register(
            "debrief_sessions_completed",
            "Analysis sessions that produced a report",
            sessions_completed.clone(),
        );

        let sessions_failed: Family<FailureLabel, Counter> = Family::default();
        registry.register(
            "debrief_sessions_failed",
            "Analysis sessions that failed, by failure kind",
            sessions_failed.clone(),
        );

        let sessions_cancelled: Counter = Counter::default();
        registry.register(
            "debrief_sessions_cancelled",
            "Analysis sessions cancelled before settling",
            sessions_cancelled.clone(),
        );

        // 0.5s .. ~128s
        let analysis_duration = Histogram::new(exponential_buckets(0.5, 2.0, 9));
        registry.register(
            "debrief_analysis_duration_seconds",
            "Time from request to parsed report",
            analysis_duration.clone(),
        );

        let history_size: Gauge = Gauge::default();
        registry.register(
            "debrief_history_reports",
            "Reports currently held in history",
            history_size.clone(),
        );

        let uptime_seconds: Gauge = Gauge::default();
        registry.register(
            "debrief_uptime_seconds",
            "Seconds since the server started",
            uptime_seconds.clone(),
        );

        Self {
            registry,
            sessions_started,
            sessions_completed,
            sessions_failed,
            sessions_cancelled,
            analysis_duration,
            history_size,
            uptime_seconds,
        }
    }

    pub fn record_failure(&self, kind: &str) {
        self.sessions_failed
            .get_or_create(&FailureLabel {
                kind: kind.to_string(),
            })
            .inc();
    }

    /// Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        if let Err(e) = prometheus_client::encoding::text::encode(&mut out, &self.registry) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        out
    }
}

impl Default for DebriefMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_registered_metrics() {
        let metrics = DebriefMetrics::new();
        metrics.sessions_started.inc();
        metrics.record_failure("transport");
        metrics.history_size.set(3);

        let text = metrics.encode();
        assert!(text.contains("debrief_sessions_started_total 1"));
        assert!(text.contains("debrief_sessions_failed_total{kind=\"transport\"} 1"));
        assert!(text.contains("debrief_history_reports 3"));
        assert!(text.contains("# EOF"));
    }
}
