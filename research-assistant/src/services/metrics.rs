use prometheus::{
    Counter, Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// All collectors, registered in one registry.
pub struct Metrics {
    pub registry: Registry,
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub reports_total: IntCounterVec,
    pub credits_charged_total: Counter,
    pub extraction_failures_total: IntCounterVec,
    pub provider_latency_seconds: HistogramVec,
}

// Global metrics
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Register all collectors. Safe to call more than once; the first
/// initialised set wins.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let http_requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;

    let http_request_duration_seconds = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path", "status"],
    )?;

    let reports_total = IntCounterVec::new(
        Opts::new(
            "research_reports_total",
            "Report generation attempts by provider and outcome",
        ),
        &["provider", "outcome"],
    )?;

    let credits_charged_total = Counter::new(
        "research_credits_charged_total",
        "Mock credits charged for generated reports",
    )?;

    let extraction_failures_total = IntCounterVec::new(
        Opts::new(
            "research_extraction_failures_total",
            "Uploaded files that could not be turned into text",
        ),
        &["kind"],
    )?;

    let provider_latency_seconds = HistogramVec::new(
        HistogramOpts::new(
            "research_provider_latency_seconds",
            "Latency of report provider calls in seconds",
        )
        .buckets(vec![0.05, 0.25, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0, 60.0, 120.0]),
        &["provider", "outcome"],
    )?;

    registry.register(Box::new(http_requests_total.clone()))?;
    registry.register(Box::new(http_request_duration_seconds.clone()))?;
    registry.register(Box::new(reports_total.clone()))?;
    registry.register(Box::new(credits_charged_total.clone()))?;
    registry.register(Box::new(extraction_failures_total.clone()))?;
    registry.register(Box::new(provider_latency_seconds.clone()))?;

    let _ = METRICS.set(Metrics {
        registry,
        http_requests_total,
        http_request_duration_seconds,
        reports_total,
        credits_charged_total,
        extraction_failures_total,
        provider_latency_seconds,
    });

    Ok(())
}

pub fn record_http_request(method: &str, path: &str, status: &str, seconds: f64) {
    if let Some(m) = METRICS.get() {
        let labels = [method, path, status];
        m.http_requests_total.with_label_values(&labels).inc();
        m.http_request_duration_seconds
            .with_label_values(&labels)
            .observe(seconds);
    }
}

pub fn record_report(provider: &str, outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.reports_total.with_label_values(&[provider, outcome]).inc();
    }
}

pub fn record_credits_charged(amount: f64) {
    if let Some(m) = METRICS.get() {
        m.credits_charged_total.inc_by(amount);
    }
}

pub fn record_extraction_failure(kind: &str) {
    if let Some(m) = METRICS.get() {
        m.extraction_failures_total.with_label_values(&[kind]).inc();
    }
}

pub fn record_provider_latency(provider: &str, outcome: &str, seconds: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency_seconds
            .with_label_values(&[provider, outcome])
            .observe(seconds);
    }
}

pub fn get_metrics() -> String {
    let Some(m) = METRICS.get() else {
        return String::new();
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = m.registry.gather();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_report_counters_after_init() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        record_report("mock", "success");
        record_credits_charged(1.0);
        record_extraction_failure("unsupported");

        let text = get_metrics();
        assert!(text.contains("research_reports_total"));
        assert!(text.contains("research_credits_charged_total"));
        assert!(text.contains("research_extraction_failures_total{kind=\"unsupported\"}"));
    }
}
