use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds)
    total_ingest_time_us: AtomicU64,
    total_extract_time_us: AtomicU64,
    total_render_time_us: AtomicU64,

    // Counts
    total_entities_extracted: AtomicUsize,
    total_relations_extracted: AtomicUsize,
    total_edges_rendered: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_ingest(&self, duration: Duration) {
        self.total_ingest_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_extract(&self, duration: Duration, entities: usize, relations: usize) {
        self.total_extract_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_entities_extracted.fetch_add(entities, Ordering::Relaxed);
        self.total_relations_extracted.fetch_add(relations, Ordering::Relaxed);
    }

    pub fn record_render(&self, duration: Duration, edges: usize) {
        self.total_render_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_edges_rendered.fetch_add(edges, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let succeeded = &self.successful_requests;
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: succeeded.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_ingest_time_ms: avg_time_ms(&self.total_ingest_time_us, &self.total_requests),
            avg_extract_time_ms: avg_time_ms(&self.total_extract_time_us, succeeded),
            avg_render_time_ms: avg_time_ms(&self.total_render_time_us, succeeded),
            total_entities_extracted: self.total_entities_extracted.load(Ordering::Relaxed),
            total_relations_extracted: self.total_relations_extracted.load(Ordering::Relaxed),
            total_edges_rendered: self.total_edges_rendered.load(Ordering::Relaxed),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    let cnt = count.load(Ordering::Relaxed) as f64;
    if cnt > 0.0 {
        total / cnt / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_ingest_time_ms: f64,
    pub avg_extract_time_ms: f64,
    pub avg_render_time_ms: f64,
    pub total_entities_extracted: usize,
    pub total_relations_extracted: usize,
    pub total_edges_rendered: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = Metrics::new();
        metrics.record_request(true);
        metrics.record_request(false);
        metrics.record_extract(Duration::from_millis(4), 3, 2);
        metrics.record_render(Duration::from_millis(2), 2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.total_entities_extracted, 3);
        assert_eq!(snapshot.total_relations_extracted, 2);
        assert!((snapshot.avg_extract_time_ms - 4.0).abs() < 1e-9);
        assert!((snapshot.avg_render_time_ms - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_snapshot_has_zero_averages() {
        let snapshot = Metrics::new().snapshot();
        assert_eq!(snapshot.avg_ingest_time_ms, 0.0);
    }
}
