//! Resolution counters and rolling samples for the health surface.

use std::collections::VecDeque;
use std::sync::Mutex;

use ivr_model::ValidationStrategy;

/// Number of recent samples retained per rolling series.
pub const SAMPLE_WINDOW: usize = 1000;

#[derive(Debug, Default)]
struct MetricsInner {
    resolutions: u64,
    standard: u64,
    ai_enhanced: u64,
    fallback_lenient: u64,
    minimal_fallback: u64,
    ai_failures: u64,
    response_times_ms: VecDeque<f64>,
    confidences: VecDeque<f64>,
}

/// Point-in-time view of the collected metrics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsSnapshot {
    pub resolutions: u64,
    pub standard: u64,
    pub ai_enhanced: u64,
    pub fallback_lenient: u64,
    pub minimal_fallback: u64,
    pub ai_failures: u64,
    pub avg_response_time_ms: f64,
    pub avg_confidence: f64,
}

/// Thread-safe metric collector owned by the resolution engine.
#[derive(Debug, Default)]
pub struct ResolutionMetrics {
    inner: Mutex<MetricsInner>,
}

impl ResolutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed resolution.
    pub fn record_resolution(
        &self,
        strategy: ValidationStrategy,
        ai_enhanced: bool,
        elapsed_ms: f64,
        mean_confidence: Option<f64>,
    ) {
        let mut inner = self.inner.lock().expect("metrics lock poisoned");
        inner.resolutions += 1;
        match strategy {
            ValidationStrategy::Standard => inner.standard += 1,
            ValidationStrategy::Adaptive => {
                if ai_enhanced {
                    inner.ai_enhanced += 1;
                }
            }
            ValidationStrategy::FallbackLenient => inner.fallback_lenient += 1,
            ValidationStrategy::MinimalFallback => inner.minimal_fallback += 1,
        }
        push_sample(&mut inner.response_times_ms, elapsed_ms);
        if let Some(confidence) = mean_confidence {
            push_sample(&mut inner.confidences, confidence);
        }
    }

    /// Records a failed AI-enhancement attempt.
    pub fn record_ai_failure(&self) {
        self.inner.lock().expect("metrics lock poisoned").ai_failures += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = self.inner.lock().expect("metrics lock poisoned");
        MetricsSnapshot {
            resolutions: inner.resolutions,
            standard: inner.standard,
            ai_enhanced: inner.ai_enhanced,
            fallback_lenient: inner.fallback_lenient,
            minimal_fallback: inner.minimal_fallback,
            ai_failures: inner.ai_failures,
            avg_response_time_ms: mean(&inner.response_times_ms),
            avg_confidence: mean(&inner.confidences),
        }
    }
}

fn push_sample(series: &mut VecDeque<f64>, sample: f64) {
    if series.len() == SAMPLE_WINDOW {
        series.pop_front();
    }
    series.push_back(sample);
}

fn mean(series: &VecDeque<f64>) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}
