use std::collections::BTreeMap;
use std::time::Instant;

use crate::touch::domain::touch_event::TouchEvent;

/// Observer for per-frame pipeline activity.
///
/// Keeps the touch pipeline free of any particular output mechanism:
/// the CLI collects stage timings, tests and embedders discard them.
pub trait PipelineLogger: Send {
    /// Called once per processed frame. `total` is `None` for live input.
    fn progress(&mut self, processed: usize, total: Option<usize>);

    /// Milliseconds spent in one stage for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Point-in-time value such as hand confidence or shadow threshold.
    fn metric(&mut self, name: &str, value: f64);

    /// A validated touch was emitted.
    fn touch(&mut self, _event: &TouchEvent) {}

    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _processed: usize, _total: Option<usize>) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
}

/// Collects per-stage timings and metrics and logs a summary at the end.
///
/// Progress is logged every `throttle_frames` frames.
pub struct StageTimingLogger {
    throttle_frames: usize,
    timings: BTreeMap<String, Vec<f64>>,
    metrics: BTreeMap<String, Vec<f64>>,
    touches: usize,
    processed: usize,
    started: Instant,
}

impl StageTimingLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            touches: 0,
            processed: 0,
            started: Instant::now(),
        }
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(Vec::as_slice)
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(Vec::as_slice)
    }

    /// Formatted report, or `None` before the first frame.
    pub fn summary_string(&self) -> Option<String> {
        if self.processed == 0 && self.timings.is_empty() {
            return None;
        }
        let elapsed_s = self.started.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Touch pipeline summary ({} frames, {} touches, {elapsed_s:.1}s):",
            self.processed, self.touches
        )];

        for (stage, durations) in &self.timings {
            let total: f64 = durations.iter().sum();
            let max = durations.iter().copied().fold(0.0, f64::max);
            lines.push(format!(
                "  {stage:10}: avg {:6.2}ms  max {max:6.2}ms  total {total:8.1}ms",
                mean(durations)
            ));
        }
        for (name, values) in &self.metrics {
            lines.push(format!("  {name}: avg {:.2} over {}", mean(values), values.len()));
        }
        if self.processed > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.processed as f64 / elapsed_s
            ));
        }
        Some(lines.join("\n"))
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StageTimingLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StageTimingLogger {
    fn progress(&mut self, processed: usize, total: Option<usize>) {
        self.processed = processed;
        let at_end = total == Some(processed);
        if processed % self.throttle_frames != 0 && !at_end {
            return;
        }
        match total {
            Some(total) if total > 0 => {
                let pct = processed as f64 / total as f64 * 100.0;
                log::info!("Processed {processed}/{total} frames ({pct:.1}%)");
            }
            _ => log::info!("Processed {processed} frames"),
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn touch(&mut self, event: &TouchEvent) {
        self.touches += 1;
        log::info!(
            "Touch on {} at frame #{} (confidence {:.2})",
            event.key,
            event.frame_index,
            event.confidence
        );
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
