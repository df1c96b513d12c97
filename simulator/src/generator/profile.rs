use copilotcore::detection::{BoundingBox, Detection, DetectionBatch};
use copilotcore::prelude::FrameSource;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for a synthetic detection stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub batches: usize,
    pub start_ms: u64,
    /// Mean gap between frames; actual gaps jitter by up to half of it.
    pub interval_ms: u64,
    pub max_detections: usize,
    /// Chance that a frame carries no detections at all.
    pub empty_ratio: f64,
    pub classes: Vec<String>,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            batches: 120,
            start_ms: 0,
            interval_ms: 500,
            max_detections: 3,
            empty_ratio: 0.3,
            classes: ["pare", "ceda_el_paso", "velocidad_40", "curva_peligrosa"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            seed: 0,
        }
    }
}

/// Seeded source of irregularly timed batches with non-decreasing timestamps.
pub struct SyntheticSource {
    config: GeneratorConfig,
    rng: StdRng,
    emitted: usize,
    clock_ms: u64,
}

impl SyntheticSource {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let clock_ms = config.start_ms;
        Self {
            config,
            rng,
            emitted: 0,
            clock_ms,
        }
    }

    fn random_detection(&mut self) -> Detection {
        let class_index = self.rng.gen_range(0..self.config.classes.len());
        let confidence: f32 = self.rng.gen_range(0.25..1.0);
        let x1: f32 = self.rng.gen_range(0.0..0.8);
        let y1: f32 = self.rng.gen_range(0.0..0.8);
        let w: f32 = self.rng.gen_range(0.05..0.2);
        let h: f32 = self.rng.gen_range(0.05..0.2);
        Detection::new(
            self.config.classes[class_index].clone(),
            confidence,
            BoundingBox::new(x1, y1, x1 + w, y1 + h),
        )
    }
}

impl FrameSource for SyntheticSource {
    fn next_batch(&mut self) -> Option<DetectionBatch> {
        if self.emitted >= self.config.batches {
            return None;
        }
        if self.emitted > 0 {
            let jitter = self.config.interval_ms / 2;
            self.clock_ms += self.config.interval_ms.saturating_sub(jitter)
                + self.rng.gen_range(0..=jitter * 2);
        }
        self.emitted += 1;

        let empty = self.config.classes.is_empty()
            || self.config.max_detections == 0
            || self.rng.gen_bool(self.config.empty_ratio.clamp(0.0, 1.0));
        let detections = if empty {
            Vec::new()
        } else {
            let count = self.rng.gen_range(1..=self.config.max_detections);
            (0..count).map(|_| self.random_detection()).collect()
        };
        let inference_time_ms = self.rng.gen_range(15..60);

        Some(DetectionBatch::new(
            self.clock_ms,
            inference_time_ms,
            detections,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(config: GeneratorConfig) -> Vec<DetectionBatch> {
        let mut source = SyntheticSource::new(config);
        std::iter::from_fn(|| source.next_batch()).collect()
    }

    #[test]
    fn generator_emits_requested_batch_count_in_time_order() {
        let batches = collect(GeneratorConfig {
            batches: 50,
            start_ms: 1_000,
            ..Default::default()
        });
        assert_eq!(batches.len(), 50);
        assert_eq!(batches[0].captured_at_ms, 1_000);
        assert!(batches
            .windows(2)
            .all(|pair| pair[0].captured_at_ms <= pair[1].captured_at_ms));
    }

    #[test]
    fn generator_is_reproducible_per_seed() {
        let config = GeneratorConfig {
            batches: 20,
            seed: 13,
            ..Default::default()
        };
        assert_eq!(collect(config.clone()), collect(config));
    }

    #[test]
    fn generator_without_classes_emits_empty_batches() {
        let batches = collect(GeneratorConfig {
            batches: 5,
            classes: Vec::new(),
            ..Default::default()
        });
        assert!(batches.iter().all(DetectionBatch::is_empty));
    }
}
