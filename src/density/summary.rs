use serde::Serialize;

use super::classify::{DensityClassification, DensityLevel};

/// Running aggregate over many classifications (one camera, one reporting window).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DensitySummary {
    samples: u64,
    empty_samples: u64,
    total_people: u64,
    ratio_sum: f64,
    peak_level: u8,
    /// Indexed by `DensityLevel` order; level-0 samples are not counted here.
    per_density: [u64; 4],
}

impl DensitySummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, classification: &DensityClassification) {
        self.samples += 1;
        self.total_people += classification.person_count as u64;
        self.ratio_sum += classification.density_ratio;
        self.peak_level = self.peak_level.max(classification.level);
        if classification.level == 0 {
            self.empty_samples += 1;
        } else {
            self.per_density[density_index(classification.density)] += 1;
        }
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn no_people_samples(&self) -> u64 {
        self.empty_samples
    }

    pub fn peak_level(&self) -> u8 {
        self.peak_level
    }

    pub fn count_for(&self, density: DensityLevel) -> u64 {
        self.per_density[density_index(density)]
    }

    /// Mean reported ratio, 0 with no samples.
    pub fn average_ratio(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.ratio_sum / self.samples as f64
    }

    pub fn average_people(&self) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        self.total_people as f64 / self.samples as f64
    }
}

fn density_index(density: DensityLevel) -> usize {
    match density {
        DensityLevel::Low => 0,
        DensityLevel::Medium => 1,
        DensityLevel::High => 2,
        DensityLevel::Critical => 3,
    }
}
