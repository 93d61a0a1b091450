use serde::{Deserialize, Serialize};

use crate::detect::NormalizedDetectionSet;
use crate::error::ClassifyError;

/// Discrete crowd density band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl DensityLevel {
    pub const ALL: [DensityLevel; 4] = [
        DensityLevel::Low,
        DensityLevel::Medium,
        DensityLevel::High,
        DensityLevel::Critical,
    ];

    /// Lowercase name, as stored on alert records.
    pub fn as_str(self) -> &'static str {
        match self {
            DensityLevel::Low => "low",
            DensityLevel::Medium => "medium",
            DensityLevel::High => "high",
            DensityLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for DensityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DensityLevel::Low => "Low",
            DensityLevel::Medium => "Medium",
            DensityLevel::High => "High",
            DensityLevel::Critical => "Critical",
        };
        f.write_str(name)
    }
}

/// Highest alert level the classifier produces.
pub const MAX_ALERT_LEVEL: u8 = 4;

// Bands are checked in order; a frame lands in the first one it fits.
// (max people, ratio strictly below, density, level)
const BANDS: [(usize, f64, DensityLevel, u8); 3] = [
    (2, 0.10, DensityLevel::Low, 1),
    (5, 0.20, DensityLevel::Medium, 2),
    (10, 0.40, DensityLevel::High, 3),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityClassification {
    pub density: DensityLevel,
    /// 0 when nobody was detected, otherwise 1..=4.
    pub level: u8,
    pub person_count: usize,
    /// Person box area over frame area, rounded to 3 decimals.
    pub density_ratio: f64,
    pub description: String,
}

impl DensityClassification {
    fn empty() -> Self {
        Self {
            density: DensityLevel::Low,
            level: 0,
            person_count: 0,
            density_ratio: 0.0,
            description: "No people detected".to_string(),
        }
    }

    /// True when the level reaches `min_level`. Level 0 never alerts.
    pub fn is_alert(&self, min_level: u8) -> bool {
        self.level > 0 && self.level >= min_level
    }
}

/// Classify crowd density for one frame.
///
/// Overlapping boxes are not merged, so tightly packed people push the ratio up
/// faster than their true footprint.
pub fn classify_density(
    set: &NormalizedDetectionSet,
    image_width: u32,
    image_height: u32,
) -> Result<DensityClassification, ClassifyError> {
    if image_width == 0 || image_height == 0 {
        return Err(ClassifyError::InvalidDimensions {
            width: image_width,
            height: image_height,
        });
    }

    let person_count = set.person_count();
    if person_count == 0 {
        return Ok(DensityClassification::empty());
    }

    let image_area = image_width as f64 * image_height as f64;
    let ratio = set.total_area() / image_area;

    let (density, level) = BANDS
        .iter()
        .find(|(max_people, ratio_below, _, _)| {
            person_count <= *max_people && ratio < *ratio_below
        })
        .map(|(_, _, density, level)| (*density, *level))
        .unwrap_or((DensityLevel::Critical, MAX_ALERT_LEVEL));

    Ok(DensityClassification {
        density,
        level,
        person_count,
        density_ratio: round_ratio(ratio),
        description: describe(person_count, density, level),
    })
}

fn describe(person_count: usize, density: DensityLevel, level: u8) -> String {
    if level == 1 {
        format!("{} person(s) detected - {} density", person_count, density)
    } else {
        format!("{} people detected - {} density", person_count, density)
    }
}

/// Three decimals, rounded from the exact binary value: 0.1235 is stored just
/// below the tie and becomes 0.123.
///
/// `{:.3}` rounds exact ties (odd multiples of 1/16) to even; those go up instead.
fn round_ratio(ratio: f64) -> f64 {
    let sixteenths = ratio * 16.0;
    if sixteenths.fract() == 0.0 && sixteenths % 2.0 == 1.0 {
        return (ratio * 1000.0).ceil() / 1000.0;
    }
    format!("{:.3}", ratio).parse().unwrap_or(ratio)
}
