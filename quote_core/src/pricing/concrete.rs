//! # Traditional Concrete Rate Pricing
//!
//! Per-square-foot pricing for conventional concrete leveling work:
//! `base rate × condition multiplier × square footage`.
//!
//! Used when a job is quoted by area rather than by injected material
//! (see [`crate::pricing::foam`] for the material-volume model).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of concrete surface.
///
/// Unknown strings deserialize to the default (`Driveway`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ConcreteProjectType {
    #[default]
    Driveway,
    Sidewalk,
    Patio,
    GarageFloor,
    Steps,
}

impl From<String> for ConcreteProjectType {
    fn from(s: String) -> Self {
        ConcreteProjectType::from_str_flexible(&s)
    }
}

impl ConcreteProjectType {
    /// Parse from common string representations; unknown falls back to the default.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "sidewalk" | "walkway" => ConcreteProjectType::Sidewalk,
            "patio" => ConcreteProjectType::Patio,
            "garage_floor" | "garage" => ConcreteProjectType::GarageFloor,
            "steps" | "stairs" => ConcreteProjectType::Steps,
            _ => ConcreteProjectType::Driveway,
        }
    }

    pub const ALL: [ConcreteProjectType; 5] = [
        ConcreteProjectType::Driveway,
        ConcreteProjectType::Sidewalk,
        ConcreteProjectType::Patio,
        ConcreteProjectType::GarageFloor,
        ConcreteProjectType::Steps,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            ConcreteProjectType::Driveway => "Driveway",
            ConcreteProjectType::Sidewalk => "Sidewalk",
            ConcreteProjectType::Patio => "Patio",
            ConcreteProjectType::GarageFloor => "Garage floor",
            ConcreteProjectType::Steps => "Steps",
        }
    }
}

/// Condition of the existing slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SlabCondition {
    #[default]
    Good,
    Fair,
    Poor,
}

impl From<String> for SlabCondition {
    fn from(s: String) -> Self {
        SlabCondition::from_str_flexible(&s)
    }
}

impl SlabCondition {
    /// Unknown strings fall back to `Good`.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "fair" => SlabCondition::Fair,
            "poor" | "bad" => SlabCondition::Poor,
            _ => SlabCondition::Good,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            SlabCondition::Good => 1.0,
            SlabCondition::Fair => 1.2,
            SlabCondition::Poor => 1.45,
        }
    }
}

/// Base rates in dollars per square foot.
static BASE_RATES: Lazy<HashMap<ConcreteProjectType, f64>> = Lazy::new(|| {
    HashMap::from([
        (ConcreteProjectType::Driveway, 5.5),
        (ConcreteProjectType::Sidewalk, 4.0),
        (ConcreteProjectType::Patio, 4.75),
        (ConcreteProjectType::GarageFloor, 6.25),
        (ConcreteProjectType::Steps, 9.0),
    ])
});

/// Input for an area-priced concrete job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteInput {
    #[serde(default)]
    pub project_type: ConcreteProjectType,

    /// Slab area in square feet
    pub square_footage: f64,

    #[serde(default)]
    pub condition: SlabCondition,
}

/// Result of an area-priced concrete job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcreteResult {
    /// Effective rate after the condition multiplier ($/sq ft)
    pub rate_per_sq_ft: f64,

    /// Total price
    pub total: f64,

    /// The inputs this result was derived from
    pub input: ConcreteInput,
}

impl ConcreteResult {
    pub fn is_priceable(&self) -> bool {
        self.total > 0.0
    }
}

/// Calculate an area-priced concrete job. Pure and total.
pub fn calculate(input: &ConcreteInput) -> ConcreteResult {
    let base = *BASE_RATES.get(&input.project_type).unwrap_or(&0.0);
    let rate_per_sq_ft = base * input.condition.multiplier();

    let total = if input.square_footage.is_finite() && input.square_footage > 0.0 {
        rate_per_sq_ft * input.square_footage
    } else {
        0.0
    };

    ConcreteResult {
        rate_per_sq_ft,
        total,
        input: input.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driveway_good_condition() {
        let input = ConcreteInput {
            project_type: ConcreteProjectType::Driveway,
            square_footage: 100.0,
            condition: SlabCondition::Good,
        };
        let result = calculate(&input);
        assert_eq!(result.rate_per_sq_ft, 5.5);
        assert_eq!(result.total, 550.0);
    }

    #[test]
    fn test_condition_multiplier() {
        let input = ConcreteInput {
            project_type: ConcreteProjectType::Sidewalk,
            square_footage: 50.0,
            condition: SlabCondition::Poor,
        };
        let result = calculate(&input);
        // 4.0 * 1.45 = 5.8
        assert!((result.rate_per_sq_ft - 5.8).abs() < 1e-9);
        assert!((result.total - 290.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_area_zeroes_total() {
        let input = ConcreteInput {
            project_type: ConcreteProjectType::Patio,
            square_footage: -10.0,
            condition: SlabCondition::Fair,
        };
        let result = calculate(&input);
        assert_eq!(result.total, 0.0);
        assert!(!result.is_priceable());
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let json = r#"{"project_type": "helipad", "square_footage": 20.0}"#;
        let input: ConcreteInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.project_type, ConcreteProjectType::Driveway);
    }
}
