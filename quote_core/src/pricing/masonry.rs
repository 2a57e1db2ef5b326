//! # Masonry Flat Pricing
//!
//! Simple flat-price calculator for masonry repair work:
//! `base rate × severity × accessibility × quantity`.
//!
//! Base rates are per unit of work (linear foot of joint, brick, etc.),
//! so the quantity's meaning depends on the project type. Like the foam
//! calculator, this is a pure total function: non-positive or non-finite
//! quantities produce a zeroed result.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of masonry repair.
///
/// Unknown strings deserialize to the default (`TuckPointing`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum MasonryProjectType {
    #[default]
    TuckPointing,
    BrickReplacement,
    ChimneyRepair,
    StoneVeneer,
    CrackRepair,
}

impl From<String> for MasonryProjectType {
    fn from(s: String) -> Self {
        MasonryProjectType::from_str_flexible(&s)
    }
}

impl MasonryProjectType {
    /// Parse from common string representations; unknown falls back to the default.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "brick_replacement" | "brick" => MasonryProjectType::BrickReplacement,
            "chimney_repair" | "chimney" => MasonryProjectType::ChimneyRepair,
            "stone_veneer" | "veneer" => MasonryProjectType::StoneVeneer,
            "crack_repair" | "crack" => MasonryProjectType::CrackRepair,
            _ => MasonryProjectType::TuckPointing,
        }
    }

    pub const ALL: [MasonryProjectType; 5] = [
        MasonryProjectType::TuckPointing,
        MasonryProjectType::BrickReplacement,
        MasonryProjectType::ChimneyRepair,
        MasonryProjectType::StoneVeneer,
        MasonryProjectType::CrackRepair,
    ];

    /// Unit of work the base rate applies to
    pub fn unit(&self) -> &'static str {
        match self {
            MasonryProjectType::TuckPointing => "ln ft",
            MasonryProjectType::BrickReplacement => "brick",
            MasonryProjectType::ChimneyRepair => "job",
            MasonryProjectType::StoneVeneer => "sq ft",
            MasonryProjectType::CrackRepair => "ln ft",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MasonryProjectType::TuckPointing => "Tuck pointing",
            MasonryProjectType::BrickReplacement => "Brick replacement",
            MasonryProjectType::ChimneyRepair => "Chimney repair",
            MasonryProjectType::StoneVeneer => "Stone veneer",
            MasonryProjectType::CrackRepair => "Crack repair",
        }
    }
}

/// How far gone the masonry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Severity {
    #[default]
    Minor,
    Moderate,
    Severe,
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        Severity::from_str_flexible(&s)
    }
}

impl Severity {
    /// Unknown strings fall back to `Minor`.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "moderate" => Severity::Moderate,
            "severe" => Severity::Severe,
            _ => Severity::Minor,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Severity::Minor => 1.0,
            Severity::Moderate => 1.25,
            Severity::Severe => 1.6,
        }
    }
}

/// How hard the work area is to reach (staging, height, tight access).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Accessibility {
    #[default]
    Easy,
    Moderate,
    Difficult,
}

impl From<String> for Accessibility {
    fn from(s: String) -> Self {
        Accessibility::from_str_flexible(&s)
    }
}

impl Accessibility {
    /// Unknown strings fall back to `Easy`.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "moderate" => Accessibility::Moderate,
            "difficult" | "hard" => Accessibility::Difficult,
            _ => Accessibility::Easy,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Accessibility::Easy => 1.0,
            Accessibility::Moderate => 1.15,
            Accessibility::Difficult => 1.35,
        }
    }
}

/// Base rates in dollars per unit of work.
static BASE_RATES: Lazy<HashMap<MasonryProjectType, f64>> = Lazy::new(|| {
    HashMap::from([
        (MasonryProjectType::TuckPointing, 12.0),
        (MasonryProjectType::BrickReplacement, 25.0),
        (MasonryProjectType::ChimneyRepair, 850.0),
        (MasonryProjectType::StoneVeneer, 48.0),
        (MasonryProjectType::CrackRepair, 18.0),
    ])
});

/// Input for a masonry flat price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasonryInput {
    /// Kind of repair
    #[serde(default)]
    pub project_type: MasonryProjectType,

    /// Quantity in the project type's unit (see [`MasonryProjectType::unit`])
    pub quantity: f64,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    pub accessibility: Accessibility,
}

/// Result of a masonry flat price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasonryResult {
    /// Effective rate after multipliers ($/unit)
    pub unit_rate: f64,

    /// Total flat price
    pub total: f64,

    /// Unit the rate applies to
    pub unit: String,

    /// The inputs this result was derived from
    pub input: MasonryInput,
}

impl MasonryResult {
    pub fn is_priceable(&self) -> bool {
        self.total > 0.0
    }
}

/// Calculate a masonry flat price. Pure and total.
pub fn calculate(input: &MasonryInput) -> MasonryResult {
    let base = *BASE_RATES
        .get(&input.project_type)
        .unwrap_or(&0.0);
    let unit_rate = base * input.severity.multiplier() * input.accessibility.multiplier();

    let total = if input.quantity.is_finite() && input.quantity > 0.0 {
        unit_rate * input.quantity
    } else {
        0.0
    };

    MasonryResult {
        unit_rate,
        total,
        unit: input.project_type.unit().to_string(),
        input: input.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuck_pointing_minor_easy() {
        let input = MasonryInput {
            project_type: MasonryProjectType::TuckPointing,
            quantity: 40.0,
            severity: Severity::Minor,
            accessibility: Accessibility::Easy,
        };
        let result = calculate(&input);
        assert_eq!(result.unit_rate, 12.0);
        assert_eq!(result.total, 480.0);
        assert_eq!(result.unit, "ln ft");
        assert!(result.is_priceable());
    }

    #[test]
    fn test_multipliers_compound() {
        let input = MasonryInput {
            project_type: MasonryProjectType::BrickReplacement,
            quantity: 10.0,
            severity: Severity::Severe,
            accessibility: Accessibility::Difficult,
        };
        let result = calculate(&input);
        // 25 * 1.6 * 1.35 = 54.0
        assert!((result.unit_rate - 54.0).abs() < 1e-9);
        assert!((result.total - 540.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_quantity_zeroes_total() {
        let input = MasonryInput {
            project_type: MasonryProjectType::ChimneyRepair,
            quantity: 0.0,
            severity: Severity::Moderate,
            accessibility: Accessibility::Easy,
        };
        let result = calculate(&input);
        assert_eq!(result.total, 0.0);
        assert!(!result.is_priceable());
        // Rate is still reported so the UI can show it
        assert!(result.unit_rate > 0.0);
    }

    #[test]
    fn test_unknown_project_type_falls_back() {
        let json = r#"{"project_type": "gargoyle_restoration", "quantity": 5.0}"#;
        let input: MasonryInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.project_type, MasonryProjectType::TuckPointing);
        assert_eq!(input.severity, Severity::Minor);
    }

    #[test]
    fn test_pure() {
        let input = MasonryInput {
            project_type: MasonryProjectType::StoneVeneer,
            quantity: 12.5,
            severity: Severity::Moderate,
            accessibility: Accessibility::Moderate,
        };
        assert_eq!(calculate(&input), calculate(&input));
    }
}
