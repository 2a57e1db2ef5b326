//! # Polyurethane Foam Leveling Calculator
//!
//! Prices a foam-injection concrete leveling job from slab geometry and
//! material selection using the wedge/void-volume model:
//!
//! 1. Plan area from length × width
//! 2. Wedge multiplier for how many sides of the slab have settled
//!    (settlement is rarely uniform across the full slab)
//! 3. Void volume under the slab, converted to cubic yards
//! 4. Foam yield factor (lbs of material per cubic yard) by foam type
//!    and application technique
//! 5. Material weight, then the published $/lb range gives the low/high
//!    price. The per-pound rate already embeds labor and margin, so the
//!    material cost range IS the job price range.
//!
//! Soil type, weather, moisture, and travel distance are recorded with the
//! job and echoed in the result, but do not move the price in this model.
//!
//! ## Totality
//!
//! `calculate` never fails and never panics. Degenerate geometry
//! (non-positive or non-finite length/width) produces an all-zero result
//! with the inputs echoed; callers gate on
//! [`FoamLevelingResult::is_priceable`] before building a service line.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::money::SquareFeet;
//! use quote_core::pricing::foam::{calculate, FoamLevelingInput, FoamType, ApplicationType};
//!
//! let input = FoamLevelingInput {
//!     length_ft: 10.0,
//!     width_ft: 20.0,
//!     foam_type: FoamType::Rr401,
//!     application: ApplicationType::Lift,
//!     ..FoamLevelingInput::default()
//! };
//!
//! let result = calculate(&input);
//! assert!(result.is_priceable());
//! assert_eq!(result.square_footage, SquareFeet(200.0));
//! println!("{} - {}", result.estimated_price_low, result.estimated_price_high);
//! ```

use serde::{Deserialize, Serialize};

use crate::document::ServiceLine;
use crate::money::{CubicFeet, CubicYards, Dollars, Pounds, SquareFeet};
use crate::pricing::PricingItem;

/// Published material rate range, dollars per pound of foam placed.
/// Labor and margin are embedded in these rates.
pub const RATE_LOW_PER_LB: f64 = 10.0;
pub const RATE_HIGH_PER_LB: f64 = 15.0;

/// Soil under the slab. Job context only; does not affect the price.
///
/// Unknown strings deserialize to the default (`Mixed`) rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SoilType {
    Clay,
    Sand,
    #[default]
    Mixed,
    Rock,
    Organic,
}

impl From<String> for SoilType {
    fn from(s: String) -> Self {
        SoilType::from_str_flexible(&s)
    }
}

impl SoilType {
    /// All variants for UI selection
    pub const ALL: [SoilType; 5] = [
        SoilType::Clay,
        SoilType::Sand,
        SoilType::Mixed,
        SoilType::Rock,
        SoilType::Organic,
    ];

    /// Parse from common string representations.
    /// Unknown strings fall back to the default (`Mixed`) rather than erroring.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "clay" => SoilType::Clay,
            "sand" | "sandy" => SoilType::Sand,
            "rock" | "rocky" => SoilType::Rock,
            "organic" | "topsoil" => SoilType::Organic,
            _ => SoilType::Mixed,
        }
    }
}

/// Weather at time of work. Job context only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum WeatherConditions {
    Cold,
    #[default]
    Normal,
    Hot,
}

impl From<String> for WeatherConditions {
    fn from(s: String) -> Self {
        WeatherConditions::from_str_flexible(&s)
    }
}

impl WeatherConditions {
    pub const ALL: [WeatherConditions; 3] = [
        WeatherConditions::Cold,
        WeatherConditions::Normal,
        WeatherConditions::Hot,
    ];

    /// Unknown strings fall back to `Normal`.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "cold" => WeatherConditions::Cold,
            "hot" => WeatherConditions::Hot,
            _ => WeatherConditions::Normal,
        }
    }
}

/// Ground moisture. Job context only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MoistureLevel {
    Dry,
    #[default]
    Normal,
    Wet,
}

impl From<String> for MoistureLevel {
    fn from(s: String) -> Self {
        MoistureLevel::from_str_flexible(&s)
    }
}

impl MoistureLevel {
    pub const ALL: [MoistureLevel; 3] = [
        MoistureLevel::Dry,
        MoistureLevel::Normal,
        MoistureLevel::Wet,
    ];

    /// Unknown strings fall back to `Normal`.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "dry" => MoistureLevel::Dry,
            "wet" | "saturated" => MoistureLevel::Wet,
            _ => MoistureLevel::Normal,
        }
    }
}

/// Foam product line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum FoamType {
    /// Standard-density slab lifting foam
    #[default]
    #[serde(rename = "RR201")]
    Rr201,
    /// High-density foam for heavier slabs and deeper voids
    #[serde(rename = "RR401")]
    Rr401,
}

impl From<String> for FoamType {
    fn from(s: String) -> Self {
        FoamType::from_str_flexible(&s)
    }
}

impl FoamType {
    pub const ALL: [FoamType; 2] = [FoamType::Rr201, FoamType::Rr401];

    /// Foam yield factor in pounds of material per cubic yard of void,
    /// by application technique.
    pub fn factor_lbs_per_cu_yd(&self, application: ApplicationType) -> f64 {
        match (self, application) {
            (FoamType::Rr201, ApplicationType::Lift) => 100.0,
            (FoamType::Rr201, ApplicationType::Void) => 70.0,
            (FoamType::Rr401, ApplicationType::Lift) => 120.0,
            (FoamType::Rr401, ApplicationType::Void) => 110.0,
        }
    }

    /// Product code as printed on estimates
    pub fn code(&self) -> &'static str {
        match self {
            FoamType::Rr201 => "RR201",
            FoamType::Rr401 => "RR401",
        }
    }

    /// Unknown strings fall back to `RR201`.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_uppercase().replace([' ', '-'], "").as_str() {
            "RR401" | "401" => FoamType::Rr401,
            _ => FoamType::Rr201,
        }
    }
}

impl std::fmt::Display for FoamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Injection technique. Lifting a settled slab consumes more material per
/// yard than filling an open void.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ApplicationType {
    #[default]
    Lift,
    Void,
}

impl From<String> for ApplicationType {
    fn from(s: String) -> Self {
        ApplicationType::from_str_flexible(&s)
    }
}

impl ApplicationType {
    pub const ALL: [ApplicationType; 2] = [ApplicationType::Lift, ApplicationType::Void];

    /// Unknown strings fall back to `Lift`.
    pub fn from_str_flexible(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "void" | "void fill" | "voidfill" => ApplicationType::Void,
            _ => ApplicationType::Lift,
        }
    }
}

/// Input parameters for a foam leveling price.
///
/// All geometry is in US customary units (feet, inches).
///
/// ## JSON Example
///
/// ```json
/// {
///   "length_ft": 10.0,
///   "width_ft": 20.0,
///   "inches_settled": 1.0,
///   "sides_settled": 1,
///   "soil_type": "mixed",
///   "weather": "normal",
///   "moisture": "normal",
///   "travel_distance_miles": 0.0,
///   "foam_type": "RR401",
///   "application": "lift"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoamLevelingInput {
    /// Slab length in feet
    pub length_ft: f64,

    /// Slab width in feet
    pub width_ft: f64,

    /// How far the slab has settled, in inches
    #[serde(default = "default_inches_settled")]
    pub inches_settled: f64,

    /// How many sides of the slab show settlement (1, 2, or 3)
    #[serde(default = "default_sides_settled")]
    pub sides_settled: u8,

    /// Soil under the slab (recorded with the job)
    #[serde(default)]
    pub soil_type: SoilType,

    /// Weather conditions (recorded with the job)
    #[serde(default)]
    pub weather: WeatherConditions,

    /// Ground moisture (recorded with the job)
    #[serde(default)]
    pub moisture: MoistureLevel,

    /// One-way travel distance to the site, in miles (recorded with the job)
    #[serde(default)]
    pub travel_distance_miles: f64,

    /// Foam product
    #[serde(default)]
    pub foam_type: FoamType,

    /// Injection technique
    #[serde(default)]
    pub application: ApplicationType,
}

fn default_inches_settled() -> f64 {
    1.0
}

fn default_sides_settled() -> u8 {
    1
}

impl Default for FoamLevelingInput {
    fn default() -> Self {
        FoamLevelingInput {
            length_ft: 0.0,
            width_ft: 0.0,
            inches_settled: default_inches_settled(),
            sides_settled: default_sides_settled(),
            soil_type: SoilType::default(),
            weather: WeatherConditions::default(),
            moisture: MoistureLevel::default(),
            travel_distance_miles: 0.0,
            foam_type: FoamType::default(),
            application: ApplicationType::default(),
        }
    }
}

impl FoamLevelingInput {
    /// Create an input for the given slab with all other fields at their
    /// documented defaults.
    pub fn new(length_ft: f64, width_ft: f64) -> Self {
        FoamLevelingInput {
            length_ft,
            width_ft,
            ..FoamLevelingInput::default()
        }
    }

    /// True when the geometry can produce a price.
    pub fn has_valid_geometry(&self) -> bool {
        self.length_ft.is_finite()
            && self.width_ft.is_finite()
            && self.length_ft > 0.0
            && self.width_ft > 0.0
    }
}

/// Wedge multiplier modeling non-uniform settlement.
///
/// A slab settled on one side forms a wedge holding roughly half the
/// full-depth volume; settlement on two sides (a corner drop) holds about
/// a quarter. Three sides, or anything outside the expected domain, is
/// priced at the full prism volume (worst case).
pub fn wedge_multiplier(sides_settled: u8) -> f64 {
    match sides_settled {
        1 => 0.50,
        2 => 0.25,
        _ => 1.00,
    }
}

/// Results of a foam leveling price calculation.
///
/// A fresh, immutable snapshot is produced on every call; nothing mutates
/// a result in place. Degenerate geometry yields the all-zero sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoamLevelingResult {
    /// Plan area
    pub square_footage: SquareFeet,

    /// Estimated void volume under the slab
    pub void_volume_cu_ft: CubicFeet,

    /// Estimated void volume in yards
    pub void_volume_cu_yd: CubicYards,

    /// Foam material required
    pub material_weight_lbs: Pounds,

    /// Material cost at the low end of the published $/lb range
    pub material_cost_low: Dollars,

    /// Material cost at the high end of the published $/lb range
    pub material_cost_high: Dollars,

    /// Job price, low bound (equals material_cost_low in this model)
    pub estimated_price_low: Dollars,

    /// Job price, high bound
    pub estimated_price_high: Dollars,

    /// Low price per square foot of slab (0 when area is 0)
    pub price_per_sq_ft_low: Dollars,

    /// High price per square foot of slab (0 when area is 0)
    pub price_per_sq_ft_high: Dollars,

    /// The inputs this result was derived from
    pub input: FoamLevelingInput,
}

impl FoamLevelingResult {
    /// All-zero sentinel for degenerate geometry. Inputs are still echoed
    /// so the caller can show what was entered.
    fn zeroed(input: &FoamLevelingInput) -> Self {
        FoamLevelingResult {
            square_footage: if input.length_ft.is_finite() && input.width_ft.is_finite() {
                SquareFeet((input.length_ft * input.width_ft).min(0.0))
            } else {
                SquareFeet(0.0)
            },
            void_volume_cu_ft: CubicFeet(0.0),
            void_volume_cu_yd: CubicYards(0.0),
            material_weight_lbs: Pounds(0.0),
            material_cost_low: Dollars(0.0),
            material_cost_high: Dollars(0.0),
            estimated_price_low: Dollars(0.0),
            estimated_price_high: Dollars(0.0),
            price_per_sq_ft_low: Dollars(0.0),
            price_per_sq_ft_high: Dollars(0.0),
            input: input.clone(),
        }
    }

    /// Midpoint of the price range, the default "use this price" value.
    pub fn price_mid(&self) -> Dollars {
        Dollars((self.estimated_price_low + self.estimated_price_high).0 / 2.0)
    }

    /// Midpoint of the per-square-foot range.
    pub fn price_per_sq_ft_mid(&self) -> Dollars {
        Dollars((self.price_per_sq_ft_low + self.price_per_sq_ft_high).0 / 2.0)
    }

    /// Whether this result can back a service line. Callers must check
    /// this before adding the job to an estimate or invoice.
    pub fn is_priceable(&self) -> bool {
        self.estimated_price_low.0 > 0.0 && self.square_footage.0 > 0.0
    }

    /// Build a flat-amount service line from the midpoint price, rounded
    /// to cents. The line records the inputs that priced it.
    pub fn flat_line(&self, description: impl Into<String>) -> ServiceLine {
        ServiceLine::new(description, 1.0, "job", self.price_mid().round_cents().0)
            .with_source(PricingItem::FoamLeveling(self.input.clone()))
    }

    /// Build an area-priced service line: square footage × midpoint $/sq ft.
    pub fn per_sqft_line(&self, description: impl Into<String>) -> ServiceLine {
        ServiceLine::new(
            description,
            self.square_footage.0,
            "sq ft",
            self.price_per_sq_ft_mid().0,
        )
        .with_source(PricingItem::FoamLeveling(self.input.clone()))
    }
}

/// Calculate the foam leveling price for a slab.
///
/// Pure and total: identical input produces identical output, every input
/// (including degenerate geometry) produces a well-formed result, and no
/// code path panics or returns an error.
pub fn calculate(input: &FoamLevelingInput) -> FoamLevelingResult {
    if !input.has_valid_geometry() {
        return FoamLevelingResult::zeroed(input);
    }

    let square_footage = SquareFeet(input.length_ft * input.width_ft);

    let wedge = wedge_multiplier(input.sides_settled);
    let void_volume_cu_ft = CubicFeet(square_footage.0 * (input.inches_settled / 12.0) * wedge);
    let void_volume_cu_yd: CubicYards = void_volume_cu_ft.into();

    let factor = input.foam_type.factor_lbs_per_cu_yd(input.application);
    let material_weight_lbs = Pounds(void_volume_cu_yd.0 * factor);

    let material_cost_low = Dollars(material_weight_lbs.0 * RATE_LOW_PER_LB);
    let material_cost_high = Dollars(material_weight_lbs.0 * RATE_HIGH_PER_LB);

    // The $/lb range embeds labor and margin, so material cost is the price.
    let estimated_price_low = material_cost_low;
    let estimated_price_high = material_cost_high;

    let (price_per_sq_ft_low, price_per_sq_ft_high) = if square_footage.0 > 0.0 {
        (
            Dollars(estimated_price_low.0 / square_footage.0),
            Dollars(estimated_price_high.0 / square_footage.0),
        )
    } else {
        (Dollars(0.0), Dollars(0.0))
    };

    FoamLevelingResult {
        square_footage,
        void_volume_cu_ft,
        void_volume_cu_yd,
        material_weight_lbs,
        material_cost_low,
        material_cost_high,
        estimated_price_low,
        estimated_price_high,
        price_per_sq_ft_low,
        price_per_sq_ft_high,
        input: input.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_input() -> FoamLevelingInput {
        FoamLevelingInput {
            length_ft: 10.0,
            width_ft: 20.0,
            inches_settled: 1.0,
            sides_settled: 1,
            foam_type: FoamType::Rr401,
            application: ApplicationType::Lift,
            ..FoamLevelingInput::default()
        }
    }

    #[test]
    fn test_square_footage_exact() {
        let result = calculate(&test_input());
        assert_eq!(result.square_footage, SquareFeet(200.0));
    }

    #[test]
    fn test_reference_scenario() {
        // 10x20 slab, 1" settled on one side, RR401 lift foam
        let result = calculate(&test_input());

        // wedge = 0.50, void = 200 * (1/12) * 0.5 = 8.333 ft³
        assert!((result.void_volume_cu_ft.0 - 8.3333).abs() < 0.001);
        assert!((result.void_volume_cu_yd.0 - 0.30864).abs() < 0.0001);

        // 120 lbs/yd³ for RR401 lift
        assert!((result.material_weight_lbs.0 - 37.037).abs() < 0.01);
        assert!((result.material_cost_low.0 - 370.37).abs() < 0.1);
        assert!((result.material_cost_high.0 - 555.56).abs() < 0.1);

        // Price equals material cost in this model
        assert_eq!(result.estimated_price_low, result.material_cost_low);
        assert_eq!(result.estimated_price_high, result.material_cost_high);
        assert!((result.price_mid().0 - 462.96).abs() < 0.5);
    }

    #[test]
    fn test_wedge_multiplier_table() {
        assert_eq!(wedge_multiplier(1), 0.50);
        assert_eq!(wedge_multiplier(2), 0.25);
        assert_eq!(wedge_multiplier(3), 1.00);
        // Out of range falls back to worst case
        assert_eq!(wedge_multiplier(0), 1.00);
        assert_eq!(wedge_multiplier(7), 1.00);
    }

    #[test]
    fn test_out_of_range_sides_matches_three() {
        let mut a = test_input();
        a.sides_settled = 3;
        let mut b = test_input();
        b.sides_settled = 9;
        assert_eq!(calculate(&a).estimated_price_low, calculate(&b).estimated_price_low);
        assert_eq!(calculate(&a).void_volume_cu_ft, calculate(&b).void_volume_cu_ft);
    }

    #[test]
    fn test_foam_factor_table() {
        assert_eq!(FoamType::Rr201.factor_lbs_per_cu_yd(ApplicationType::Lift), 100.0);
        assert_eq!(FoamType::Rr201.factor_lbs_per_cu_yd(ApplicationType::Void), 70.0);
        assert_eq!(FoamType::Rr401.factor_lbs_per_cu_yd(ApplicationType::Lift), 120.0);
        assert_eq!(FoamType::Rr401.factor_lbs_per_cu_yd(ApplicationType::Void), 110.0);
    }

    #[test]
    fn test_void_fill_uses_lower_factor() {
        let mut input = test_input();
        input.foam_type = FoamType::Rr201;
        input.application = ApplicationType::Void;
        let result = calculate(&input);
        // 0.30864 yd³ * 70 lbs/yd³
        assert!((result.material_weight_lbs.0 - 21.605).abs() < 0.01);
    }

    #[test]
    fn test_zero_length_is_sentinel() {
        let mut input = test_input();
        input.length_ft = 0.0;
        let result = calculate(&input);
        assert_eq!(result.estimated_price_low, Dollars(0.0));
        assert_eq!(result.estimated_price_high, Dollars(0.0));
        assert_eq!(result.material_weight_lbs, Pounds(0.0));
        assert!(result.square_footage.0 <= 0.0);
        assert!(!result.is_priceable());
        // Inputs are still echoed
        assert_eq!(result.input.width_ft, 20.0);
    }

    #[test]
    fn test_negative_width_is_sentinel() {
        let mut input = test_input();
        input.width_ft = -4.0;
        let result = calculate(&input);
        assert_eq!(result.estimated_price_low, Dollars(0.0));
        assert!(result.square_footage.0 <= 0.0);
    }

    #[test]
    fn test_non_finite_geometry_is_sentinel() {
        let mut input = test_input();
        input.length_ft = f64::NAN;
        let result = calculate(&input);
        assert_eq!(result.estimated_price_low, Dollars(0.0));
        assert_eq!(result.square_footage, SquareFeet(0.0));
    }

    #[test]
    fn test_low_never_exceeds_high() {
        for sides in 0..5u8 {
            for &foam in &FoamType::ALL {
                for &app in &ApplicationType::ALL {
                    let input = FoamLevelingInput {
                        length_ft: 7.5,
                        width_ft: 13.0,
                        inches_settled: 2.25,
                        sides_settled: sides,
                        foam_type: foam,
                        application: app,
                        ..FoamLevelingInput::default()
                    };
                    let result = calculate(&input);
                    assert!(result.estimated_price_low <= result.estimated_price_high);
                }
            }
        }
    }

    #[test]
    fn test_pure_and_deterministic() {
        let input = test_input();
        let a = calculate(&input);
        let b = calculate(&input);
        assert_eq!(a, b);
    }

    #[test]
    fn test_per_sqft_roundtrip() {
        let result = calculate(&test_input());
        assert!(
            (result.price_per_sq_ft_low.0 * result.square_footage.0
                - result.estimated_price_low.0)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_context_fields_do_not_move_price() {
        let base = calculate(&test_input());
        let mut input = test_input();
        input.soil_type = SoilType::Organic;
        input.weather = WeatherConditions::Hot;
        input.moisture = MoistureLevel::Wet;
        input.travel_distance_miles = 80.0;
        let shifted = calculate(&input);
        assert_eq!(base.estimated_price_low, shifted.estimated_price_low);
        assert_eq!(base.estimated_price_high, shifted.estimated_price_high);
    }

    #[test]
    fn test_unknown_enum_strings_fall_back() {
        assert_eq!(SoilType::from_str_flexible("loam"), SoilType::Mixed);
        assert_eq!(SoilType::from_str_flexible("Clay"), SoilType::Clay);
        assert_eq!(
            WeatherConditions::from_str_flexible("blizzard?"),
            WeatherConditions::Normal
        );
        assert_eq!(MoistureLevel::from_str_flexible("soggy"), MoistureLevel::Normal);
        assert_eq!(FoamType::from_str_flexible("RR-401"), FoamType::Rr401);
        assert_eq!(FoamType::from_str_flexible("mystery"), FoamType::Rr201);
        assert_eq!(
            ApplicationType::from_str_flexible("void fill"),
            ApplicationType::Void
        );
    }

    #[test]
    fn test_unknown_enum_json_falls_back() {
        let json = r#"{
            "length_ft": 10.0,
            "width_ft": 20.0,
            "soil_type": "volcanic",
            "weather": "apocalyptic"
        }"#;
        let input: FoamLevelingInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.soil_type, SoilType::Mixed);
        assert_eq!(input.weather, WeatherConditions::Normal);
        // Omitted fields take documented defaults
        assert_eq!(input.inches_settled, 1.0);
        assert_eq!(input.sides_settled, 1);
        assert_eq!(input.foam_type, FoamType::Rr201);
        assert_eq!(input.application, ApplicationType::Lift);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let input = test_input();
        let json = serde_json::to_string_pretty(&input).unwrap();
        assert!(json.contains("RR401"));
        let roundtrip: FoamLevelingInput = serde_json::from_str(&json).unwrap();
        assert_eq!(input, roundtrip);
    }

    #[test]
    fn test_service_line_construction() {
        let result = calculate(&test_input());

        let flat = result.flat_line("Lift garage slab");
        assert_eq!(flat.quantity, 1.0);
        assert_eq!(flat.amount, result.price_mid().round_cents().0);
        assert!(matches!(flat.source, Some(PricingItem::FoamLeveling(_))));

        let per_area = result.per_sqft_line("Lift garage slab");
        assert_eq!(per_area.quantity, result.square_footage.0);
        assert!((per_area.amount - result.price_mid().0).abs() < 1e-6);
    }
}
