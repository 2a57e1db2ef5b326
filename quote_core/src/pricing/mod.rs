//! # Pricing Calculators
//!
//! Each calculator follows the same pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` - Derived price snapshot (JSON-serializable)
//! - `calculate(&input) -> *Result` - Pure, total calculation function
//!
//! The calculators never return errors and never panic: degenerate input
//! produces a zeroed result, and the caller decides whether the result can
//! back a service line (`is_priceable()`). Invalid user input is a "cannot
//! price yet" state, not a failure.
//!
//! ## Available Calculators
//!
//! - [`foam`] - Polyurethane foam leveling (material-volume model, canonical)
//! - [`masonry`] - Masonry repair flat pricing
//! - [`concrete`] - Traditional per-square-foot concrete pricing

pub mod concrete;
pub mod foam;
pub mod masonry;

use serde::{Deserialize, Serialize};

use crate::document::ServiceLine;

// Re-export commonly used types
pub use concrete::{ConcreteInput, ConcreteResult};
pub use foam::{FoamLevelingInput, FoamLevelingResult};
pub use masonry::{MasonryInput, MasonryResult};

/// Enum wrapper for all pricing inputs.
///
/// Lets a stored job carry whichever calculator produced its price while
/// keeping serialization tagged and type-safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PricingItem {
    /// Foam-injection leveling job
    FoamLeveling(FoamLevelingInput),
    /// Masonry repair job
    Masonry(MasonryInput),
    /// Area-priced concrete job
    Concrete(ConcreteInput),
}

impl PricingItem {
    /// Get the calculator type as a string
    pub fn calc_type(&self) -> &'static str {
        match self {
            PricingItem::FoamLeveling(_) => "FoamLeveling",
            PricingItem::Masonry(_) => "Masonry",
            PricingItem::Concrete(_) => "Concrete",
        }
    }

    /// Run the matching calculator and return the total midpoint price.
    ///
    /// Zero means the item cannot be priced with its current inputs.
    pub fn price_mid(&self) -> f64 {
        match self {
            PricingItem::FoamLeveling(input) => foam::calculate(input).price_mid().0,
            PricingItem::Masonry(input) => masonry::calculate(input).total,
            PricingItem::Concrete(input) => concrete::calculate(input).total,
        }
    }

    /// Run the matching calculator and build a service line from the
    /// result, recording this item as the line's source. Returns `None`
    /// when the item cannot be priced with its current inputs.
    pub fn to_line(&self, description: impl Into<String>) -> Option<ServiceLine> {
        match self {
            PricingItem::FoamLeveling(input) => {
                let result = foam::calculate(input);
                result.is_priceable().then(|| result.flat_line(description))
            }
            PricingItem::Masonry(input) => {
                let result = masonry::calculate(input);
                result.is_priceable().then(|| {
                    ServiceLine::new(
                        description,
                        input.quantity,
                        result.unit.clone(),
                        result.unit_rate,
                    )
                    .with_source(self.clone())
                })
            }
            PricingItem::Concrete(input) => {
                let result = concrete::calculate(input);
                result.is_priceable().then(|| {
                    ServiceLine::new(
                        description,
                        input.square_footage,
                        "sq ft",
                        result.rate_per_sq_ft,
                    )
                    .with_source(self.clone())
                })
            }
        }
    }
}
