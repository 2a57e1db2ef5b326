//! # Money and Quantity Types
//!
//! Lightweight newtype wrappers for the units that move through pricing
//! and documents. Simple f64 wrappers are used instead of a units library:
//! the unit set is small and fixed, JSON serialization stays plain numbers,
//! and there is no runtime overhead.
//!
//! ## Units
//!
//! - Money: dollars (USD)
//! - Plan area: square feet
//! - Volume: cubic feet, cubic yards (1 yd³ = 27 ft³)
//! - Material mass: pounds
//!
//! ## Example
//!
//! ```rust
//! use quote_core::money::{CubicFeet, CubicYards, Dollars};
//!
//! let void = CubicFeet(8.333);
//! let yards: CubicYards = void.into();
//! assert!((yards.0 - 0.3086).abs() < 0.001);
//!
//! assert_eq!(Dollars(1234.5).to_string(), "$1,234.50");
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Add;

/// US dollars
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dollars(pub f64);

impl Dollars {
    /// Round to whole cents (banker-free, ties away handled by f64 round)
    pub fn round_cents(self) -> Dollars {
        Dollars((self.0 * 100.0).round() / 100.0)
    }
}

impl Add for Dollars {
    type Output = Dollars;
    fn add(self, rhs: Dollars) -> Dollars {
        Dollars(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Dollars {
    /// Currency formatting for presentation: `$1,234.50`, `-$42.00`
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cents = (self.0.abs() * 100.0).round() as u64;
        let whole = cents / 100;
        let frac = cents % 100;
        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0.0 && cents > 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, grouped, frac)
    }
}

/// Plan area in square feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareFeet(pub f64);

/// Volume in cubic feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicFeet(pub f64);

/// Volume in cubic yards
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubicYards(pub f64);

impl From<CubicFeet> for CubicYards {
    fn from(cf: CubicFeet) -> Self {
        CubicYards(cf.0 / 27.0)
    }
}

impl From<CubicYards> for CubicFeet {
    fn from(cy: CubicYards) -> Self {
        CubicFeet(cy.0 * 27.0)
    }
}

/// Material mass in pounds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pounds(pub f64);
