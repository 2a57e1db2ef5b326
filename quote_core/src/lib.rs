//! # quote_core - Estimating & Invoicing Engine
//!
//! `quote_core` is the computational heart of LevelQuote, an estimating and
//! invoicing tool for a concrete-leveling and masonry contractor. Pricing
//! is a set of pure functions over JSON-serializable inputs; documents and
//! persistence sit cleanly on top.
//!
//! ## Design Philosophy
//!
//! - **Total calculators**: pricing never errors; degenerate input yields a
//!   zeroed result the caller can detect
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Explicit context**: estimate vs invoice is a value threaded through
//!   every call, never inferred from ambient state
//! - **Composed saves**: the save path is an ordered stage pipeline, not a
//!   patched function
//!
//! ## Quick Start
//!
//! ```rust
//! use quote_core::pricing::foam::{calculate, FoamLevelingInput};
//!
//! let result = calculate(&FoamLevelingInput::new(10.0, 20.0));
//! if result.is_priceable() {
//!     println!("{:.0} - {:.0}", result.estimated_price_low, result.estimated_price_high);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - Foam leveling, masonry, and concrete calculators
//! - [`document`] - Estimates and invoices holding service line items
//! - [`pipeline`] - Ordered save stages (validate, number, persist, notify)
//! - [`store`] - Directory-backed persistence with atomic saves and locking
//! - [`export`] - CSV rendering of documents
//! - [`money`] - Money and quantity newtypes
//! - [`errors`] - Structured error types

pub mod document;
pub mod errors;
pub mod export;
pub mod money;
pub mod pipeline;
pub mod pricing;
pub mod store;

// Re-export commonly used types at crate root for convenience
pub use document::{CustomerInfo, Document, DocumentKind, ServiceLine};
pub use errors::{QuoteError, QuoteResult};
pub use pipeline::SavePipeline;
pub use pricing::PricingItem;
pub use store::{DocumentStore, StoreLock};
