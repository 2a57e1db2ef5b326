//! # Document Data Structures
//!
//! `Document` is the root container for an estimate or invoice. Documents
//! serialize to human-readable JSON in the store directory.
//!
//! ## Structure
//!
//! ```text
//! Document
//! ├── meta: DocumentMetadata (version, id, kind, number, timestamps)
//! ├── customer: CustomerInfo
//! ├── status: DocumentStatus
//! ├── lines: Vec<ServiceLine> (ordered as presented)
//! └── notes
//! ```
//!
//! The document kind (estimate vs invoice) is an explicit value carried in
//! the metadata and threaded through every operation. Nothing infers the
//! kind from ambient state.
//!
//! ## Example
//!
//! ```rust
//! use quote_core::document::{CustomerInfo, Document, DocumentKind, ServiceLine};
//!
//! let mut doc = Document::new(DocumentKind::Estimate, CustomerInfo::named("Pat Mason"));
//! doc.add_line(ServiceLine::new("Lift garage slab", 1.0, "job", 463.0));
//! assert_eq!(doc.subtotal(), 463.0);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{QuoteError, QuoteResult};
use crate::pricing::PricingItem;

/// Current schema version for stored documents
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Estimate or invoice. Determines the number prefix and the lifecycle
/// statuses that make sense for the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Estimate,
    Invoice,
}

impl DocumentKind {
    /// Prefix used in human-readable document numbers
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => "EST",
            DocumentKind::Invoice => "INV",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Estimate => "Estimate",
            DocumentKind::Invoice => "Invoice",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lifecycle status. Accepted/Declined apply to estimates, Paid to invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
    Paid,
}

/// Who the work is for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl CustomerInfo {
    /// Customer with just a name; contact fields can be filled in later.
    pub fn named(name: impl Into<String>) -> Self {
        CustomerInfo {
            name: name.into(),
            ..CustomerInfo::default()
        }
    }
}

/// One line of work on a document: `amount = quantity * rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLine {
    /// Stable id for addressing the line after reordering
    pub id: Uuid,

    /// What the line is for (e.g., "Lift garage slab, 10x20")
    pub description: String,

    /// Quantity in `unit`s
    pub quantity: f64,

    /// Unit of the quantity ("job", "sq ft", "ln ft", "brick", ...)
    pub unit: String,

    /// Price per unit in dollars
    pub rate: f64,

    /// Extended amount in dollars; maintained as quantity * rate
    pub amount: f64,

    /// The calculator inputs that priced this line, when it came from a
    /// calculator rather than being entered by hand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PricingItem>,
}

impl ServiceLine {
    /// Create a line with the amount computed from quantity and rate.
    pub fn new(
        description: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        rate: f64,
    ) -> Self {
        ServiceLine {
            id: Uuid::new_v4(),
            description: description.into(),
            quantity,
            unit: unit.into(),
            rate,
            amount: quantity * rate,
            source: None,
        }
    }

    /// Record the calculator inputs this line was priced from.
    pub fn with_source(mut self, source: PricingItem) -> Self {
        self.source = Some(source);
        self
    }

    /// Change the quantity, keeping the amount consistent.
    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
        self.amount = self.quantity * self.rate;
    }

    /// Change the rate, keeping the amount consistent.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
        self.amount = self.quantity * self.rate;
    }
}

/// Document metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Stable internal identifier
    pub id: Uuid,

    /// Estimate or invoice
    pub kind: DocumentKind,

    /// Human-readable number (`EST-0001`, `INV-0001`), assigned by the
    /// store on first save. `None` for unsaved drafts.
    pub number: Option<String>,

    /// When the document was created
    pub created: DateTime<Utc>,

    /// When the document was last modified
    pub modified: DateTime<Utc>,
}

/// Root container for an estimate or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub meta: DocumentMetadata,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub lines: Vec<ServiceLine>,
    #[serde(default)]
    pub notes: String,
}

impl Document {
    /// Create a new empty draft of the given kind.
    pub fn new(kind: DocumentKind, customer: CustomerInfo) -> Self {
        let now = Utc::now();
        Document {
            meta: DocumentMetadata {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                kind,
                number: None,
                created: now,
                modified: now,
            },
            customer,
            status: DocumentStatus::Draft,
            lines: Vec::new(),
            notes: String::new(),
        }
    }

    /// Convenience constructor for an estimate.
    pub fn new_estimate(customer: CustomerInfo) -> Self {
        Document::new(DocumentKind::Estimate, customer)
    }

    /// Convenience constructor for an invoice.
    pub fn new_invoice(customer: CustomerInfo) -> Self {
        Document::new(DocumentKind::Invoice, customer)
    }

    /// Append a service line. Returns the line's id.
    pub fn add_line(&mut self, line: ServiceLine) -> Uuid {
        let id = line.id;
        self.lines.push(line);
        self.touch();
        id
    }

    /// Price a calculator item into a service line and append it. The line
    /// records the item that produced it (see [`ServiceLine::source`]).
    /// Returns `None` when the item cannot be priced with its current inputs.
    pub fn add_priced_item(
        &mut self,
        item: PricingItem,
        description: impl Into<String>,
    ) -> Option<Uuid> {
        let line = item.to_line(description)?;
        Some(self.add_line(line))
    }

    /// Remove a service line by id. Returns the removed line if it existed.
    pub fn remove_line(&mut self, id: &Uuid) -> Option<ServiceLine> {
        let pos = self.lines.iter().position(|l| &l.id == id)?;
        let line = self.lines.remove(pos);
        self.touch();
        Some(line)
    }

    /// Get a service line by id.
    pub fn get_line(&self, id: &Uuid) -> Option<&ServiceLine> {
        self.lines.iter().find(|l| &l.id == id)
    }

    /// Mutate a service line in place via a closure. The modified timestamp
    /// is updated if the line exists.
    pub fn update_line<F>(&mut self, id: &Uuid, f: F) -> bool
    where
        F: FnOnce(&mut ServiceLine),
    {
        if let Some(line) = self.lines.iter_mut().find(|l| &l.id == id) {
            f(line);
            self.meta.modified = Utc::now();
            true
        } else {
            false
        }
    }

    /// Sum of all line amounts in dollars.
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// The assigned number, or a draft placeholder for display.
    pub fn number_or_draft(&self) -> &str {
        self.meta.number.as_deref().unwrap_or("(draft)")
    }

    /// Check that the document is fit to persist: a named customer, at
    /// least one line, and finite line math.
    pub fn validate(&self) -> QuoteResult<()> {
        if self.customer.name.trim().is_empty() {
            return Err(QuoteError::missing_field("customer.name"));
        }
        if self.lines.is_empty() {
            return Err(QuoteError::document_invalid(
                "Document has no service lines",
            ));
        }
        for line in &self.lines {
            if line.description.trim().is_empty() {
                return Err(QuoteError::missing_field("line.description"));
            }
            if !line.quantity.is_finite() || !line.rate.is_finite() || !line.amount.is_finite() {
                return Err(QuoteError::invalid_input(
                    "line",
                    line.description.clone(),
                    "Quantity, rate, and amount must be finite numbers",
                ));
            }
        }
        Ok(())
    }

    /// Convert an accepted estimate into a fresh draft invoice carrying the
    /// same customer, lines, and notes. The invoice gets its own id, no
    /// number (assigned at save), and new timestamps.
    pub fn to_invoice(&self) -> Document {
        let mut invoice = Document::new(DocumentKind::Invoice, self.customer.clone());
        invoice.lines = self.lines.clone();
        invoice.notes = self.notes.clone();
        invoice
    }
}
