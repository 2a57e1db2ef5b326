//! # CSV Export
//!
//! Renders a document's service lines as CSV for spreadsheets and
//! bookkeeping imports: one header row, one row per line, and a totals
//! row. Fields containing commas, quotes, or newlines are quoted per
//! RFC 4180.

use std::path::Path;

use crate::document::Document;
use crate::errors::{QuoteError, QuoteResult};

/// Quote a field when it needs it (comma, quote, or newline inside).
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a document's line items as CSV text.
pub fn document_to_csv(doc: &Document) -> String {
    let mut out = String::new();

    out.push_str("number,kind,customer,description,quantity,unit,rate,amount\n");

    let number = doc.number_or_draft();
    let kind = doc.meta.kind.display_name();
    for line in &doc.lines {
        out.push_str(&format!(
            "{},{},{},{},{},{},{:.2},{:.2}\n",
            escape_field(number),
            kind,
            escape_field(&doc.customer.name),
            escape_field(&line.description),
            line.quantity,
            escape_field(&line.unit),
            line.rate,
            line.amount,
        ));
    }

    out.push_str(&format!(
        "{},{},{},Total,,,,{:.2}\n",
        escape_field(number),
        kind,
        escape_field(&doc.customer.name),
        doc.subtotal(),
    ));

    out
}

/// Write a document's CSV rendering to a file.
pub fn write_csv(doc: &Document, path: &Path) -> QuoteResult<()> {
    std::fs::write(path, document_to_csv(doc)).map_err(|e| {
        QuoteError::file_error("write csv", path.display().to_string(), e.to_string())
    })
}
