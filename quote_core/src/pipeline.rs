//! # Save Pipeline
//!
//! Saving a document runs an explicit, ordered sequence of stages:
//!
//! ```text
//! validate -> assign number -> persist -> notify
//! ```
//!
//! Behavior is extended by appending stages to the pipeline, never by
//! reassigning or wrapping the save function itself. Each stage is a
//! [`SaveStage`]; the first failing stage aborts the save and its error is
//! returned unchanged.
//!
//! The whole run holds the store lock, so number assignment and the
//! document write are covered by one critical section.
//!
//! ## Example
//!
//! ```rust,no_run
//! use quote_core::document::{CustomerInfo, Document, ServiceLine};
//! use quote_core::pipeline::SavePipeline;
//! use quote_core::store::DocumentStore;
//!
//! let store = DocumentStore::open("quotes")?;
//! let mut doc = Document::new_estimate(CustomerInfo::named("Pat Mason"));
//! doc.add_line(ServiceLine::new("Lift garage slab", 1.0, "job", 463.0));
//!
//! SavePipeline::standard().run(&mut doc, &store)?;
//! assert!(doc.meta.number.is_some());
//! # Ok::<(), quote_core::errors::QuoteError>(())
//! ```

use tracing::{debug, info};

use crate::document::Document;
use crate::errors::QuoteResult;
use crate::store::DocumentStore;

/// One step of the save pipeline.
pub trait SaveStage {
    /// Stage name for logging
    fn name(&self) -> &'static str;

    /// Apply this stage. Returning an error aborts the pipeline.
    fn apply(&self, doc: &mut Document, store: &DocumentStore) -> QuoteResult<()>;
}

/// Reject documents that are not fit to persist.
pub struct Validate;

impl SaveStage for Validate {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn apply(&self, doc: &mut Document, _store: &DocumentStore) -> QuoteResult<()> {
        doc.validate()
    }
}

/// Assign a human-readable number on first save. Already-numbered
/// documents pass through unchanged.
pub struct AssignNumber;

impl SaveStage for AssignNumber {
    fn name(&self) -> &'static str {
        "assign-number"
    }

    fn apply(&self, doc: &mut Document, store: &DocumentStore) -> QuoteResult<()> {
        if doc.meta.number.is_none() {
            let number = store.next_number(doc.meta.kind)?;
            doc.meta.number = Some(number);
        }
        Ok(())
    }
}

/// Write the document to the store with atomic semantics.
pub struct Persist;

impl SaveStage for Persist {
    fn name(&self) -> &'static str {
        "persist"
    }

    fn apply(&self, doc: &mut Document, store: &DocumentStore) -> QuoteResult<()> {
        doc.touch();
        store.save_document(doc)
    }
}

/// Emit a structured event once the document is durably saved.
pub struct Notify;

impl SaveStage for Notify {
    fn name(&self) -> &'static str {
        "notify"
    }

    fn apply(&self, doc: &mut Document, _store: &DocumentStore) -> QuoteResult<()> {
        info!(
            number = doc.number_or_draft(),
            kind = %doc.meta.kind,
            lines = doc.line_count(),
            subtotal = doc.subtotal(),
            "save pipeline complete"
        );
        Ok(())
    }
}

/// Ordered save pipeline.
pub struct SavePipeline {
    stages: Vec<Box<dyn SaveStage>>,
    user_id: String,
}

impl SavePipeline {
    /// The stock pipeline: validate, assign-number, persist, notify.
    pub fn standard() -> Self {
        SavePipeline {
            stages: vec![
                Box::new(Validate),
                Box::new(AssignNumber),
                Box::new(Persist),
                Box::new(Notify),
            ],
            user_id: "local".to_string(),
        }
    }

    /// An empty pipeline, for building a custom stage order.
    pub fn empty() -> Self {
        SavePipeline {
            stages: Vec::new(),
            user_id: "local".to_string(),
        }
    }

    /// Identify the user for the store lock.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Append a stage after the existing ones.
    pub fn with_stage(mut self, stage: Box<dyn SaveStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Run every stage in order under the store lock.
    pub fn run(&self, doc: &mut Document, store: &DocumentStore) -> QuoteResult<()> {
        let _lock = store.lock(self.user_id.clone())?;
        for stage in &self.stages {
            debug!(stage = stage.name(), "running save stage");
            stage.apply(doc, store)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CustomerInfo, DocumentKind, ServiceLine};
    use std::fs;

    fn temp_store(name: &str) -> DocumentStore {
        let dir = std::env::temp_dir().join(format!(
            "quote_pipeline_test_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        DocumentStore::open(&dir).unwrap()
    }

    fn draft_estimate() -> Document {
        let mut doc = Document::new_estimate(CustomerInfo::named("Pat Mason"));
        doc.add_line(ServiceLine::new("Lift garage slab", 1.0, "job", 463.0));
        doc
    }

    #[test]
    fn test_standard_pipeline_assigns_and_persists() {
        let store = temp_store("standard");
        let mut doc = draft_estimate();

        SavePipeline::standard().run(&mut doc, &store).unwrap();

        assert_eq!(doc.meta.number.as_deref(), Some("EST-0001"));
        let loaded = store.load("EST-0001").unwrap();
        assert_eq!(loaded.customer.name, "Pat Mason");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_resave_keeps_number() {
        let store = temp_store("resave");
        let mut doc = draft_estimate();
        let pipeline = SavePipeline::standard();

        pipeline.run(&mut doc, &store).unwrap();
        doc.add_line(ServiceLine::new("Crack repair", 6.0, "ln ft", 18.0));
        pipeline.run(&mut doc, &store).unwrap();

        assert_eq!(doc.meta.number.as_deref(), Some("EST-0001"));
        let loaded = store.load("EST-0001").unwrap();
        assert_eq!(loaded.line_count(), 2);
        // The sequence was not consumed twice
        assert_eq!(store.next_number(DocumentKind::Estimate).unwrap(), "EST-0002");

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_validation_failure_aborts_before_numbering() {
        let store = temp_store("invalid");
        let mut doc = Document::new_estimate(CustomerInfo::named("Pat")); // no lines

        let err = SavePipeline::standard().run(&mut doc, &store).unwrap_err();
        assert_eq!(err.error_code(), "DOCUMENT_INVALID");
        assert!(doc.meta.number.is_none());
        assert!(store.list().unwrap().is_empty());

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_custom_stage_runs_after_standard() {
        struct MarkSent;
        impl SaveStage for MarkSent {
            fn name(&self) -> &'static str {
                "mark-sent"
            }
            fn apply(&self, doc: &mut Document, _store: &DocumentStore) -> QuoteResult<()> {
                doc.status = crate::document::DocumentStatus::Sent;
                Ok(())
            }
        }

        let store = temp_store("custom");
        let mut doc = draft_estimate();

        SavePipeline::standard()
            .with_stage(Box::new(MarkSent))
            .run(&mut doc, &store)
            .unwrap();

        assert_eq!(doc.status, crate::document::DocumentStatus::Sent);

        let _ = fs::remove_dir_all(store.root());
    }

    #[test]
    fn test_lock_released_after_run() {
        let store = temp_store("lockrel");
        let mut doc = draft_estimate();

        SavePipeline::standard().run(&mut doc, &store).unwrap();
        // The lock is dropped with the run, so a second lock succeeds
        assert!(store.lock("second@user").is_ok());

        let _ = fs::remove_dir_all(store.root());
    }
}
