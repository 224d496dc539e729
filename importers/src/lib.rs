//! Importers Crate
//!
//! Pure, storage-agnostic pipeline for bringing contacts in from CSV files and
//! for moving contact data between the flat edit form and the stored shape.
//!
//! # Architecture
//!
//! - **Types**: wire and domain types are defined in the `shared-types` crate
//! - **Pipeline**: tokenizer -> classifier -> mapping resolver -> row transformer -> committer
//! - **Storage**: the committer writes through the [`ContactStore`] trait, implemented by the API
//!
//! # Example
//!
//! ```rust,ignore
//! use importers::{ContactCsvImporter, MemoryStore};
//!
//! let importer = ContactCsvImporter::new();
//! let mut store = MemoryStore::default();
//! let result = importer.import(csv_text, &overrides, &definitions, &mut store)?;
//! ```

pub mod contact_csv;
pub mod custom_fields;
pub mod error;
pub mod wizard;

// Re-export commonly used types
pub use contact_csv::{
    email_key, BatchOutcome, ColumnAnalysis, ColumnClassification, ContactCsvImporter, ContactStore,
    CsvTable, CsvTokenizer, MemoryStore, ResolvedColumn, ResolvedMapping, RowError,
    RowTransformer, StoreError, TransformOutcome,
};
pub use custom_fields::{merge, split, EditForm, OrphanPolicy};
pub use error::ImportError;
pub use wizard::{ImportWizard, WizardError, WizardPolicy, WizardStep};
