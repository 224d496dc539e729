mod classifier;
mod commit;
mod mapping;
mod tokenizer;
mod transform;

pub use classifier::{auto_map, classify, lookup_alias, ColumnClassification, KnownHeader};
pub use commit::{commit, email_key, BatchOutcome, ContactStore, MemoryStore, StoreError};
pub use mapping::{resolve, ResolvedColumn, ResolvedMapping};
pub use tokenizer::{CsvTable, CsvTokenizer};
pub use transform::{split_full_name, RowError, RowTransformer, TransformOutcome};

use crate::error::ImportError;
use shared_types::{CsvColumnMapping, CustomFieldDefinition, ImportResult};

/// A parsed file together with what the classifier made of its headers
#[derive(Debug, Clone)]
pub struct ColumnAnalysis {
    pub table: CsvTable,
    pub classification: ColumnClassification,
    pub suggested: CsvColumnMapping,
}

impl ColumnAnalysis {
    pub fn total_rows(&self) -> usize {
        self.table.total_rows()
    }
}

pub struct ContactCsvImporter {
    tokenizer: CsvTokenizer,
    max_rows: Option<usize>,
}

impl ContactCsvImporter {
    pub fn new() -> Self {
        Self {
            tokenizer: CsvTokenizer::new(),
            max_rows: None,
        }
    }

    /// Rejects files with more data rows than `limit`
    pub fn with_max_rows(mut self, limit: usize) -> Self {
        self.max_rows = Some(limit);
        self
    }

    pub fn analyze(&self, content: &str) -> Result<ColumnAnalysis, ImportError> {
        let table = self.tokenizer.tokenize(content)?;

        if let Some(limit) = self.max_rows {
            if table.total_rows() > limit {
                return Err(ImportError::TooManyRows {
                    rows: table.total_rows(),
                    limit,
                });
            }
        }

        let classification = classify(&table.headers);
        let suggested = classification.suggested_mapping();

        Ok(ColumnAnalysis {
            table,
            classification,
            suggested,
        })
    }

    /// Applies user overrides on top of the classifier's guesses and drops
    /// custom targets that have no definition
    pub fn resolve(
        &self,
        analysis: &ColumnAnalysis,
        overrides: &CsvColumnMapping,
        definitions: &[CustomFieldDefinition],
    ) -> ResolvedMapping {
        let mut mapping = resolve(
            &analysis.table.headers,
            &analysis.classification.default_mapping(),
            &analysis.classification.auto_mapping(),
            overrides,
        );
        mapping.sanitize(definitions);
        mapping
    }

    pub fn import(
        &self,
        content: &str,
        overrides: &CsvColumnMapping,
        definitions: &[CustomFieldDefinition],
        store: &mut dyn ContactStore,
    ) -> Result<ImportResult, ImportError> {
        let analysis = self.analyze(content)?;
        self.import_analyzed(&analysis, overrides, definitions, store)
    }

    pub fn import_analyzed(
        &self,
        analysis: &ColumnAnalysis,
        overrides: &CsvColumnMapping,
        definitions: &[CustomFieldDefinition],
        store: &mut dyn ContactStore,
    ) -> Result<ImportResult, ImportError> {
        let mapping = self.resolve(analysis, overrides, definitions);
        let outcome = RowTransformer::new(&mapping, definitions).transform_all(&analysis.table);
        let result = commit(store, outcome, analysis.total_rows())?;

        tracing::info!(
            total_rows = result.total_rows,
            imported = result.imported_count,
            skipped = result.skipped_count,
            "CSV import finished"
        );

        Ok(result)
    }
}

impl Default for ContactCsvImporter {
    fn default() -> Self {
        Self::new()
    }
}
