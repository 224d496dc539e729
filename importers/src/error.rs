use crate::contact_csv::StoreError;
use crate::wizard::WizardError;

/// Import error types
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV file is empty")]
    EmptyInput,

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV has {rows} data rows, the limit is {limit}")]
    TooManyRows { rows: usize, limit: usize },

    #[error("Import failed, nothing was saved: {0}")]
    Commit(#[from] StoreError),

    #[error(transparent)]
    Wizard(#[from] WizardError),
}
