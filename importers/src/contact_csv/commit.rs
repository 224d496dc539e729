use super::transform::TransformOutcome;
use crate::error::ImportError;
use shared_types::{CreateContactRequest, ImportResult};
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Contact rejected: {0}")]
    Rejected(String),
}

/// What the store did with one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    /// Drafts the store considered already present
    pub duplicates: usize,
}

/// Persistence seam for imported contacts.
///
/// A batch is all-or-nothing: on `Err` the store must not have kept any of it.
pub trait ContactStore {
    fn insert_batch(&mut self, drafts: &[CreateContactRequest]) -> Result<BatchOutcome, StoreError>;
}

/// Writes the transformed rows as one batch and builds the import summary.
///
/// Row errors are carried over in row order. `skipped_count` counts rows
/// dropped by the transformer plus drafts the store reported as duplicates.
pub fn commit(
    store: &mut dyn ContactStore,
    outcome: TransformOutcome,
    total_rows: usize,
) -> Result<ImportResult, ImportError> {
    let batch = if outcome.drafts.is_empty() {
        BatchOutcome::default()
    } else {
        store.insert_batch(&outcome.drafts)?
    };

    Ok(ImportResult {
        success: true,
        imported_count: batch.inserted,
        skipped_count: outcome.skipped + batch.duplicates,
        total_rows,
        errors: outcome.errors.iter().map(ToString::to_string).collect(),
    })
}

/// In-memory store used by tests and dry runs. Emails are compared case-insensitively.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contacts: Vec<CreateContactRequest>,
}

/// Key two emails collide on. Folds ASCII case only, matching SQLite's
/// `COLLATE NOCASE`; `None` for an empty email, which never collides.
pub fn email_key(email: &str) -> Option<String> {
    let email = email.trim();
    (!email.is_empty()).then(|| email.to_ascii_lowercase())
}

impl MemoryStore {
    pub fn contacts(&self) -> &[CreateContactRequest] {
        &self.contacts
    }
}

impl ContactStore for MemoryStore {
    fn insert_batch(&mut self, drafts: &[CreateContactRequest]) -> Result<BatchOutcome, StoreError> {
        let mut emails: HashSet<String> = self
            .contacts
            .iter()
            .filter_map(|c| email_key(&c.email))
            .collect();

        let mut outcome = BatchOutcome::default();
        for draft in drafts {
            if email_key(&draft.email).is_some_and(|key| !emails.insert(key)) {
                outcome.duplicates += 1;
                continue;
            }
            self.contacts.push(draft.clone());
            outcome.inserted += 1;
        }

        Ok(outcome)
    }
}
