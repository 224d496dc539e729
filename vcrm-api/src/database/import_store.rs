use crate::database::contacts::{email_exists_in, insert_contact_in};
use importers::{email_key, BatchOutcome, ContactStore, StoreError};
use rusqlite::Connection;
use shared_types::CreateContactRequest;
use std::collections::HashSet;

/// Writes an import batch in a single transaction.
///
/// A contact whose non-empty email is already stored, or appeared earlier in
/// the same batch, is counted as a duplicate and not written.
pub struct SqliteContactStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteContactStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl ContactStore for SqliteContactStore<'_> {
    fn insert_batch(&mut self, drafts: &[CreateContactRequest]) -> Result<BatchOutcome, StoreError> {
        let backend = |e: &dyn std::fmt::Display| StoreError::Backend(e.to_string());

        let tx = self.conn.unchecked_transaction().map_err(|e| backend(&e))?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut outcome = BatchOutcome::default();

        for draft in drafts {
            if let Some(key) = email_key(&draft.email) {
                let stored = email_exists_in(&tx, &key, None).map_err(|e| backend(&e))?;
                if stored || !seen.insert(key) {
                    outcome.duplicates += 1;
                    continue;
                }
            }

            insert_contact_in(&tx, draft).map_err(|e| backend(&e))?;
            outcome.inserted += 1;
        }

        tx.commit().map_err(|e| backend(&e))?;

        tracing::debug!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "Committed contact import batch"
        );

        Ok(outcome)
    }
}
