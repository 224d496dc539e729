use crate::contact_csv::ColumnClassification;
use serde::{Deserialize, Serialize};
use shared_types::ImportResult;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Upload,
    Mapping,
    Importing,
    Complete,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Upload => "upload",
            WizardStep::Mapping => "mapping",
            WizardStep::Importing => "importing",
            WizardStep::Complete => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Cannot {event} while in the {from} step")]
    InvalidTransition { from: WizardStep, event: &'static str },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardPolicy {
    /// Skip the mapping step when every header is recognised
    #[serde(default)]
    pub auto_import_when_all_known: bool,
}

/// Upload -> Mapping -> Importing -> Complete, with failures going back to Mapping
#[derive(Debug, Clone)]
pub struct ImportWizard {
    step: WizardStep,
    policy: WizardPolicy,
    classification: Option<ColumnClassification>,
    result: Option<ImportResult>,
    last_error: Option<String>,
}

impl ImportWizard {
    pub fn new(policy: WizardPolicy) -> Self {
        Self {
            step: WizardStep::Upload,
            policy,
            classification: None,
            result: None,
            last_error: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn classification(&self) -> Option<&ColumnClassification> {
        self.classification.as_ref()
    }

    pub fn result(&self) -> Option<&ImportResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn expect_step(&self, expected: WizardStep, event: &'static str) -> Result<(), WizardError> {
        if self.step != expected {
            return Err(WizardError::InvalidTransition {
                from: self.step,
                event,
            });
        }
        Ok(())
    }

    fn enter(&mut self, step: WizardStep) {
        tracing::debug!(from = %self.step, to = %step, "Import wizard transition");
        self.step = step;
    }

    pub fn file_parsed(&mut self, classification: ColumnClassification) -> Result<WizardStep, WizardError> {
        self.expect_step(WizardStep::Upload, "parse a file")?;

        let next = if self.policy.auto_import_when_all_known && classification.all_known() {
            WizardStep::Importing
        } else {
            WizardStep::Mapping
        };

        self.classification = Some(classification);
        self.last_error = None;
        self.enter(next);
        Ok(next)
    }

    pub fn start_import(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Mapping, "start an import")?;
        self.last_error = None;
        self.enter(WizardStep::Importing);
        Ok(())
    }

    pub fn import_succeeded(&mut self, result: ImportResult) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Importing, "finish an import")?;
        self.result = Some(result);
        self.enter(WizardStep::Complete);
        Ok(())
    }

    /// Returns to the mapping step so the user can adjust and retry
    pub fn import_failed(&mut self, error: impl fmt::Display) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Importing, "fail an import")?;
        self.last_error = Some(error.to_string());
        self.enter(WizardStep::Mapping);
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.policy);
    }
}

impl Default for ImportWizard {
    fn default() -> Self {
        Self::new(WizardPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact_csv::classify;

    fn classification(headers: &[&str]) -> ColumnClassification {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        classify(&headers)
    }

    #[test]
    fn test_default_flow_always_shows_mapping() {
        let mut wizard = ImportWizard::default();
        let next = wizard.file_parsed(classification(&["First Name", "Email"])).unwrap();
        assert_eq!(next, WizardStep::Mapping);

        wizard.start_import().unwrap();
        wizard
            .import_succeeded(ImportResult {
                success: true,
                imported_count: 1,
                total_rows: 1,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(wizard.step(), WizardStep::Complete);
        assert_eq!(wizard.result().map(|r| r.imported_count), Some(1));
    }

    #[test]
    fn test_auto_import_when_all_headers_known() {
        let policy = WizardPolicy {
            auto_import_when_all_known: true,
        };

        let mut wizard = ImportWizard::new(policy);
        let next = wizard.file_parsed(classification(&["First Name", "Email"])).unwrap();
        assert_eq!(next, WizardStep::Importing);

        let mut wizard = ImportWizard::new(policy);
        let next = wizard.file_parsed(classification(&["First Name", "Shoe Size"])).unwrap();
        assert_eq!(next, WizardStep::Mapping);
    }

    #[test]
    fn test_failure_goes_back_to_mapping() {
        let mut wizard = ImportWizard::default();
        wizard.file_parsed(classification(&["First Name"])).unwrap();
        wizard.start_import().unwrap();
        wizard.import_failed("database is locked").unwrap();

        assert_eq!(wizard.step(), WizardStep::Mapping);
        assert_eq!(wizard.last_error(), Some("database is locked"));

        wizard.start_import().unwrap();
        assert_eq!(wizard.last_error(), None);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut wizard = ImportWizard::default();
        assert_eq!(
            wizard.start_import(),
            Err(WizardError::InvalidTransition {
                from: WizardStep::Upload,
                event: "start an import",
            })
        );
        assert!(wizard.import_succeeded(ImportResult::default()).is_err());

        wizard.file_parsed(classification(&["First Name"])).unwrap();
        assert!(wizard.file_parsed(classification(&["First Name"])).is_err());
    }

    #[test]
    fn test_reset_returns_to_upload() {
        let mut wizard = ImportWizard::default();
        wizard.file_parsed(classification(&["First Name"])).unwrap();
        wizard.reset();

        assert_eq!(wizard.step(), WizardStep::Upload);
        assert!(wizard.classification().is_none());
    }
}
