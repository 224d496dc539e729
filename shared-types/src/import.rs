use crate::custom_field::{CustomFieldDefinition, CUSTOM_PREFIX};
use crate::field::{ContactField, FieldDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// Where a CSV column ends up.
///
/// On the wire this is a plain string: `skip`, `full_name`, a standard field
/// key such as `email`, or `custom_<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MappingTarget {
    Skip,
    /// Split into first/last name
    FullName,
    Field(ContactField),
    /// Bare custom field key, prefix already stripped
    Custom(String),
}

impl MappingTarget {
    pub fn is_skip(&self) -> bool {
        matches!(self, MappingTarget::Skip)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mapping target: '{0}'")]
pub struct UnknownTarget(pub String);

impl FromStr for MappingTarget {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "" | "skip" => Ok(MappingTarget::Skip),
            "full_name" => Ok(MappingTarget::FullName),
            _ => {
                if let Some(field) = ContactField::from_key(s) {
                    return Ok(MappingTarget::Field(field));
                }
                match s.strip_prefix(CUSTOM_PREFIX) {
                    Some(key) if !key.is_empty() => Ok(MappingTarget::Custom(key.to_string())),
                    _ => Err(UnknownTarget(s.to_string())),
                }
            }
        }
    }
}

impl TryFrom<String> for MappingTarget {
    type Error = UnknownTarget;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for MappingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingTarget::Skip => f.write_str("skip"),
            MappingTarget::FullName => f.write_str("full_name"),
            MappingTarget::Field(field) => f.write_str(field.key()),
            MappingTarget::Custom(key) => write!(f, "{}{}", CUSTOM_PREFIX, key),
        }
    }
}

impl From<MappingTarget> for String {
    fn from(target: MappingTarget) -> Self {
        target.to_string()
    }
}

/// CSV header (exactly as written in the file) -> target
pub type CsvColumnMapping = BTreeMap<String, MappingTarget>;

/// Outcome of one import. Built fresh per import and never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportResult {
    pub success: bool,
    pub imported_count: usize,
    pub skipped_count: usize,
    pub total_rows: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct GetColumnsRequest {
    pub csv_content: String,
}

/// A header recognised by the alias table
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KnownColumn {
    pub header: String,
    pub target: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct GetColumnsResponse {
    pub csv_columns: Vec<String>,
    pub known_columns: Vec<KnownColumn>,
    pub unknown_columns: Vec<String>,
    #[ts(type = "Record<string, string>")]
    pub suggested_mapping: CsvColumnMapping,
    pub contact_fields: Vec<FieldDescriptor>,
    pub custom_fields: Vec<CustomFieldDefinition>,
    pub total_rows: usize,
    /// Whether the wizard may skip the mapping step for this file
    pub can_import_directly: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct ImportWithMappingRequest {
    pub csv_content: String,
    /// User choices; headers left out fall back to the suggestion, then `skip`
    #[serde(default)]
    #[ts(type = "Record<string, string>")]
    pub mapping: CsvColumnMapping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!("skip".parse::<MappingTarget>().unwrap(), MappingTarget::Skip);
        assert_eq!("".parse::<MappingTarget>().unwrap(), MappingTarget::Skip);
        assert_eq!(
            "full_name".parse::<MappingTarget>().unwrap(),
            MappingTarget::FullName
        );
        assert_eq!(
            "email".parse::<MappingTarget>().unwrap(),
            MappingTarget::Field(ContactField::Email)
        );
        assert_eq!(
            "custom_shirt_size".parse::<MappingTarget>().unwrap(),
            MappingTarget::Custom("shirt_size".to_string())
        );
        assert!("custom_".parse::<MappingTarget>().is_err());
        assert!("favourite_colour".parse::<MappingTarget>().is_err());
    }

    #[test]
    fn test_mapping_serializes_as_strings() {
        let mut mapping = CsvColumnMapping::new();
        mapping.insert("E-mail".to_string(), MappingTarget::Field(ContactField::Email));
        mapping.insert("Size".to_string(), MappingTarget::Custom("size".to_string()));

        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"E-mail":"email","Size":"custom_size"}"#);

        let back: CsvColumnMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);
    }

    #[test]
    fn test_unknown_target_rejected_by_serde() {
        let result: Result<CsvColumnMapping, _> = serde_json::from_str(r#"{"A":"nope"}"#);
        assert!(result.is_err());
    }
}
