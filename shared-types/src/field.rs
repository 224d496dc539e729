use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// How a field's raw text is coerced on import and edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Text,
    Email,
    /// URL that must mention the given keyword (e.g. `linkedin`)
    Url,
    Boolean,
    Integer,
    Date,
    /// `;`-separated list
    List,
}

/// Standard contact fields. Anything else on a contact lives in `custom_fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    FirstName,
    LastName,
    Email,
    Phone,
    Organization,
    JobTitle,
    LinkedinUrl,
    Birthday,
    Tags,
    IsFavorite,
    Notes,
}

impl ContactField {
    /// Display order used by forms and the mapping UI
    pub const ALL: [ContactField; 11] = [
        ContactField::FirstName,
        ContactField::LastName,
        ContactField::Email,
        ContactField::Phone,
        ContactField::Organization,
        ContactField::JobTitle,
        ContactField::LinkedinUrl,
        ContactField::Birthday,
        ContactField::Tags,
        ContactField::IsFavorite,
        ContactField::Notes,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ContactField::FirstName => "first_name",
            ContactField::LastName => "last_name",
            ContactField::Email => "email",
            ContactField::Phone => "phone",
            ContactField::Organization => "organization",
            ContactField::JobTitle => "job_title",
            ContactField::LinkedinUrl => "linkedin_url",
            ContactField::Birthday => "birthday",
            ContactField::Tags => "tags",
            ContactField::IsFavorite => "is_favorite",
            ContactField::Notes => "notes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContactField::FirstName => "First name",
            ContactField::LastName => "Last name",
            ContactField::Email => "Email",
            ContactField::Phone => "Phone",
            ContactField::Organization => "Company",
            ContactField::JobTitle => "Job title",
            ContactField::LinkedinUrl => "LinkedIn",
            ContactField::Birthday => "Birthday",
            ContactField::Tags => "Tags",
            ContactField::IsFavorite => "Favorite",
            ContactField::Notes => "Notes",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            ContactField::Email => FieldKind::Email,
            ContactField::LinkedinUrl => FieldKind::Url,
            ContactField::Birthday => FieldKind::Date,
            ContactField::Tags => FieldKind::List,
            ContactField::IsFavorite => FieldKind::Boolean,
            _ => FieldKind::Text,
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, ContactField::FirstName)
    }

    /// Keyword a URL field value has to contain to be accepted
    pub fn url_keyword(self) -> Option<&'static str> {
        match self {
            ContactField::LinkedinUrl => Some("linkedin"),
            _ => None,
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }

    pub fn descriptor(self) -> FieldDescriptor {
        FieldDescriptor {
            key: self.key().to_string(),
            label: self.label().to_string(),
            kind: self.kind(),
            required: self.is_required(),
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A standard field as advertised to the mapping UI
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// A coerced field value.
///
/// Serialized untagged; dates are written as `YYYY-MM-DD` strings and read
/// back as `Text`, so stored custom values never change shape on reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    List(Vec<String>),
    Text(String),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Flattens the value back into the text a user would type
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::List(items) => items.join("; "),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn to_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Integer(n) => *n == 1,
            other => parse_bool(&other.to_text()),
        }
    }

    pub fn to_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items.clone(),
            other => split_list(&other.to_text()),
        }
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            other => parse_date(&other.to_text()),
        }
    }
}

/// `true`, `yes` and `1` (any case) are true; everything else is false
pub fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "yes" | "1")
}

/// Splits on `;` (never `,`, which belongs to the CSV itself), trims and drops empties
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses an integer after stripping thousands separators
pub fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y", "%d %b %Y"];

/// Parses the date layouts seen in exported address books.
/// `Jan 2024` style month/year values resolve to the first of the month.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    NaiveDate::parse_from_str(&format!("01 {}", raw), "%d %b %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_field_keys_round_trip() {
        for field in ContactField::ALL {
            assert_eq!(ContactField::from_key(field.key()), Some(field));
        }
        assert_eq!(ContactField::from_key("custom_shirt"), None);
    }

    #[test]
    fn test_field_serialization_matches_key() {
        let json = serde_json::to_string(&ContactField::LinkedinUrl).unwrap();
        assert_eq!(json, "\"linkedin_url\"");
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["TRUE", "Yes", "1", " true "] {
            assert!(parse_bool(truthy), "{} should be true", truthy);
        }
        for falsy in ["no", "", "0", "maybe"] {
            assert!(!parse_bool(falsy), "{} should be false", falsy);
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list(" vip ; ;lead;  partner "),
            vec!["vip".to_string(), "lead".to_string(), "partner".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("1,234"), Some(1234));
        assert_eq!(parse_integer("-42"), Some(-42));
        assert_eq!(parse_integer("twelve"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(1990, 4, 12).unwrap();
        assert_eq!(parse_date("1990-04-12"), Some(expected));
        assert_eq!(parse_date("04/12/1990"), Some(expected));
        assert_eq!(parse_date("12.04.1990"), Some(expected));
        assert_eq!(parse_date("12 Apr 1990"), Some(expected));

        let month_only = parse_date("Jan 2024").unwrap();
        assert_eq!((month_only.year(), month_only.month(), month_only.day()), (2024, 1, 1));

        assert_eq!(parse_date("someday"), None);
    }

    #[test]
    fn test_field_value_untagged_serialization() {
        let value = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"2024-02-29\"");

        let back: FieldValue = serde_json::from_str("\"2024-02-29\"").unwrap();
        assert_eq!(back, FieldValue::text("2024-02-29"));

        let list: FieldValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(list, FieldValue::List(vec!["a".into(), "b".into()]));

        let number: FieldValue = serde_json::from_str("7").unwrap();
        assert_eq!(number, FieldValue::Integer(7));
    }
}
