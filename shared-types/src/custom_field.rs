use crate::field::FieldKind;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// UI key prefix marking a user-defined field
pub const CUSTOM_PREFIX: &str = "custom_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum CustomFieldType {
    Text,
    Textarea,
    Select,
    Number,
    Date,
    Checkbox,
}

impl CustomFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomFieldType::Text => "text",
            CustomFieldType::Textarea => "textarea",
            CustomFieldType::Select => "select",
            CustomFieldType::Number => "number",
            CustomFieldType::Date => "date",
            CustomFieldType::Checkbox => "checkbox",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(CustomFieldType::Text),
            "textarea" => Some(CustomFieldType::Textarea),
            "select" => Some(CustomFieldType::Select),
            "number" => Some(CustomFieldType::Number),
            "date" => Some(CustomFieldType::Date),
            "checkbox" => Some(CustomFieldType::Checkbox),
            _ => None,
        }
    }

    /// Coercion used when importing or saving a value of this type
    pub fn kind(&self) -> FieldKind {
        match self {
            CustomFieldType::Number => FieldKind::Integer,
            CustomFieldType::Date => FieldKind::Date,
            CustomFieldType::Checkbox => FieldKind::Boolean,
            _ => FieldKind::Text,
        }
    }
}

/// A user-defined contact attribute.
///
/// Deleting a definition leaves existing values on contacts untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomFieldDefinition {
    pub key: String,
    pub name: String,
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub position: i64,
}

impl CustomFieldDefinition {
    pub fn new(key: impl Into<String>, name: impl Into<String>, field_type: CustomFieldType) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            field_type,
            options: Vec::new(),
            position: 0,
        }
    }

    /// Key used by forms and CSV mappings, e.g. `custom_shirt_size`
    pub fn ui_key(&self) -> String {
        format!("{}{}", CUSTOM_PREFIX, self.key)
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct CreateCustomFieldRequest {
    /// Derived from `name` when missing
    pub key: Option<String>,
    pub name: String,
    pub field_type: CustomFieldType,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct CustomFieldsResponse {
    pub custom_fields: Vec<CustomFieldDefinition>,
}

/// Turns a display label into a stable key: `Shirt Size!` -> `shirt_size`
pub fn slugify_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut last_was_sep = true;

    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            key.push('_');
            last_was_sep = true;
        }
    }

    key.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_key() {
        assert_eq!(slugify_key("Shirt Size!"), "shirt_size");
        assert_eq!(slugify_key("  Lead -- Source "), "lead_source");
        assert_eq!(slugify_key("???"), "");
    }

    #[test]
    fn test_ui_key() {
        let def = CustomFieldDefinition::new("shirt_size", "Shirt size", CustomFieldType::Select);
        assert_eq!(def.ui_key(), "custom_shirt_size");
    }

    #[test]
    fn test_field_type_round_trip() {
        for t in [
            CustomFieldType::Text,
            CustomFieldType::Textarea,
            CustomFieldType::Select,
            CustomFieldType::Number,
            CustomFieldType::Date,
            CustomFieldType::Checkbox,
        ] {
            assert_eq!(CustomFieldType::parse(t.as_str()), Some(t));
        }
    }
}
