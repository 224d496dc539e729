//! Moves contact data between the stored shape and the flat edit form.
//!
//! The form addresses standard fields by their key and user-defined fields by
//! `custom_<key>`. Stored contacts keep custom values under the bare key.

use serde::{Deserialize, Serialize};
use shared_types::{
    parse_bool, parse_date, parse_integer, Contact, ContactField, CustomFieldDefinition,
    FieldKind, FieldValue, FormField, CUSTOM_PREFIX,
};
use std::collections::{BTreeMap, HashMap};

/// What happens to stored custom values whose definition no longer exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Keep them untouched on save
    #[default]
    Preserve,
    /// Remove them on save
    Drop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub standard: Vec<FormField>,
    pub custom: Vec<FormField>,
}

impl EditForm {
    /// Standard fields first, then custom fields
    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.standard.iter().chain(self.custom.iter())
    }

    pub fn into_fields(self) -> Vec<FormField> {
        self.standard.into_iter().chain(self.custom).collect()
    }

    /// The map a client would send back unchanged
    pub fn values(&self) -> BTreeMap<String, Option<FieldValue>> {
        self.fields()
            .map(|field| (field.key.clone(), field.value.clone()))
            .collect()
    }
}

/// Orphan custom values are not part of the form.
pub fn split(contact: &Contact, definitions: &[CustomFieldDefinition]) -> EditForm {
    let standard = ContactField::ALL
        .iter()
        .map(|field| FormField {
            key: field.key().to_string(),
            label: field.label().to_string(),
            value: Some(contact.field(*field)),
        })
        .collect();

    let custom = definitions
        .iter()
        .map(|definition| FormField {
            key: definition.ui_key(),
            label: definition.name.clone(),
            value: contact.custom_fields.get(&definition.key).cloned(),
        })
        .collect();

    EditForm { standard, custom }
}

/// Applies submitted form values on top of `original`.
///
/// Keys missing from `fields` keep their stored value. Unknown keys without
/// the custom prefix are ignored.
pub fn merge(
    fields: &BTreeMap<String, Option<FieldValue>>,
    original: &Contact,
    definitions: &[CustomFieldDefinition],
    policy: OrphanPolicy,
) -> Contact {
    let by_key: HashMap<&str, &CustomFieldDefinition> =
        definitions.iter().map(|d| (d.key.as_str(), d)).collect();
    let mut contact = original.clone();

    for (key, value) in fields {
        if let Some(custom_key) = key.strip_prefix(CUSTOM_PREFIX) {
            if custom_key.is_empty() {
                continue;
            }
            let coerced = value.as_ref().and_then(|value| {
                match by_key.get(custom_key) {
                    Some(definition) => coerce(definition.field_type.kind(), value),
                    None => Some(value.clone()),
                }
            });
            match coerced {
                Some(value) if !value.is_empty() => {
                    contact.custom_fields.insert(custom_key.to_string(), value);
                }
                _ => {
                    contact.custom_fields.remove(custom_key);
                }
            }
            continue;
        }

        match ContactField::from_key(key) {
            Some(field) => {
                let value = value.clone().unwrap_or_else(|| FieldValue::text(""));
                contact.set_field(field, value);
            }
            None => tracing::debug!(key = %key, "Ignoring unknown form field"),
        }
    }

    if policy == OrphanPolicy::Drop {
        contact
            .custom_fields
            .retain(|key, _| by_key.contains_key(key.as_str()));
    }

    contact
}

fn coerce(kind: FieldKind, value: &FieldValue) -> Option<FieldValue> {
    match (kind, value) {
        (FieldKind::Integer, FieldValue::Integer(_)) => Some(value.clone()),
        (FieldKind::Integer, other) => parse_integer(&other.to_text()).map(FieldValue::Integer),
        (FieldKind::Date, other) => {
            parse_date(&other.to_text()).map(|d| FieldValue::text(d.format("%Y-%m-%d").to_string()))
        }
        (FieldKind::Boolean, FieldValue::Bool(_)) => Some(value.clone()),
        (FieldKind::Boolean, other) => Some(FieldValue::Bool(parse_bool(&other.to_text()))),
        (_, other) => Some(FieldValue::text(other.to_text())),
    }
}
