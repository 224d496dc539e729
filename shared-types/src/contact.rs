use crate::field::{ContactField, FieldValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Contact {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub organization: String,
    pub job_title: String,
    pub linkedin_url: String,
    pub birthday: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub notes: String,
    pub company_id: Option<i64>,
    /// Values of user-defined fields, keyed by bare definition key
    pub custom_fields: BTreeMap<String, FieldValue>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Contact {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Reads a standard field as a `FieldValue`; an absent birthday reads as empty text
    pub fn field(&self, field: ContactField) -> FieldValue {
        match field {
            ContactField::FirstName => FieldValue::text(&self.first_name),
            ContactField::LastName => FieldValue::text(&self.last_name),
            ContactField::Email => FieldValue::text(&self.email),
            ContactField::Phone => FieldValue::text(&self.phone),
            ContactField::Organization => FieldValue::text(&self.organization),
            ContactField::JobTitle => FieldValue::text(&self.job_title),
            ContactField::LinkedinUrl => FieldValue::text(&self.linkedin_url),
            ContactField::Birthday => match self.birthday {
                Some(date) => FieldValue::Date(date),
                None => FieldValue::text(""),
            },
            ContactField::Tags => FieldValue::List(self.tags.clone()),
            ContactField::IsFavorite => FieldValue::Bool(self.is_favorite),
            ContactField::Notes => FieldValue::text(&self.notes),
        }
    }

    /// Writes a standard field, coercing the value to the field's kind
    pub fn set_field(&mut self, field: ContactField, value: FieldValue) {
        match field {
            ContactField::FirstName => self.first_name = value.to_text(),
            ContactField::LastName => self.last_name = value.to_text(),
            ContactField::Email => self.email = value.to_text(),
            ContactField::Phone => self.phone = value.to_text(),
            ContactField::Organization => self.organization = value.to_text(),
            ContactField::JobTitle => self.job_title = value.to_text(),
            ContactField::LinkedinUrl => self.linkedin_url = value.to_text(),
            ContactField::Birthday => self.birthday = value.to_date(),
            ContactField::Tags => self.tags = value.to_list(),
            ContactField::IsFavorite => self.is_favorite = value.to_bool(),
            ContactField::Notes => self.notes = value.to_text(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateContactRequest {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, FieldValue>,
}

impl CreateContactRequest {
    /// Builds the request from a contact-shaped value; ids and timestamps are ignored
    pub fn from_contact(contact: Contact) -> Self {
        Self {
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone: contact.phone,
            organization: contact.organization,
            job_title: contact.job_title,
            linkedin_url: contact.linkedin_url,
            birthday: contact.birthday,
            tags: contact.tags,
            is_favorite: contact.is_favorite,
            notes: contact.notes,
            custom_fields: contact.custom_fields,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
pub struct UpdateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub job_title: Option<String>,
    pub linkedin_url: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub notes: Option<String>,
    pub custom_fields: Option<BTreeMap<String, FieldValue>>,
}

impl UpdateContactRequest {
    pub fn apply(self, contact: &mut Contact) {
        if let Some(v) = self.first_name {
            contact.first_name = v;
        }
        if let Some(v) = self.last_name {
            contact.last_name = v;
        }
        if let Some(v) = self.email {
            contact.email = v;
        }
        if let Some(v) = self.phone {
            contact.phone = v;
        }
        if let Some(v) = self.organization {
            contact.organization = v;
        }
        if let Some(v) = self.job_title {
            contact.job_title = v;
        }
        if let Some(v) = self.linkedin_url {
            contact.linkedin_url = v;
        }
        if self.birthday.is_some() {
            contact.birthday = self.birthday;
        }
        if let Some(v) = self.tags {
            contact.tags = v;
        }
        if let Some(v) = self.is_favorite {
            contact.is_favorite = v;
        }
        if let Some(v) = self.notes {
            contact.notes = v;
        }
        if let Some(fields) = self.custom_fields {
            contact.custom_fields.extend(fields);
        }
    }
}

#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ContactsResponse {
    pub contacts: Vec<Contact>,
}

/// One editable field as shown by the contact form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FormField {
    /// Standard key, or `custom_<key>` for user-defined fields
    pub key: String,
    pub label: String,
    /// `None` for a custom field the contact has no value for
    pub value: Option<FieldValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContactFormResponse {
    pub contact_id: i64,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export)]
pub struct SaveContactFormRequest {
    /// Keys left out keep their stored value; `null` clears a custom field
    pub fields: BTreeMap<String, Option<FieldValue>>,
}
