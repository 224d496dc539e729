use super::mapping::ResolvedMapping;
use super::tokenizer::CsvTable;
use shared_types::{
    parse_bool, parse_date, parse_integer, split_list, Contact, ContactField,
    CreateContactRequest, CustomFieldDefinition, FieldKind, FieldValue, MappingTarget,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A row that could not become a contact. Never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based data row, header excluded
    pub row: usize,
    pub message: String,
}

impl RowError {
    fn missing_required(row: usize, field: ContactField) -> Self {
        Self {
            row,
            message: format!("missing required field {}", field.key()),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {}: {}", self.row, self.message)
    }
}

impl std::error::Error for RowError {}

#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub drafts: Vec<CreateContactRequest>,
    pub errors: Vec<RowError>,
    /// Rows dropped for missing required fields
    pub skipped: usize,
}

/// Turns raw CSV rows into contact drafts according to a resolved mapping
pub struct RowTransformer<'a> {
    mapping: &'a ResolvedMapping,
    definitions: HashMap<&'a str, &'a CustomFieldDefinition>,
}

impl<'a> RowTransformer<'a> {
    pub fn new(mapping: &'a ResolvedMapping, definitions: &'a [CustomFieldDefinition]) -> Self {
        Self {
            mapping,
            definitions: definitions.iter().map(|d| (d.key.as_str(), d)).collect(),
        }
    }

    pub fn transform(&self, row: &[String], row_number: usize) -> Result<CreateContactRequest, RowError> {
        let mut contact = Contact::default();
        let mut assigned: HashSet<ContactField> = HashSet::new();

        for column in self.mapping.active_columns() {
            let raw = row.get(column.index).map(|s| s.trim()).unwrap_or("");
            if raw.is_empty() {
                continue;
            }

            match &column.target {
                MappingTarget::Skip => {}
                MappingTarget::FullName => {
                    let (first, last) = split_full_name(raw);
                    assign(&mut contact, &mut assigned, ContactField::FirstName, first);
                    assign(&mut contact, &mut assigned, ContactField::LastName, last);
                }
                MappingTarget::Field(field) => {
                    assign(&mut contact, &mut assigned, *field, raw);
                }
                MappingTarget::Custom(key) => {
                    if contact.custom_fields.contains_key(key) {
                        continue;
                    }
                    let Some(definition) = self.definitions.get(key.as_str()) else {
                        tracing::debug!(key = %key, "No definition for custom field, value dropped");
                        continue;
                    };
                    if let Some(value) = coerce_custom(definition, raw) {
                        contact.custom_fields.insert(key.clone(), value);
                    }
                }
            }
        }

        for field in ContactField::ALL.iter().filter(|f| f.is_required()) {
            if contact.field(*field).is_empty() {
                return Err(RowError::missing_required(row_number, *field));
            }
        }

        Ok(CreateContactRequest::from_contact(contact))
    }

    pub fn transform_all(&self, table: &CsvTable) -> TransformOutcome {
        let mut outcome = TransformOutcome::default();

        for (index, row) in table.rows.iter().enumerate() {
            match self.transform(row, index + 1) {
                Ok(draft) => outcome.drafts.push(draft),
                Err(error) => {
                    tracing::warn!("Skipping CSV row: {}", error);
                    outcome.skipped += 1;
                    outcome.errors.push(error);
                }
            }
        }

        outcome
    }
}

/// Writes `raw` into `field` unless an earlier column already filled it.
/// Values that fail validation leave the field open for a later column.
fn assign(contact: &mut Contact, assigned: &mut HashSet<ContactField>, field: ContactField, raw: &str) {
    if raw.is_empty() || assigned.contains(&field) {
        return;
    }

    let Some(value) = coerce_standard(field, raw) else {
        tracing::debug!(field = %field, value = raw, "Dropping invalid value");
        return;
    };

    contact.set_field(field, value);
    assigned.insert(field);
}

fn coerce_standard(field: ContactField, raw: &str) -> Option<FieldValue> {
    match field.kind() {
        FieldKind::Email => raw.contains('@').then(|| FieldValue::text(raw)),
        FieldKind::Url => {
            let keyword = field.url_keyword().unwrap_or_default();
            raw.to_lowercase()
                .contains(keyword)
                .then(|| FieldValue::text(raw))
        }
        FieldKind::Boolean => Some(FieldValue::Bool(parse_bool(raw))),
        FieldKind::List => Some(FieldValue::List(split_list(raw))),
        FieldKind::Date => parse_date(raw).map(FieldValue::Date),
        FieldKind::Integer => parse_integer(raw).map(FieldValue::Integer),
        FieldKind::Text => Some(FieldValue::text(raw)),
    }
}

/// Custom dates are kept as ISO text so they read back unchanged
fn coerce_custom(definition: &CustomFieldDefinition, raw: &str) -> Option<FieldValue> {
    match definition.field_type.kind() {
        FieldKind::Integer => parse_integer(raw).map(FieldValue::Integer),
        FieldKind::Date => parse_date(raw).map(|d| FieldValue::text(d.format("%Y-%m-%d").to_string())),
        FieldKind::Boolean => Some(FieldValue::Bool(parse_bool(raw))),
        _ => Some(FieldValue::text(raw)),
    }
}

/// `"Mary Ann Smith"` -> (`"Mary"`, `"Ann Smith"`); no whitespace -> everything is the first name
pub fn split_full_name(raw: &str) -> (&str, &str) {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (raw, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact_csv::classifier::classify;
    use crate::contact_csv::mapping::resolve;
    use crate::contact_csv::tokenizer::CsvTokenizer;
    use chrono::NaiveDate;
    use shared_types::{CsvColumnMapping, CustomFieldType};

    fn table(csv: &str) -> CsvTable {
        CsvTokenizer::new().tokenize(csv).unwrap()
    }

    fn auto_resolve(table: &CsvTable, overrides: &CsvColumnMapping) -> ResolvedMapping {
        let classification = classify(&table.headers);
        resolve(
            &table.headers,
            &classification.default_mapping(),
            &classification.auto_mapping(),
            overrides,
        )
    }

    #[test]
    fn test_full_name_email_company_file() {
        let table = table(
            "Full Name,E-mail,Company\nJohn Doe,john@example.com,Acme\nJane Roe,not-an-email,Globex\n",
        );
        let mapping = auto_resolve(&table, &CsvColumnMapping::new());
        let outcome = RowTransformer::new(&mapping, &[]).transform_all(&table);

        assert_eq!(outcome.drafts.len(), 2);
        assert!(outcome.errors.is_empty());

        let john = &outcome.drafts[0];
        assert_eq!(john.first_name, "John");
        assert_eq!(john.last_name, "Doe");
        assert_eq!(john.email, "john@example.com");
        assert_eq!(john.organization, "Acme");

        let jane = &outcome.drafts[1];
        assert_eq!(jane.first_name, "Jane");
        assert_eq!(jane.email, "");
        assert_eq!(jane.organization, "Globex");
    }

    #[test]
    fn test_missing_first_name_skips_row_with_one_error() {
        let table = table("First Name,Email\n,ghost@example.com\nAda,ada@example.com\n");
        let mapping = auto_resolve(&table, &CsvColumnMapping::new());
        let outcome = RowTransformer::new(&mapping, &[]).transform_all(&table);

        assert_eq!(outcome.drafts.len(), 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(
            outcome.errors[0].to_string(),
            "Row 1: missing required field first_name"
        );
    }

    #[test]
    fn test_row_numbers_count_rows_of_empty_cells() {
        let table = table("First Name,Email\n,\n,bob@example.com\nAda,ada@example.com\n");
        let mapping = auto_resolve(&table, &CsvColumnMapping::new());
        let outcome = RowTransformer::new(&mapping, &[]).transform_all(&table);

        assert_eq!(table.total_rows(), 3);
        assert_eq!(outcome.drafts.len(), 1);
        let errors: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            vec![
                "Row 1: missing required field first_name",
                "Row 2: missing required field first_name",
            ]
        );
    }

    #[test]
    fn test_skipped_column_never_reaches_the_draft() {
        let table = table("First Name,Unknown Col XYZ\nAda,secret\n");
        let mapping = auto_resolve(&table, &CsvColumnMapping::new());
        let outcome = RowTransformer::new(&mapping, &[]).transform_all(&table);

        let draft = &outcome.drafts[0];
        assert!(draft.custom_fields.is_empty());
        assert_ne!(draft.notes, "secret");
        assert_ne!(draft.last_name, "secret");
    }

    #[test]
    fn test_custom_number_strips_thousands_separator() {
        let table = table("First Name,Deal Size\nAda,\"1,234\"\nGrace,lots\n");
        let mut overrides = CsvColumnMapping::new();
        overrides.insert("Deal Size".into(), MappingTarget::Custom("deal_size".into()));
        let definitions = vec![CustomFieldDefinition::new(
            "deal_size",
            "Deal size",
            CustomFieldType::Number,
        )];

        let mapping = auto_resolve(&table, &overrides);
        let outcome = RowTransformer::new(&mapping, &definitions).transform_all(&table);

        assert_eq!(
            outcome.drafts[0].custom_fields.get("deal_size"),
            Some(&FieldValue::Integer(1234))
        );
        assert!(outcome.drafts[1].custom_fields.get("deal_size").is_none());
    }

    #[test]
    fn test_every_valid_row_becomes_a_draft() {
        let mut csv = String::from("First Name,Email\n");
        for i in 0..25 {
            csv.push_str(&format!("Person{},p{}@example.com\n", i, i));
        }
        let table = table(&csv);
        let mapping = auto_resolve(&table, &CsvColumnMapping::new());
        let outcome = RowTransformer::new(&mapping, &[]).transform_all(&table);

        assert_eq!(outcome.drafts.len(), 25);
        assert_eq!(outcome.skipped, 0);
    }

    #[test]
    fn test_typed_standard_fields() {
        let table = table(
            "First Name,LinkedIn,Favorite,Tags,Birthday\n\
             Ada,https://www.LinkedIn.com/in/ada,Yes,vip; lead ;,12.04.1990\n\
             Grace,https://example.com/grace,no,,whenever\n",
        );
        let mapping = auto_resolve(&table, &CsvColumnMapping::new());
        let outcome = RowTransformer::new(&mapping, &[]).transform_all(&table);

        let ada = &outcome.drafts[0];
        assert_eq!(ada.linkedin_url, "https://www.LinkedIn.com/in/ada");
        assert!(ada.is_favorite);
        assert_eq!(ada.tags, vec!["vip".to_string(), "lead".to_string()]);
        assert_eq!(ada.birthday, NaiveDate::from_ymd_opt(1990, 4, 12));

        let grace = &outcome.drafts[1];
        assert_eq!(grace.linkedin_url, "");
        assert!(!grace.is_favorite);
        assert!(grace.tags.is_empty());
        assert_eq!(grace.birthday, None);
    }

    #[test]
    fn test_first_non_empty_column_wins() {
        let table = table("First Name,Email,Work Email\nAda,,ada@work.com\nGrace,grace@home.com,grace@work.com\n");
        let mapping = auto_resolve(&table, &CsvColumnMapping::new());
        let outcome = RowTransformer::new(&mapping, &[]).transform_all(&table);

        assert_eq!(outcome.drafts[0].email, "ada@work.com");
        assert_eq!(outcome.drafts[1].email, "grace@home.com");
    }

    #[test]
    fn test_split_full_name() {
        assert_eq!(split_full_name("Mary Ann  Smith"), ("Mary", "Ann  Smith"));
        assert_eq!(split_full_name("Cher"), ("Cher", ""));
        assert_eq!(split_full_name("John\tDoe"), ("John", "Doe"));
    }

    #[test]
    fn test_custom_date_is_stored_as_iso_text() {
        let table = table("First Name,Met\nAda,Jan 2024\n");
        let mut overrides = CsvColumnMapping::new();
        overrides.insert("Met".into(), MappingTarget::Custom("met_on".into()));
        let definitions = vec![CustomFieldDefinition::new("met_on", "Met on", CustomFieldType::Date)];

        let mapping = auto_resolve(&table, &overrides);
        let outcome = RowTransformer::new(&mapping, &definitions).transform_all(&table);

        assert_eq!(
            outcome.drafts[0].custom_fields.get("met_on"),
            Some(&FieldValue::text("2024-01-01"))
        );
    }
}
