use shared_types::{ContactField, CsvColumnMapping, MappingTarget};

/// Lowercased header aliases that map straight onto a standard field
const HEADER_ALIASES: &[(&str, ContactField)] = &[
    ("first name", ContactField::FirstName),
    ("firstname", ContactField::FirstName),
    ("given name", ContactField::FirstName),
    ("forename", ContactField::FirstName),
    ("last name", ContactField::LastName),
    ("lastname", ContactField::LastName),
    ("surname", ContactField::LastName),
    ("family name", ContactField::LastName),
    ("email", ContactField::Email),
    ("e-mail", ContactField::Email),
    ("email address", ContactField::Email),
    ("e-mail address", ContactField::Email),
    ("mail", ContactField::Email),
    ("phone", ContactField::Phone),
    ("phone number", ContactField::Phone),
    ("telephone", ContactField::Phone),
    ("mobile", ContactField::Phone),
    ("mobile phone", ContactField::Phone),
    ("company", ContactField::Organization),
    ("company name", ContactField::Organization),
    ("organization", ContactField::Organization),
    ("organisation", ContactField::Organization),
    ("employer", ContactField::Organization),
    ("title", ContactField::JobTitle),
    ("job title", ContactField::JobTitle),
    ("position", ContactField::JobTitle),
    ("role", ContactField::JobTitle),
    ("linkedin", ContactField::LinkedinUrl),
    ("linkedin url", ContactField::LinkedinUrl),
    ("linkedin profile", ContactField::LinkedinUrl),
    ("birthday", ContactField::Birthday),
    ("date of birth", ContactField::Birthday),
    ("birth date", ContactField::Birthday),
    ("dob", ContactField::Birthday),
    ("tags", ContactField::Tags),
    ("labels", ContactField::Tags),
    ("groups", ContactField::Tags),
    ("favorite", ContactField::IsFavorite),
    ("favourite", ContactField::IsFavorite),
    ("starred", ContactField::IsFavorite),
    ("notes", ContactField::Notes),
    ("note", ContactField::Notes),
    ("comments", ContactField::Notes),
];

/// Headers holding "First Last" in one cell
const FULL_NAME_ALIASES: &[&str] = &[
    "full name",
    "fullname",
    "full_name",
    "name",
    "contact name",
    "display name",
];

/// Substring rules for headers the alias table does not know.
/// Applied in order, first match wins.
const KEYWORD_RULES: &[(&[&str], ContactField)] = &[
    (&["first", "name"], ContactField::FirstName),
    (&["email"], ContactField::Email),
    (&["phone", "tel"], ContactField::Phone),
    (&["company", "org"], ContactField::Organization),
    (&["last", "surname"], ContactField::LastName),
    (&["linkedin"], ContactField::LinkedinUrl),
    (&["tag"], ContactField::Tags),
    (&["title"], ContactField::JobTitle),
    (&["note"], ContactField::Notes),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownHeader {
    pub header: String,
    pub target: MappingTarget,
}

/// Headers split into recognised and unrecognised ones, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClassification {
    pub known: Vec<KnownHeader>,
    pub unknown: Vec<String>,
}

impl ColumnClassification {
    pub fn all_known(&self) -> bool {
        self.unknown.is_empty()
    }

    /// Alias-table mapping for the known headers
    pub fn default_mapping(&self) -> CsvColumnMapping {
        self.known
            .iter()
            .map(|known| (known.header.clone(), known.target.clone()))
            .collect()
    }

    /// Keyword guesses for the unknown headers; unmatched ones are left out
    pub fn auto_mapping(&self) -> CsvColumnMapping {
        self.unknown
            .iter()
            .filter_map(|header| auto_map(header).map(|target| (header.clone(), target)))
            .collect()
    }

    /// What the mapping step starts from before the user changes anything
    pub fn suggested_mapping(&self) -> CsvColumnMapping {
        let mut mapping = self.default_mapping();
        for header in &self.unknown {
            mapping.insert(
                header.clone(),
                auto_map(header).unwrap_or(MappingTarget::Skip),
            );
        }
        mapping
    }
}

fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Case-insensitive alias lookup. Canonical keys (`job_title`, `full_name`) count too.
pub fn lookup_alias(header: &str) -> Option<MappingTarget> {
    let normalized = normalize(header);

    if FULL_NAME_ALIASES.contains(&normalized.as_str()) {
        return Some(MappingTarget::FullName);
    }

    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, field)| *field)
        .or_else(|| ContactField::from_key(&normalized))
        .map(MappingTarget::Field)
}

pub fn auto_map(header: &str) -> Option<MappingTarget> {
    let normalized = normalize(header);

    KEYWORD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| normalized.contains(k)))
        .map(|(_, field)| MappingTarget::Field(*field))
}

pub fn classify(headers: &[String]) -> ColumnClassification {
    let mut classification = ColumnClassification::default();

    for header in headers {
        match lookup_alias(header) {
            Some(target) => classification.known.push(KnownHeader {
                header: header.clone(),
                target,
            }),
            None => classification.unknown.push(header.clone()),
        }
    }

    tracing::debug!(
        known = classification.known.len(),
        unknown = classification.unknown.len(),
        "Classified CSV headers"
    );

    classification
}
