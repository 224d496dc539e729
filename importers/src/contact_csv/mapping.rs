use shared_types::{CsvColumnMapping, CustomFieldDefinition, MappingTarget};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    pub index: usize,
    pub header: String,
    pub target: MappingTarget,
}

/// Final header -> target decision for every column of one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMapping {
    columns: Vec<ResolvedColumn>,
}

impl ResolvedMapping {
    pub fn columns(&self) -> &[ResolvedColumn] {
        &self.columns
    }

    /// Columns the transformer reads; `skip` columns never show up here
    pub fn active_columns(&self) -> impl Iterator<Item = &ResolvedColumn> {
        self.columns.iter().filter(|column| !column.target.is_skip())
    }

    pub fn target_for(&self, header: &str) -> Option<&MappingTarget> {
        self.columns
            .iter()
            .find(|column| column.header == header)
            .map(|column| &column.target)
    }

    pub fn to_mapping(&self) -> CsvColumnMapping {
        self.columns
            .iter()
            .map(|column| (column.header.clone(), column.target.clone()))
            .collect()
    }

    /// Downgrades custom targets without a definition to `skip`.
    /// Returns one warning per downgraded or doubly mapped column.
    pub fn sanitize(&mut self, definitions: &[CustomFieldDefinition]) -> Vec<String> {
        let registered: HashSet<&str> = definitions.iter().map(|d| d.key.as_str()).collect();
        let mut seen = HashSet::new();
        let mut warnings = Vec::new();

        for column in &mut self.columns {
            if let MappingTarget::Custom(key) = &column.target {
                if !registered.contains(key.as_str()) {
                    warnings.push(format!(
                        "Column '{}' maps to unknown custom field '{}' and was skipped",
                        column.header, key
                    ));
                    column.target = MappingTarget::Skip;
                    continue;
                }
            }

            if !column.target.is_skip() && !seen.insert(column.target.clone()) {
                warnings.push(format!(
                    "Column '{}' maps to '{}' which is already mapped; the first non-empty value wins",
                    column.header, column.target
                ));
            }
        }

        for warning in &warnings {
            tracing::warn!("{}", warning);
        }

        warnings
    }
}

/// Layers the three mapping sources: user overrides beat auto-detected
/// guesses, which beat the alias defaults. Headers found in none of them are
/// skipped. Never fails.
pub fn resolve(
    headers: &[String],
    default_mapping: &CsvColumnMapping,
    auto_mapping: &CsvColumnMapping,
    overrides: &CsvColumnMapping,
) -> ResolvedMapping {
    let columns = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let target = overrides
                .get(header)
                .or_else(|| auto_mapping.get(header))
                .or_else(|| default_mapping.get(header))
                .cloned()
                .unwrap_or(MappingTarget::Skip);

            ResolvedColumn {
                index,
                header: header.clone(),
                target,
            }
        })
        .collect();

    let resolved = ResolvedMapping { columns };
    tracing::debug!(
        active = resolved.active_columns().count(),
        total = headers.len(),
        "Resolved CSV column mapping"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{ContactField, CustomFieldType};

    fn mapping(pairs: &[(&str, MappingTarget)]) -> CsvColumnMapping {
        pairs
            .iter()
            .map(|(h, t)| (h.to_string(), t.clone()))
            .collect()
    }

    fn email() -> MappingTarget {
        MappingTarget::Field(ContactField::Email)
    }

    fn phone() -> MappingTarget {
        MappingTarget::Field(ContactField::Phone)
    }

    #[test]
    fn test_precedence_override_auto_default() {
        let headers = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let default = mapping(&[("A", email()), ("B", email()), ("C", email())]);
        let auto = mapping(&[("A", phone()), ("B", phone())]);
        let overrides = mapping(&[("A", MappingTarget::Skip)]);

        let resolved = resolve(&headers, &default, &auto, &overrides);

        assert_eq!(resolved.target_for("A"), Some(&MappingTarget::Skip));
        assert_eq!(resolved.target_for("B"), Some(&phone()));
        assert_eq!(resolved.target_for("C"), Some(&email()));
    }

    #[test]
    fn test_unmapped_headers_default_to_skip() {
        let headers = vec!["Unknown Col XYZ".to_string()];
        let empty = CsvColumnMapping::new();

        let resolved = resolve(&headers, &empty, &empty, &empty);

        assert_eq!(
            resolved.target_for("Unknown Col XYZ"),
            Some(&MappingTarget::Skip)
        );
        assert_eq!(resolved.active_columns().count(), 0);
    }

    #[test]
    fn test_override_keys_are_case_sensitive_headers() {
        let headers = vec!["Email".to_string()];
        let empty = CsvColumnMapping::new();
        let overrides = mapping(&[("email", phone())]);

        let resolved = resolve(&headers, &empty, &empty, &overrides);
        assert_eq!(resolved.target_for("Email"), Some(&MappingTarget::Skip));
    }

    #[test]
    fn test_sanitize_drops_unregistered_custom_targets() {
        let headers = vec!["Size".to_string(), "Color".to_string()];
        let overrides = mapping(&[
            ("Size", MappingTarget::Custom("size".into())),
            ("Color", MappingTarget::Custom("color".into())),
        ]);
        let empty = CsvColumnMapping::new();
        let definitions = vec![CustomFieldDefinition::new(
            "size",
            "Size",
            CustomFieldType::Text,
        )];

        let mut resolved = resolve(&headers, &empty, &empty, &overrides);
        let warnings = resolved.sanitize(&definitions);

        assert_eq!(warnings.len(), 1);
        assert_eq!(
            resolved.target_for("Size"),
            Some(&MappingTarget::Custom("size".into()))
        );
        assert_eq!(resolved.target_for("Color"), Some(&MappingTarget::Skip));
    }

    #[test]
    fn test_sanitize_warns_on_double_mapping() {
        let headers = vec!["Work Email".to_string(), "Home Email".to_string()];
        let auto = mapping(&[("Work Email", email()), ("Home Email", email())]);
        let empty = CsvColumnMapping::new();

        let mut resolved = resolve(&headers, &empty, &auto, &empty);
        let warnings = resolved.sanitize(&[]);

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Home Email"));
        assert_eq!(resolved.active_columns().count(), 2);
    }
}
