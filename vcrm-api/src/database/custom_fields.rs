use crate::database::AsyncDbConnection;
use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use shared_types::{CustomFieldDefinition, CustomFieldType};

fn map_definition(row: &rusqlite::Row) -> rusqlite::Result<CustomFieldDefinition> {
    let field_type: String = row.get(2)?;
    let options: String = row.get(3)?;

    Ok(CustomFieldDefinition {
        key: row.get(0)?,
        name: row.get(1)?,
        field_type: CustomFieldType::parse(&field_type).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                format!("Unknown field type '{}'", field_type).into(),
            )
        })?,
        options: serde_json::from_str(&options)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?,
        position: row.get(4)?,
    })
}

/// Definitions in display order
pub fn list_definitions_in(conn: &Connection) -> Result<Vec<CustomFieldDefinition>> {
    let mut stmt = conn.prepare(
        "SELECT key, name, field_type, options, position
         FROM custom_field_definitions
         ORDER BY position, key",
    )?;

    let definitions = stmt
        .query_map([], map_definition)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(definitions)
}

pub async fn list_definitions(conn: AsyncDbConnection) -> Result<Vec<CustomFieldDefinition>> {
    let conn = conn.lock().await?;
    list_definitions_in(&conn)
}

/// Appends the definition after the existing ones. `None` when the key is taken.
pub async fn insert_definition(
    conn: AsyncDbConnection,
    key: &str,
    name: &str,
    field_type: CustomFieldType,
    options: &[String],
) -> Result<Option<CustomFieldDefinition>> {
    let conn = conn.lock().await?;

    let taken: Option<String> = conn
        .query_row(
            "SELECT key FROM custom_field_definitions WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Ok(None);
    }

    let definition = conn.query_row(
        "INSERT INTO custom_field_definitions (key, name, field_type, options, position)
         VALUES (?1, ?2, ?3, ?4,
                 (SELECT COALESCE(MAX(position), -1) + 1 FROM custom_field_definitions))
         RETURNING key, name, field_type, options, position",
        rusqlite::params![key, name, field_type.as_str(), serde_json::to_string(options)?],
        map_definition,
    )?;

    Ok(Some(definition))
}

/// Stored contact values for this key are left in place
pub async fn delete_definition(conn: AsyncDbConnection, key: &str) -> Result<bool> {
    let conn = conn.lock().await?;
    let deleted = conn.execute("DELETE FROM custom_field_definitions WHERE key = ?1", [key])?;
    Ok(deleted > 0)
}
