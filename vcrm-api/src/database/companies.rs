use crate::database::AsyncDbConnection;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};
use shared_types::{Company, CreateCompanyRequest};

const COMPANY_COLUMNS: &str = "c.id, c.name, c.industry, c.website,
    (SELECT COUNT(*) FROM contacts WHERE company_id = c.id), c.created_at, c.updated_at";

fn map_company(row: &rusqlite::Row) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        industry: row.get(2)?,
        website: row.get(3)?,
        contact_count: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Looks a company up by name (case-insensitive), creating it when missing.
/// Takes a plain connection so it can run inside an import transaction.
pub fn get_or_create_company_in(conn: &Connection, name: &str) -> rusqlite::Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM companies WHERE name = ?1 COLLATE NOCASE",
            [name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let now = chrono::Utc::now().timestamp();
    conn.query_row(
        "INSERT INTO companies (name, created_at, updated_at) VALUES (?1, ?2, ?3) RETURNING id",
        rusqlite::params![name, now, now],
        |row| row.get(0),
    )
}

/// `None` when a company with the same name exists
pub async fn insert_company(
    conn: AsyncDbConnection,
    request: &CreateCompanyRequest,
) -> Result<Option<i64>> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let taken: Option<i64> = conn
        .query_row(
            "SELECT id FROM companies WHERE name = ?1 COLLATE NOCASE",
            [request.name.trim()],
            |row| row.get(0),
        )
        .optional()?;
    if taken.is_some() {
        return Ok(None);
    }

    let id: i64 = conn.query_row(
        "INSERT INTO companies (name, industry, website, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id",
        rusqlite::params![
            request.name.trim(),
            request.industry.as_ref(),
            request.website.as_ref(),
            now,
            now
        ],
        |row| row.get(0),
    )?;

    Ok(Some(id))
}

pub async fn get_company(conn: AsyncDbConnection, id: i64) -> Result<Company> {
    let conn = conn.lock().await?;

    conn.query_row(
        &format!("SELECT {} FROM companies c WHERE c.id = ?1", COMPANY_COLUMNS),
        [id],
        map_company,
    )
    .map_err(|e| anyhow::anyhow!("Failed to get company: {}", e))
}

pub async fn list_companies(conn: AsyncDbConnection, limit: usize) -> Result<Vec<Company>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM companies c ORDER BY c.name COLLATE NOCASE LIMIT ?1",
        COMPANY_COLUMNS
    ))?;

    let companies = stmt
        .query_map([limit as i64], map_company)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(companies)
}
