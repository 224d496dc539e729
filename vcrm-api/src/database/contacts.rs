use crate::database::companies::get_or_create_company_in;
use crate::database::AsyncDbConnection;
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use shared_types::{Contact, CreateContactRequest};

const CONTACT_COLUMNS: &str = "id, first_name, last_name, email, phone, organization, job_title,
    linkedin_url, birthday, tags, is_favorite, notes, company_id, custom_fields,
    created_at, updated_at";

fn json_column<T: serde::de::DeserializeOwned>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn date_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_contact(row: &rusqlite::Row) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        organization: row.get(5)?,
        job_title: row.get(6)?,
        linkedin_url: row.get(7)?,
        birthday: date_column(row, 8)?,
        tags: json_column(row, 9)?,
        is_favorite: row.get(10)?,
        notes: row.get(11)?,
        company_id: row.get(12)?,
        custom_fields: json_column(row, 13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

fn birthday_text(birthday: Option<NaiveDate>) -> Option<String> {
    birthday.map(|d| d.format("%Y-%m-%d").to_string())
}

fn company_for(conn: &Connection, organization: &str) -> rusqlite::Result<Option<i64>> {
    let organization = organization.trim();
    if organization.is_empty() {
        return Ok(None);
    }
    get_or_create_company_in(conn, organization).map(Some)
}

/// Inserts one contact on an already locked connection, linking its company
pub fn insert_contact_in(conn: &Connection, request: &CreateContactRequest) -> Result<i64> {
    let now = chrono::Utc::now().timestamp();
    let company_id = company_for(conn, &request.organization)?;

    let id: i64 = conn.query_row(
        "INSERT INTO contacts
         (first_name, last_name, email, phone, organization, job_title, linkedin_url,
          birthday, tags, is_favorite, notes, company_id, custom_fields, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
         RETURNING id",
        rusqlite::params![
            &request.first_name,
            &request.last_name,
            &request.email,
            &request.phone,
            &request.organization,
            &request.job_title,
            &request.linkedin_url,
            birthday_text(request.birthday),
            serde_json::to_string(&request.tags)?,
            request.is_favorite,
            &request.notes,
            company_id,
            serde_json::to_string(&request.custom_fields)?,
            now,
            now
        ],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Case-insensitive (ASCII, as `COLLATE NOCASE`); empty emails never match.
/// `exclude_id` leaves one contact out, for updates.
pub fn email_exists_in(conn: &Connection, email: &str, exclude_id: Option<i64>) -> Result<bool> {
    if email.trim().is_empty() {
        return Ok(false);
    }

    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM contacts
             WHERE email = ?1 COLLATE NOCASE AND (?2 IS NULL OR id != ?2)
             LIMIT 1",
            rusqlite::params![email.trim(), exclude_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(found.is_some())
}

/// `None` when another contact already uses the email
pub async fn insert_contact(
    conn: AsyncDbConnection,
    request: &CreateContactRequest,
) -> Result<Option<i64>> {
    let conn = conn.lock().await?;

    if email_exists_in(&conn, &request.email, None)? {
        return Ok(None);
    }

    insert_contact_in(&conn, request).map(Some)
}

pub async fn get_contact(conn: AsyncDbConnection, id: i64) -> Result<Option<Contact>> {
    let conn = conn.lock().await?;

    let contact = conn
        .query_row(
            &format!("SELECT {} FROM contacts WHERE id = ?1", CONTACT_COLUMNS),
            [id],
            map_contact,
        )
        .optional()?;

    Ok(contact)
}

/// Newest first. `search` matches name, email and organization.
pub async fn list_contacts(
    conn: AsyncDbConnection,
    search: Option<&str>,
    limit: usize,
) -> Result<Vec<Contact>> {
    let conn = conn.lock().await?;
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s));

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM contacts
         WHERE ?1 IS NULL
            OR first_name LIKE ?1 OR last_name LIKE ?1
            OR email LIKE ?1 OR organization LIKE ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
        CONTACT_COLUMNS
    ))?;

    let contacts = stmt
        .query_map(rusqlite::params![pattern, limit as i64], map_contact)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(contacts)
}

/// Writes every stored column of `contact` back and returns the saved row.
/// `None` when another contact already uses the email.
pub async fn save_contact(conn: AsyncDbConnection, contact: &Contact) -> Result<Option<Contact>> {
    let conn = conn.lock().await?;
    if email_exists_in(&conn, &contact.email, Some(contact.id))? {
        return Ok(None);
    }

    let now = chrono::Utc::now().timestamp();
    let company_id = company_for(&conn, &contact.organization)?;

    let saved = conn.query_row(
        &format!(
            "UPDATE contacts SET
                first_name = ?1, last_name = ?2, email = ?3, phone = ?4, organization = ?5,
                job_title = ?6, linkedin_url = ?7, birthday = ?8, tags = ?9, is_favorite = ?10,
                notes = ?11, company_id = ?12, custom_fields = ?13, updated_at = ?14
             WHERE id = ?15
             RETURNING {}",
            CONTACT_COLUMNS
        ),
        rusqlite::params![
            &contact.first_name,
            &contact.last_name,
            &contact.email,
            &contact.phone,
            &contact.organization,
            &contact.job_title,
            &contact.linkedin_url,
            birthday_text(contact.birthday),
            serde_json::to_string(&contact.tags)?,
            contact.is_favorite,
            &contact.notes,
            company_id,
            serde_json::to_string(&contact.custom_fields)?,
            now,
            contact.id
        ],
        map_contact,
    )?;

    Ok(Some(saved))
}

/// Returns false when there was no such contact
pub async fn delete_contact(conn: AsyncDbConnection, id: i64) -> Result<bool> {
    let conn = conn.lock().await?;
    let deleted = conn.execute("DELETE FROM contacts WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::run_migrations;
    use shared_types::FieldValue;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_read_back() {
        let conn = connection();
        let mut request = CreateContactRequest {
            first_name: "Ada".into(),
            email: "ada@example.com".into(),
            organization: "Analytical Engines".into(),
            tags: vec!["math".into()],
            birthday: NaiveDate::from_ymd_opt(1815, 12, 10),
            ..Default::default()
        };
        request
            .custom_fields
            .insert("deal_size".into(), FieldValue::Integer(1234));

        let id = insert_contact_in(&conn, &request).unwrap();
        let contact = conn
            .query_row(
                &format!("SELECT {} FROM contacts WHERE id = ?1", CONTACT_COLUMNS),
                [id],
                map_contact,
            )
            .unwrap();

        assert_eq!(contact.first_name, "Ada");
        assert_eq!(contact.tags, vec!["math".to_string()]);
        assert_eq!(contact.birthday, request.birthday);
        assert!(contact.company_id.is_some());
        assert_eq!(
            contact.custom_fields.get("deal_size"),
            Some(&FieldValue::Integer(1234))
        );
    }

    #[test]
    fn test_email_exists_ignores_case_and_empty() {
        let conn = connection();
        let ada = insert_contact_in(
            &conn,
            &CreateContactRequest {
                first_name: "Ada".into(),
                email: "Ada@Example.com".into(),
                ..Default::default()
            },
        )
        .unwrap();
        insert_contact_in(
            &conn,
            &CreateContactRequest {
                first_name: "Nobody".into(),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(email_exists_in(&conn, "ada@example.com", None).unwrap());
        assert!(!email_exists_in(&conn, "ada@example.com", Some(ada)).unwrap());
        assert!(!email_exists_in(&conn, "", None).unwrap());
        assert!(!email_exists_in(&conn, "grace@example.com", None).unwrap());
    }
}
