use crate::database::AsyncDbConnection;
use anyhow::Result;
use rusqlite::OptionalExtension;
use shared_types::User;

const USER_COLUMNS: &str = "id, email, name, is_admin, is_approved, created_at";

fn map_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        is_admin: row.get(3)?,
        is_approved: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Stored password material for one user
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
    pub password_salt: String,
}

#[derive(Debug)]
pub enum UserDbError {
    DuplicateEmail,
    DatabaseError(String),
}

impl std::fmt::Display for UserDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserDbError::DuplicateEmail => write!(f, "A user with this email already exists"),
            UserDbError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for UserDbError {}

/// The first user ever registered becomes an approved admin
pub async fn insert_user(
    conn: AsyncDbConnection,
    email: &str,
    name: &str,
    password_hash: &str,
    password_salt: &str,
) -> Result<User, UserDbError> {
    let conn = conn
        .lock()
        .await
        .map_err(|e| UserDbError::DatabaseError(e.to_string()))?;
    let now = chrono::Utc::now().timestamp();

    // One statement, so the emptiness check and the insert cannot interleave
    // with another registration
    let inserted = conn.query_row(
        &format!(
            "INSERT INTO users (email, name, password_hash, password_salt, is_admin, is_approved, created_at)
             SELECT ?1, ?2, ?3, ?4, first_user, first_user, ?5
             FROM (SELECT NOT EXISTS (SELECT 1 FROM users) AS first_user)
             RETURNING {}",
            USER_COLUMNS
        ),
        rusqlite::params![email, name, password_hash, password_salt, now],
        map_user,
    );

    match inserted {
        Ok(user) => Ok(user),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Err(UserDbError::DuplicateEmail)
        }
        Err(e) => Err(UserDbError::DatabaseError(e.to_string())),
    }
}

pub async fn find_credentials(conn: AsyncDbConnection, email: &str) -> Result<Option<Credentials>> {
    let conn = conn.lock().await?;

    let credentials = conn
        .query_row(
            &format!(
                "SELECT {}, password_hash, password_salt FROM users WHERE email = ?1 COLLATE NOCASE",
                USER_COLUMNS
            ),
            [email],
            |row| {
                Ok(Credentials {
                    user: map_user(row)?,
                    password_hash: row.get(6)?,
                    password_salt: row.get(7)?,
                })
            },
        )
        .optional()?;

    Ok(credentials)
}

pub async fn list_users(conn: AsyncDbConnection, pending_only: bool) -> Result<Vec<User>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users WHERE ?1 = 0 OR is_approved = 0 ORDER BY created_at, id",
        USER_COLUMNS
    ))?;

    let users = stmt
        .query_map([pending_only], map_user)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(users)
}

/// `None` when the user does not exist
pub async fn approve_user(conn: AsyncDbConnection, id: i64) -> Result<Option<User>> {
    let conn = conn.lock().await?;

    let user = conn
        .query_row(
            &format!(
                "UPDATE users SET is_approved = 1 WHERE id = ?1 RETURNING {}",
                USER_COLUMNS
            ),
            [id],
            map_user,
        )
        .optional()?;

    Ok(user)
}

pub async fn create_session(conn: AsyncDbConnection, user_id: i64) -> Result<String> {
    let conn = conn.lock().await?;
    let token = uuid::Uuid::new_v4().simple().to_string();
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "INSERT INTO sessions (token, user_id, created_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![&token, user_id, now],
    )?;

    Ok(token)
}

pub async fn find_session_user(conn: AsyncDbConnection, token: &str) -> Result<Option<User>> {
    let conn = conn.lock().await?;

    let user = conn
        .query_row(
            "SELECT u.id, u.email, u.name, u.is_admin, u.is_approved, u.created_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
            [token],
            map_user,
        )
        .optional()?;

    Ok(user)
}

pub async fn delete_session(conn: AsyncDbConnection, token: &str) -> Result<()> {
    let conn = conn.lock().await?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
    Ok(())
}
