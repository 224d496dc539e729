use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email VARCHAR NOT NULL UNIQUE COLLATE NOCASE,
            name VARCHAR NOT NULL,
            password_hash VARCHAR NOT NULL,
            password_salt VARCHAR NOT NULL,
            is_admin BOOLEAN NOT NULL DEFAULT 0,
            is_approved BOOLEAN NOT NULL DEFAULT 0,
            created_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS sessions (
            token VARCHAR PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at BIGINT NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS companies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name VARCHAR NOT NULL UNIQUE COLLATE NOCASE,
            industry VARCHAR,
            website VARCHAR,
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL
        )",
        [],
    )?;

    // Custom values are a JSON object keyed by bare definition key
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name VARCHAR NOT NULL,
            last_name VARCHAR NOT NULL DEFAULT '',
            email VARCHAR NOT NULL DEFAULT '',
            phone VARCHAR NOT NULL DEFAULT '',
            organization VARCHAR NOT NULL DEFAULT '',
            job_title VARCHAR NOT NULL DEFAULT '',
            linkedin_url VARCHAR NOT NULL DEFAULT '',
            birthday VARCHAR,
            tags VARCHAR NOT NULL DEFAULT '[]',
            is_favorite BOOLEAN NOT NULL DEFAULT 0,
            notes VARCHAR NOT NULL DEFAULT '',
            company_id INTEGER,
            custom_fields VARCHAR NOT NULL DEFAULT '{}',
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL,
            FOREIGN KEY (company_id) REFERENCES companies (id) ON DELETE SET NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email COLLATE NOCASE)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contacts_company ON contacts(company_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER,
            title VARCHAR NOT NULL,
            description VARCHAR,
            status VARCHAR NOT NULL DEFAULT 'todo' CHECK (status IN ('todo', 'in-progress', 'done', 'cancelled')),
            priority VARCHAR NOT NULL DEFAULT 'medium' CHECK (priority IN ('low', 'medium', 'high')),
            due_date VARCHAR,
            created_at BIGINT NOT NULL,
            updated_at BIGINT NOT NULL,
            FOREIGN KEY (contact_id) REFERENCES contacts (id) ON DELETE SET NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_contact ON tasks(contact_id)",
        [],
    )?;

    // No foreign key from contacts: deleting a definition keeps stored values
    conn.execute(
        "CREATE TABLE IF NOT EXISTS custom_field_definitions (
            key VARCHAR PRIMARY KEY,
            name VARCHAR NOT NULL,
            field_type VARCHAR NOT NULL CHECK (field_type IN ('text', 'textarea', 'select', 'number', 'date', 'checkbox')),
            options VARCHAR NOT NULL DEFAULT '[]',
            position INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    Ok(())
}
