use crate::database::AsyncDbConnection;
use anyhow::Result;
use rusqlite::types::Type;
use rusqlite::OptionalExtension;
use shared_types::{CreateTaskRequest, Task, TaskPriority, TaskStatus, UpdateTaskRequest};

const TASK_COLUMNS: &str =
    "id, contact_id, title, description, status, priority, due_date, created_at, updated_at";

fn enum_error(idx: usize, value: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        Type::Text,
        format!("Unexpected value '{}'", value).into(),
    )
}

fn map_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let status: String = row.get(4)?;
    let priority: String = row.get(5)?;

    Ok(Task {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: TaskStatus::parse(&status).ok_or_else(|| enum_error(4, status.clone()))?,
        priority: TaskPriority::parse(&priority).ok_or_else(|| enum_error(5, priority.clone()))?,
        due_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub async fn insert_task(conn: AsyncDbConnection, request: &CreateTaskRequest) -> Result<Task> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let task = conn.query_row(
        &format!(
            "INSERT INTO tasks (contact_id, title, description, status, priority, due_date, created_at, updated_at)
             VALUES (?1, ?2, ?3, 'todo', ?4, ?5, ?6, ?7)
             RETURNING {}",
            TASK_COLUMNS
        ),
        rusqlite::params![
            request.contact_id,
            request.title.trim(),
            request.description.as_ref(),
            request.priority.as_str(),
            request.due_date.as_ref(),
            now,
            now
        ],
        map_task,
    )?;

    Ok(task)
}

pub async fn list_tasks(conn: AsyncDbConnection, contact_id: Option<i64>) -> Result<Vec<Task>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM tasks
         WHERE ?1 IS NULL OR contact_id = ?1
         ORDER BY due_date IS NULL, due_date, created_at DESC",
        TASK_COLUMNS
    ))?;

    let tasks = stmt
        .query_map([contact_id], map_task)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tasks)
}

/// `None` when the task does not exist
pub async fn update_task(
    conn: AsyncDbConnection,
    id: i64,
    request: &UpdateTaskRequest,
) -> Result<Option<Task>> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let task = conn
        .query_row(
            &format!(
                "UPDATE tasks SET
                    title = COALESCE(?1, title),
                    description = COALESCE(?2, description),
                    status = COALESCE(?3, status),
                    priority = COALESCE(?4, priority),
                    due_date = COALESCE(?5, due_date),
                    updated_at = ?6
                 WHERE id = ?7
                 RETURNING {}",
                TASK_COLUMNS
            ),
            rusqlite::params![
                request.title.as_ref(),
                request.description.as_ref(),
                request.status.map(|s| s.as_str()),
                request.priority.map(|p| p.as_str()),
                request.due_date.as_ref(),
                now,
                id
            ],
            map_task,
        )
        .optional()?;

    Ok(task)
}

pub async fn delete_task(conn: AsyncDbConnection, id: i64) -> Result<bool> {
    let conn = conn.lock().await?;
    let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}
