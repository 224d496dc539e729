use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use shared_types::{CreateTaskRequest, TasksResponse, UpdateTaskRequest};
use std::sync::Arc;

use super::ApiError;
use crate::database::contacts::get_contact;
use crate::database::tasks as db;
use crate::database::Database;
use crate::helpers::session::Session;

#[derive(Deserialize)]
pub struct ListTasksQuery {
    contact_id: Option<i64>,
}

pub async fn list_tasks(
    database: web::Data<Arc<Database>>,
    _session: Session,
    query: web::Query<ListTasksQuery>,
) -> Result<HttpResponse> {
    let tasks = db::list_tasks(database.async_connection.clone(), query.contact_id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(TasksResponse { tasks }))
}

pub async fn create_task(
    database: web::Data<Arc<Database>>,
    _session: Session,
    request: web::Json<CreateTaskRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    if req.title.trim().is_empty() {
        return Err(ApiError::Validation("Task title cannot be empty".to_string()).into());
    }

    if let Some(contact_id) = req.contact_id {
        let contact = get_contact(database.async_connection.clone(), contact_id)
            .await
            .map_err(ApiError::from)?;
        if contact.is_none() {
            return Err(ApiError::Validation(format!("Contact {} does not exist", contact_id)).into());
        }
    }

    let task = db::insert_task(database.async_connection.clone(), &req)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(task))
}

pub async fn update_task(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<i64>,
    request: web::Json<UpdateTaskRequest>,
) -> Result<HttpResponse> {
    if matches!(&request.title, Some(title) if title.trim().is_empty()) {
        return Err(ApiError::Validation("Task title cannot be empty".to_string()).into());
    }

    let task = db::update_task(database.async_connection.clone(), path.into_inner(), &request)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(HttpResponse::Ok().json(task))
}

pub async fn delete_task(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let deleted = db::delete_task(database.async_connection.clone(), path.into_inner())
        .await
        .map_err(ApiError::from)?;

    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()).into());
    }

    Ok(HttpResponse::NoContent().finish())
}
