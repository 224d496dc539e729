use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use shared_types::UsersResponse;
use std::sync::Arc;

use super::ApiError;
use crate::database::users as db;
use crate::database::Database;
use crate::helpers::session::Session;

#[derive(Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pending: bool,
}

pub async fn list_users(
    database: web::Data<Arc<Database>>,
    session: Session,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse> {
    session.require_admin()?;

    let users = db::list_users(database.async_connection.clone(), query.pending)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(UsersResponse { users }))
}

pub async fn approve_user(
    database: web::Data<Arc<Database>>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    session.require_admin()?;
    let user_id = path.into_inner();

    let user = db::approve_user(database.async_connection.clone(), user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id, approved_by = session.user.id, "Approved user");

    Ok(HttpResponse::Ok().json(user))
}
