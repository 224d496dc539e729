use actix_web::{web, HttpResponse, Result};
use shared_types::{LoginRequest, LoginResponse, RegisterRequest};
use std::sync::Arc;

use super::ApiError;
use crate::database::users as db;
use crate::database::Database;
use crate::helpers::password::{generate_salt, hash_password, verify_password};
use crate::helpers::session::Session;

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    database: web::Data<Arc<Database>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();
    let email = req.email.trim();

    if !email.contains('@') {
        return Err(ApiError::Validation("A valid email is required".to_string()).into());
    }
    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Name cannot be empty".to_string()).into());
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ))
        .into());
    }

    let salt = generate_salt();
    let hash = hash_password(&req.password, &salt);

    let user = db::insert_user(
        database.async_connection.clone(),
        email,
        req.name.trim(),
        &hash,
        &salt,
    )
    .await
    .map_err(|e| match e {
        db::UserDbError::DuplicateEmail => {
            ApiError::Conflict("A user with this email already exists".to_string())
        }
        db::UserDbError::DatabaseError(msg) => ApiError::Internal(msg),
    })?;

    tracing::info!(user_id = user.id, admin = user.is_admin, "Registered user");

    Ok(HttpResponse::Created().json(user))
}

pub async fn login(
    database: web::Data<Arc<Database>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    let credentials = db::find_credentials(database.async_connection.clone(), req.email.trim())
        .await
        .map_err(ApiError::from)?
        .filter(|c| verify_password(&req.password, &c.password_salt, &c.password_hash))
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !credentials.user.is_approved {
        return Err(ApiError::Forbidden("Account is waiting for admin approval".to_string()).into());
    }

    let token = db::create_session(database.async_connection.clone(), credentials.user.id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user: credentials.user,
    }))
}

pub async fn me(session: Session) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(session.user))
}

pub async fn logout(
    database: web::Data<Arc<Database>>,
    session: Session,
) -> Result<HttpResponse> {
    db::delete_session(database.async_connection.clone(), &session.token)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::NoContent().finish())
}
