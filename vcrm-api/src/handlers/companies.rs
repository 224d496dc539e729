use actix_web::{web, HttpResponse, Result};
use shared_types::{CompaniesResponse, CreateCompanyRequest};
use std::sync::Arc;

use super::ApiError;
use crate::database::companies as db;
use crate::database::Database;
use crate::helpers::session::Session;

pub async fn list_companies(
    database: web::Data<Arc<Database>>,
    _session: Session,
) -> Result<HttpResponse> {
    let companies = db::list_companies(database.async_connection.clone(), 500)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(CompaniesResponse { companies }))
}

pub async fn get_company(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let company_id = path.into_inner();

    let company = db::get_company(database.async_connection.clone(), company_id)
        .await
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    Ok(HttpResponse::Ok().json(company))
}

pub async fn create_company(
    database: web::Data<Arc<Database>>,
    _session: Session,
    request: web::Json<CreateCompanyRequest>,
) -> Result<HttpResponse> {
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("Company name cannot be empty".to_string()).into());
    }

    let id = db::insert_company(database.async_connection.clone(), &request)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::Conflict(format!("Company '{}' already exists", request.name.trim())))?;

    let company = db::get_company(database.async_connection.clone(), id)
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Created().json(company))
}
