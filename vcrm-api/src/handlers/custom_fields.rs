use actix_web::{web, HttpResponse, Result};
use shared_types::{slugify_key, ContactField, CreateCustomFieldRequest, CustomFieldsResponse};
use std::sync::Arc;

use super::ApiError;
use crate::database::custom_fields as db;
use crate::database::Database;
use crate::helpers::session::Session;

/// Keys a custom field may never take; they already mean something in a mapping
const RESERVED_KEYS: &[&str] = &["skip", "full_name"];

fn validate_key(key: &str) -> std::result::Result<(), ApiError> {
    if key.is_empty() {
        return Err(ApiError::Validation(
            "Custom field key must contain letters or digits".to_string(),
        ));
    }
    if ContactField::from_key(key).is_some() || RESERVED_KEYS.contains(&key) {
        return Err(ApiError::Validation(format!(
            "'{}' is a standard contact field",
            key
        )));
    }
    Ok(())
}

pub async fn list_custom_fields(
    database: web::Data<Arc<Database>>,
    _session: Session,
) -> Result<HttpResponse> {
    let custom_fields = db::list_definitions(database.async_connection.clone())
        .await
        .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(CustomFieldsResponse { custom_fields }))
}

pub async fn create_custom_field(
    database: web::Data<Arc<Database>>,
    _session: Session,
    request: web::Json<CreateCustomFieldRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    if req.name.trim().is_empty() {
        return Err(ApiError::Validation("Custom field name cannot be empty".to_string()).into());
    }

    let key = slugify_key(req.key.as_deref().unwrap_or(&req.name));
    validate_key(&key)?;

    let definition = db::insert_definition(
        database.async_connection.clone(),
        &key,
        req.name.trim(),
        req.field_type,
        &req.options,
    )
    .await
    .map_err(ApiError::from)?
    .ok_or_else(|| ApiError::Conflict(format!("Custom field '{}' already exists", key)))?;

    tracing::info!(key = %definition.key, "Created custom field");

    Ok(HttpResponse::Created().json(definition))
}

/// Values already stored on contacts are kept
pub async fn delete_custom_field(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let key = path.into_inner();

    let deleted = db::delete_definition(database.async_connection.clone(), &key)
        .await
        .map_err(ApiError::from)?;

    if !deleted {
        return Err(ApiError::NotFound("Custom field not found".to_string()).into());
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use shared_types::{CustomFieldDefinition, CustomFieldType};

    #[actix_web::test]
    async fn test_standard_keys_are_rejected() {
        assert!(validate_key("email").is_err());
        assert!(validate_key("full_name").is_err());
        assert!(validate_key("").is_err());
        assert!(validate_key("shirt_size").is_ok());
    }

    #[actix_web::test]
    async fn test_create_list_delete() {
        let (_dir, db) = test_support::database();
        let (db_data, _) = test_support::app_data(&db);
        let token = test_support::admin_token(&db).await;
        let app = test::init_service(
            App::new()
                .app_data(db_data)
                .route("/api/custom-fields", web::get().to(list_custom_fields))
                .route("/api/custom-fields", web::post().to(create_custom_field))
                .route("/api/custom-fields/{key}", web::delete().to(delete_custom_field)),
        )
        .await;
        let auth = ("Authorization", format!("Bearer {}", token));

        let req = test::TestRequest::post()
            .uri("/api/custom-fields")
            .insert_header(auth.clone())
            .set_json(json!({"name": "Deal Size", "field_type": "number"}))
            .to_request();
        let created: CustomFieldDefinition = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created.key, "deal_size");
        assert_eq!(created.field_type, CustomFieldType::Number);

        let req = test::TestRequest::post()
            .uri("/api/custom-fields")
            .insert_header(auth.clone())
            .set_json(json!({"name": "Deal size", "field_type": "text"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/custom-fields")
            .insert_header(auth.clone())
            .set_json(json!({"name": "E-mail", "key": "email", "field_type": "text"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete()
            .uri("/api/custom-fields/deal_size")
            .insert_header(auth.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri("/api/custom-fields")
            .insert_header(auth)
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["custom_fields"].as_array().map(|f| f.len()), Some(0));
    }
}
