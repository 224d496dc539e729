use actix_web::{web, HttpResponse, Result};
use importers::custom_fields::{merge, split};
use serde::Deserialize;
use shared_types::{
    Contact, ContactFormResponse, ContactsResponse, CreateContactRequest, SaveContactFormRequest,
    UpdateContactRequest,
};
use std::sync::Arc;

use super::ApiError;
use crate::config::ImportConfig;
use crate::database::contacts as db;
use crate::database::custom_fields::list_definitions;
use crate::database::Database;
use crate::helpers::session::Session;

#[derive(Deserialize)]
pub struct ListContactsQuery {
    search: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    500
}

async fn load_contact(database: &Database, id: i64) -> std::result::Result<Contact, ApiError> {
    db::get_contact(database.async_connection.clone(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact not found".to_string()))
}

fn validate(contact_first_name: &str, email: &str) -> std::result::Result<(), ApiError> {
    if contact_first_name.trim().is_empty() {
        return Err(ApiError::Validation("First name is required".to_string()));
    }
    if !email.is_empty() && !email.contains('@') {
        return Err(ApiError::Validation("Email must contain '@'".to_string()));
    }
    Ok(())
}

pub async fn list_contacts(
    database: web::Data<Arc<Database>>,
    _session: Session,
    query: web::Query<ListContactsQuery>,
) -> Result<HttpResponse> {
    let contacts = db::list_contacts(
        database.async_connection.clone(),
        query.search.as_deref(),
        query.limit,
    )
    .await
    .map_err(ApiError::from)?;

    Ok(HttpResponse::Ok().json(ContactsResponse { contacts }))
}

fn email_taken(email: &str) -> ApiError {
    ApiError::Conflict(format!("Contact with email {} already exists", email))
}

pub async fn create_contact(
    database: web::Data<Arc<Database>>,
    _session: Session,
    request: web::Json<CreateContactRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();
    validate(&req.first_name, &req.email)?;

    let id = db::insert_contact(database.async_connection.clone(), &req)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| email_taken(&req.email))?;

    let contact = load_contact(&database, id).await?;
    Ok(HttpResponse::Created().json(contact))
}

pub async fn get_contact(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let contact = load_contact(&database, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(contact))
}

pub async fn update_contact(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<i64>,
    request: web::Json<UpdateContactRequest>,
) -> Result<HttpResponse> {
    let mut contact = load_contact(&database, path.into_inner()).await?;
    request.into_inner().apply(&mut contact);
    validate(&contact.first_name, &contact.email)?;

    let saved = db::save_contact(database.async_connection.clone(), &contact)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| email_taken(&contact.email))?;

    Ok(HttpResponse::Ok().json(saved))
}

pub async fn delete_contact(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let deleted = db::delete_contact(database.async_connection.clone(), path.into_inner())
        .await
        .map_err(ApiError::from)?;

    if !deleted {
        return Err(ApiError::NotFound("Contact not found".to_string()).into());
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Standard fields followed by the registered custom fields
pub async fn get_contact_form(
    database: web::Data<Arc<Database>>,
    _session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let contact = load_contact(&database, path.into_inner()).await?;
    let definitions = list_definitions(database.async_connection.clone())
        .await
        .map_err(ApiError::from)?;

    let form = split(&contact, &definitions);

    Ok(HttpResponse::Ok().json(ContactFormResponse {
        contact_id: contact.id,
        fields: form.into_fields(),
    }))
}

pub async fn save_contact_form(
    database: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    _session: Session,
    path: web::Path<i64>,
    request: web::Json<SaveContactFormRequest>,
) -> Result<HttpResponse> {
    let original = load_contact(&database, path.into_inner()).await?;
    let definitions = list_definitions(database.async_connection.clone())
        .await
        .map_err(ApiError::from)?;

    let contact = merge(
        &request.fields,
        &original,
        &definitions,
        import_config.orphan_policy,
    );
    validate(&contact.first_name, &contact.email)?;

    let saved = db::save_contact(database.async_connection.clone(), &contact)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| email_taken(&contact.email))?;

    Ok(HttpResponse::Ok().json(saved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;
    use shared_types::{CustomFieldType, FieldValue};

    #[actix_web::test]
    async fn test_contact_crud_and_form_round_trip() {
        let (_dir, db) = test_support::database();
        let (db_data, import_data) = test_support::app_data(&db);
        let token = test_support::admin_token(&db).await;
        crate::database::custom_fields::insert_definition(
            db.async_connection.clone(),
            "shirt_size",
            "Shirt size",
            CustomFieldType::Select,
            &["S".to_string(), "M".to_string()],
        )
        .await
        .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(db_data)
                .app_data(import_data)
                .route("/api/contacts", web::post().to(create_contact))
                .route("/api/contacts", web::get().to(list_contacts))
                .route("/api/contacts/{id}", web::delete().to(delete_contact))
                .route("/api/contacts/{id}/form", web::get().to(get_contact_form))
                .route("/api/contacts/{id}/form", web::put().to(save_contact_form)),
        )
        .await;
        let auth = ("Authorization", format!("Bearer {}", token));

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(auth.clone())
            .set_json(json!({"first_name": "Ada", "email": "ada@example.com", "organization": "Acme"}))
            .to_request();
        let created: Contact = test::call_and_read_body_json(&app, req).await;
        assert!(created.company_id.is_some());

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(auth.clone())
            .set_json(json!({"first_name": "Ada again", "email": "ADA@example.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/contacts/{}/form", created.id))
            .insert_header(auth.clone())
            .to_request();
        let form: ContactFormResponse = test::call_and_read_body_json(&app, req).await;
        let last = form.fields.last().unwrap();
        assert_eq!(last.key, "custom_shirt_size");
        assert_eq!(last.value, None);

        let req = test::TestRequest::put()
            .uri(&format!("/api/contacts/{}/form", created.id))
            .insert_header(auth.clone())
            .set_json(json!({"fields": {"custom_shirt_size": "M", "job_title": "Analyst"}}))
            .to_request();
        let saved: Contact = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved.job_title, "Analyst");
        assert_eq!(saved.email, "ada@example.com");
        assert_eq!(
            saved.custom_fields.get("shirt_size"),
            Some(&FieldValue::text("M"))
        );

        let req = test::TestRequest::delete()
            .uri(&format!("/api/contacts/{}", created.id))
            .insert_header(auth.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/api/contacts/{}/form", created.id))
            .insert_header(auth)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_edits_cannot_take_another_contacts_email() {
        let (_dir, db) = test_support::database();
        let (db_data, import_data) = test_support::app_data(&db);
        let token = test_support::admin_token(&db).await;
        let app = test::init_service(
            App::new()
                .app_data(db_data)
                .app_data(import_data)
                .route("/api/contacts", web::post().to(create_contact))
                .route("/api/contacts/{id}", web::put().to(update_contact))
                .route("/api/contacts/{id}/form", web::put().to(save_contact_form)),
        )
        .await;
        let auth = ("Authorization", format!("Bearer {}", token));

        let mut ids = Vec::new();
        for (name, email) in [("Ada", "ada@example.com"), ("Grace", "grace@example.com")] {
            let req = test::TestRequest::post()
                .uri("/api/contacts")
                .insert_header(auth.clone())
                .set_json(json!({"first_name": name, "email": email}))
                .to_request();
            let created: Contact = test::call_and_read_body_json(&app, req).await;
            ids.push(created.id);
        }

        let req = test::TestRequest::put()
            .uri(&format!("/api/contacts/{}", ids[1]))
            .insert_header(auth.clone())
            .set_json(json!({"email": "ADA@example.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::put()
            .uri(&format!("/api/contacts/{}/form", ids[1]))
            .insert_header(auth.clone())
            .set_json(json!({"fields": {"email": "ada@example.com"}}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        // changing only the case of your own email is fine
        let req = test::TestRequest::put()
            .uri(&format!("/api/contacts/{}", ids[0]))
            .insert_header(auth)
            .set_json(json!({"email": "Ada@Example.com"}))
            .to_request();
        let saved: Contact = test::call_and_read_body_json(&app, req).await;
        assert_eq!(saved.email, "Ada@Example.com");
    }

    #[actix_web::test]
    async fn test_contacts_require_a_session() {
        let (_dir, db) = test_support::database();
        let (db_data, _) = test_support::app_data(&db);
        let app = test::init_service(
            App::new()
                .app_data(db_data)
                .route("/api/contacts", web::get().to(list_contacts)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/contacts").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
