use actix_web::{web, HttpResponse, Result};
use importers::{ContactCsvImporter, ImportError};
use shared_types::{
    ContactField, GetColumnsRequest, GetColumnsResponse, ImportResult, ImportWithMappingRequest,
    KnownColumn,
};
use std::sync::Arc;

use super::ApiError;
use crate::config::ImportConfig;
use crate::database::custom_fields::{list_definitions, list_definitions_in};
use crate::database::import_store::SqliteContactStore;
use crate::database::Database;
use crate::helpers::session::Session;

fn importer(config: &ImportConfig) -> ContactCsvImporter {
    ContactCsvImporter::new().with_max_rows(config.max_rows)
}

/// Problems with the uploaded file itself
fn input_error(e: ImportError) -> ApiError {
    ApiError::Validation(e.to_string())
}

pub async fn get_columns(
    database: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    _session: Session,
    request: web::Json<GetColumnsRequest>,
) -> Result<HttpResponse> {
    let analysis = importer(&import_config)
        .analyze(&request.csv_content)
        .map_err(input_error)?;

    let custom_fields = list_definitions(database.async_connection.clone())
        .await
        .map_err(ApiError::from)?;

    let classification = &analysis.classification;
    let can_import_directly =
        import_config.wizard_policy().auto_import_when_all_known && classification.all_known();

    Ok(HttpResponse::Ok().json(GetColumnsResponse {
        csv_columns: analysis.table.headers.clone(),
        known_columns: classification
            .known
            .iter()
            .map(|known| KnownColumn {
                header: known.header.clone(),
                target: known.target.to_string(),
            })
            .collect(),
        unknown_columns: classification.unknown.clone(),
        suggested_mapping: analysis.suggested.clone(),
        contact_fields: ContactField::ALL.iter().map(|f| f.descriptor()).collect(),
        custom_fields,
        total_rows: analysis.total_rows(),
        can_import_directly,
    }))
}

pub async fn import_with_mapping(
    database: web::Data<Arc<Database>>,
    import_config: web::Data<ImportConfig>,
    _session: Session,
    request: web::Json<ImportWithMappingRequest>,
) -> Result<HttpResponse> {
    let importer = importer(&import_config);
    let analysis = importer
        .analyze(&request.csv_content)
        .map_err(input_error)?;

    let conn = database
        .async_connection
        .lock()
        .await
        .map_err(ApiError::from)?;
    let definitions = list_definitions_in(&conn).map_err(ApiError::from)?;

    let mut store = SqliteContactStore::new(&conn);
    match importer.import_analyzed(&analysis, &request.mapping, &definitions, &mut store) {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => {
            tracing::error!("CSV import failed: {}", e);
            Ok(HttpResponse::InternalServerError().json(ImportResult {
                success: false,
                imported_count: 0,
                skipped_count: 0,
                total_rows: analysis.total_rows(),
                errors: vec![e.to_string()],
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::json;

    const SAMPLE: &str = "Full Name,E-mail,Company,Unknown Col XYZ\n\
                          John Doe,john@x.com,Acme,secret\n\
                          Jane,bad-email,Beta,secret\n";

    #[actix_web::test]
    async fn test_get_columns_then_import() {
        let (_dir, db) = test_support::database();
        let (db_data, import_data) = test_support::app_data(&db);
        let token = test_support::admin_token(&db).await;
        let app = test::init_service(
            App::new()
                .app_data(db_data)
                .app_data(import_data)
                .route("/csv/get-columns", web::post().to(get_columns))
                .route("/csv/import-with-mapping", web::post().to(import_with_mapping)),
        )
        .await;
        let auth = ("Authorization", format!("Bearer {}", token));

        let req = test::TestRequest::post()
            .uri("/csv/get-columns")
            .insert_header(auth.clone())
            .set_json(json!({"csv_content": SAMPLE}))
            .to_request();
        let columns: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(columns["total_rows"], 2);
        assert_eq!(columns["unknown_columns"], json!(["Unknown Col XYZ"]));
        assert_eq!(columns["suggested_mapping"]["E-mail"], "email");
        assert_eq!(columns["suggested_mapping"]["Unknown Col XYZ"], "skip");
        assert_eq!(columns["can_import_directly"], false);

        let req = test::TestRequest::post()
            .uri("/csv/import-with-mapping")
            .insert_header(auth.clone())
            .set_json(json!({"csv_content": SAMPLE, "mapping": {}}))
            .to_request();
        let result: ImportResult = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            result,
            ImportResult {
                success: true,
                imported_count: 2,
                skipped_count: 0,
                total_rows: 2,
                errors: vec![],
            }
        );

        // John's email is now taken; Jane has no email and is imported again
        let req = test::TestRequest::post()
            .uri("/csv/import-with-mapping")
            .insert_header(auth)
            .set_json(json!({"csv_content": SAMPLE}))
            .to_request();
        let again: ImportResult = test::call_and_read_body_json(&app, req).await;
        assert_eq!(again.imported_count, 1);
        assert_eq!(again.skipped_count, 1);
    }

    #[actix_web::test]
    async fn test_bad_uploads_are_rejected() {
        let (_dir, db) = test_support::database();
        let (db_data, _) = test_support::app_data(&db);
        let token = test_support::admin_token(&db).await;
        let tight = web::Data::new(ImportConfig {
            max_rows: 1,
            ..ImportConfig::default()
        });
        let app = test::init_service(
            App::new()
                .app_data(db_data)
                .app_data(tight)
                .route("/csv/import-with-mapping", web::post().to(import_with_mapping)),
        )
        .await;
        let auth = ("Authorization", format!("Bearer {}", token));

        for body in [
            json!({"csv_content": ""}),
            json!({"csv_content": SAMPLE}),
            json!({"csv_content": "First Name\nAda\n", "mapping": {"First Name": "favourite_colour"}}),
        ] {
            let req = test::TestRequest::post()
                .uri("/csv/import-with-mapping")
                .insert_header(auth.clone())
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }

        let req = test::TestRequest::post()
            .uri("/csv/import-with-mapping")
            .set_json(json!({"csv_content": SAMPLE}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
