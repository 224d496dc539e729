use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

use vcrm_api::config::ApiConfig;
use vcrm_api::handlers::{
    admin, auth, companies, contacts, csv_import, custom_fields, tasks,
};
use vcrm_api::{helpers, Database};

#[get("/health")]
async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "status": "unhealthy",
                "database": "disconnected"
            }))
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn init_tracing(log_file_path: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("vcrm-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

fn cors(origins: &[String]) -> Cors {
    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
        .max_age(3600)
}

fn io_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let (config, config_path) = ApiConfig::load().map_err(io_error)?;

    if args.print_config {
        println!("# {}", config_path.display());
        println!("{}", config.to_toml().map_err(io_error)?);
        return Ok(());
    }

    init_tracing(args.log_file_path.as_deref());
    tracing::info!("Loaded config from {}", config_path.display());

    let db = helpers::database::initialize_database(&config).map_err(io_error)?;

    let host = config.server.host.clone();
    let port = config.server.port;
    let allowed_origins = config.cors.allowed_origins.clone();
    let import_config = web::Data::new(config.import.clone());

    tracing::info!("Starting server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origins))
            .app_data(web::Data::new(db.clone()))
            .app_data(import_config.clone())
            .service(health)
            .route("/auth/register", web::post().to(auth::register))
            .route("/auth/login", web::post().to(auth::login))
            .route("/auth/me", web::get().to(auth::me))
            .route("/auth/logout", web::post().to(auth::logout))
            .route("/api/admin/users", web::get().to(admin::list_users))
            .route("/api/admin/users/{id}/approve", web::post().to(admin::approve_user))
            .route("/api/contacts", web::get().to(contacts::list_contacts))
            .route("/api/contacts", web::post().to(contacts::create_contact))
            .route("/api/contacts/{id}", web::get().to(contacts::get_contact))
            .route("/api/contacts/{id}", web::put().to(contacts::update_contact))
            .route("/api/contacts/{id}", web::delete().to(contacts::delete_contact))
            .route("/api/contacts/{id}/form", web::get().to(contacts::get_contact_form))
            .route("/api/contacts/{id}/form", web::put().to(contacts::save_contact_form))
            .route("/api/companies", web::get().to(companies::list_companies))
            .route("/api/companies", web::post().to(companies::create_company))
            .route("/api/companies/{id}", web::get().to(companies::get_company))
            .route("/api/tasks", web::get().to(tasks::list_tasks))
            .route("/api/tasks", web::post().to(tasks::create_task))
            .route("/api/tasks/{id}", web::put().to(tasks::update_task))
            .route("/api/tasks/{id}", web::delete().to(tasks::delete_task))
            .route("/api/custom-fields", web::get().to(custom_fields::list_custom_fields))
            .route("/api/custom-fields", web::post().to(custom_fields::create_custom_field))
            .route("/api/custom-fields/{key}", web::delete().to(custom_fields::delete_custom_field))
            .route("/csv/get-columns", web::post().to(csv_import::get_columns))
            .route("/csv/import-with-mapping", web::post().to(csv_import::import_with_mapping))
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await
}
