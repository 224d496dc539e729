use anyhow::{bail, Context};
use clap::Parser;
use importers::{ContactCsvImporter, ImportWizard, MemoryStore, ResolvedMapping, WizardStep};
use shared_types::{CsvColumnMapping, MappingTarget};
use std::path::PathBuf;

use vcrm_api::config::ApiConfig;
use vcrm_api::database::custom_fields::list_definitions_in;
use vcrm_api::database::import_store::SqliteContactStore;
use vcrm_api::helpers::database::initialize_database;

/// Import contacts from a CSV file into the local vcrm database
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to import
    file: PathBuf,

    /// Override a column mapping, e.g. `--map "Work Phone=phone"` or `--map "Shirt=custom_shirt_size"`
    #[arg(long = "map", value_parser = parse_override)]
    overrides: Vec<(String, MappingTarget)>,

    /// Import straight away when every column is recognised
    #[arg(long)]
    auto_import: bool,

    /// Run the whole pipeline against an in-memory store
    #[arg(long)]
    dry_run: bool,

    #[arg(long)]
    log_file_path: Option<String>,
}

fn parse_override(value: &str) -> Result<(String, MappingTarget), String> {
    let (header, target) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected HEADER=TARGET, got '{}'", value))?;
    let target = target.parse::<MappingTarget>().map_err(|e| e.to_string())?;
    Ok((header.trim().to_string(), target))
}

/// One line per column, showing the target the import will actually use
fn describe_mapping(mapping: &ResolvedMapping, unknown: &[String]) -> Vec<String> {
    mapping
        .columns()
        .iter()
        .map(|column| {
            let note = if unknown.contains(&column.header) {
                " (unrecognised)"
            } else {
                ""
            };
            format!("  {:<30} -> {}{}", column.header, column.target, note)
        })
        .collect()
}

fn init_tracing(log_file_path: Option<&str>) -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    match log_file_path {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file_path.as_deref())?;

    let (config, _) = ApiConfig::load().context("Failed to load config")?;
    let mut policy = config.import.wizard_policy();
    policy.auto_import_when_all_known |= args.auto_import;

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let overrides: CsvColumnMapping = args.overrides.into_iter().collect();

    let importer = ContactCsvImporter::new().with_max_rows(config.import.max_rows);
    let analysis = importer.analyze(&content)?;

    let db = initialize_database(&config)?;
    let conn = db.async_connection.lock().await?;
    let definitions = list_definitions_in(&conn)?;

    let mut wizard = ImportWizard::new(policy);
    if wizard.file_parsed(analysis.classification.clone())? == WizardStep::Mapping {
        let mapping = importer.resolve(&analysis, &overrides, &definitions);
        for line in describe_mapping(&mapping, &analysis.classification.unknown) {
            println!("{}", line);
        }
        wizard.start_import()?;
    }

    let outcome = if args.dry_run {
        let mut store = MemoryStore::default();
        importer.import_analyzed(&analysis, &overrides, &definitions, &mut store)
    } else {
        let mut store = SqliteContactStore::new(&conn);
        importer.import_analyzed(&analysis, &overrides, &definitions, &mut store)
    };

    match outcome {
        Ok(result) => {
            println!(
                "{}Imported {} of {} rows, skipped {}",
                if args.dry_run { "[dry run] " } else { "" },
                result.imported_count,
                result.total_rows,
                result.skipped_count
            );
            for error in &result.errors {
                println!("  {}", error);
            }
            wizard.import_succeeded(result)?;
            Ok(())
        }
        Err(e) => {
            wizard.import_failed(&e)?;
            bail!(
                "{}",
                wizard.last_error().unwrap_or("Import failed, nothing was saved")
            )
        }
    }
}
