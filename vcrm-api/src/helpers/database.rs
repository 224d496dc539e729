use crate::config::ApiConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Returns the path to the vcrm database
///
/// Uses `[database] path` from the config when set, otherwise the platform
/// data directory:
///
/// - **macOS**: `~/Library/Application Support/vcrm/vcrm.sqlite3`
/// - **Linux**: `~/.local/share/vcrm/vcrm.sqlite3`
/// - **Windows**: `%LOCALAPPDATA%\vcrm\vcrm.sqlite3`
pub fn get_db_path(config: &ApiConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = &config.database.path {
        return Ok(path.clone());
    }

    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("vcrm").join("vcrm.sqlite3"))
}

/// Initialize the database connection
pub fn initialize_database(config: &ApiConfig) -> anyhow::Result<Arc<crate::database::Database>> {
    let db_path = get_db_path(config)?;
    let db = crate::database::Database::new(&db_path)?;
    tracing::info!("Database initialized at: {}", db_path.display());
    Ok(Arc::new(db))
}
