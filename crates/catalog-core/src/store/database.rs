//! SQLite connection provider for the catalog.
//!
//! Each operation opens its own connection and drops it when it returns, so
//! callers never manage connection lifetime and a failed statement never
//! leaves a connection behind.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::config::StoreConfig;
use crate::errors::CatalogResult;
use crate::store::schema;

/// Replace a leading `~` component with `$HOME`. `~user` forms are left
/// as they are.
fn home_relative(path: &Path) -> PathBuf {
    let (Ok(rest), Some(home)) = (path.strip_prefix("~"), std::env::var_os("HOME")) else {
        return path.to_path_buf();
    };
    if rest.as_os_str().is_empty() {
        PathBuf::from(home)
    } else {
        Path::new(&home).join(rest)
    }
}

/// Handle on the catalog database file. Cheap to clone; holds no connection.
#[derive(Debug, Clone)]
pub struct CatalogDb {
    db_path: PathBuf,
    config: StoreConfig,
}

impl CatalogDb {
    /// Validate `config`, resolve `config.db_path` (home prefix, relative to
    /// cwd), and create its parent directory if needed.
    pub fn open(config: StoreConfig) -> CatalogResult<Self> {
        config.validate()?;
        let expanded = home_relative(&config.db_path);
        let resolved = if expanded.is_absolute() {
            expanded
        } else {
            std::env::current_dir()?.join(&expanded)
        };
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            db_path: resolved,
            config,
        })
    }

    pub fn at_path(db_path: impl Into<PathBuf>) -> CatalogResult<Self> {
        Self::open(StoreConfig::with_db_path(db_path))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Open a fresh connection with the configured busy timeout and
    /// foreign-key pragma.
    pub fn connect(&self) -> CatalogResult<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))?;
        let fk = if self.config.enforce_foreign_keys {
            "ON"
        } else {
            "OFF"
        };
        conn.execute_batch(&format!("PRAGMA foreign_keys = {fk};"))?;
        Ok(conn)
    }

    /// Set the journal mode and create the catalog tables if missing.
    pub fn init_schema(&self) -> CatalogResult<()> {
        let conn = self.connect()?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};",
            self.config.journal_mode.pragma_value()
        ))?;
        schema::create_schema(&conn)?;
        debug!(path = %self.db_path.display(), "catalog schema ready");
        Ok(())
    }
}
