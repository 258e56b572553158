//! Store configuration loaded from TOML and overridden by `CATALOG_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::{CatalogError, CatalogResult};

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Longest company cache TTL accepted from config: one day.
pub const MAX_CACHE_TTL_SECONDS: f64 = 86_400.0;

/// SQLite journal mode applied by `init_schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
}

impl JournalMode {
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
        }
    }

    fn parse(value: &str) -> CatalogResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "wal" => Ok(Self::Wal),
            "delete" => Ok(Self::Delete),
            other => Err(CatalogError::Config(format!(
                "unknown journal mode '{other}'"
            ))),
        }
    }
}

/// Sizing for the optional company lookup cache.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompanyCacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
    pub ttl_seconds: f64,
}

impl CompanyCacheConfig {
    /// `ttl_seconds` must be a finite, non-negative number of seconds no
    /// larger than [`MAX_CACHE_TTL_SECONDS`].
    pub fn validate(&self) -> CatalogResult<()> {
        let ttl = self.ttl_seconds;
        if !ttl.is_finite() || ttl < 0.0 || ttl > MAX_CACHE_TTL_SECONDS {
            return Err(CatalogError::Config(format!(
                "company_cache.ttl_seconds must be between 0 and {MAX_CACHE_TTL_SECONDS}, got {ttl}"
            )));
        }
        Ok(())
    }
}

impl Default for CompanyCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 512,
            ttl_seconds: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// How long an operation waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    pub journal_mode: JournalMode,
    /// Off by default: `update` must accept company ids the company table
    /// does not know about.
    pub enforce_foreign_keys: bool,
    pub company_cache: CompanyCacheConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("catalog.db"),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: JournalMode::default(),
            enforce_foreign_keys: false,
            company_cache: CompanyCacheConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> CatalogResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CatalogError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        self.company_cache.validate()
    }

    /// Read a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> CatalogResult<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `CATALOG_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> CatalogResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CATALOG_DB_PATH") {
            if !path.trim().is_empty() {
                self.db_path = PathBuf::from(path.trim());
            }
        }
        if let Some(raw) = lookup("CATALOG_BUSY_TIMEOUT_MS") {
            self.busy_timeout_ms = raw.trim().parse::<u64>().map_err(|_| {
                CatalogError::Config(format!("CATALOG_BUSY_TIMEOUT_MS is not a number: '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup("CATALOG_JOURNAL_MODE") {
            self.journal_mode = JournalMode::parse(&raw)?;
        }
        if let Some(raw) = lookup("CATALOG_FOREIGN_KEYS") {
            let v = raw.trim().to_lowercase();
            self.enforce_foreign_keys = matches!(v.as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(raw) = lookup("CATALOG_COMPANY_CACHE_TTL_SECONDS") {
            self.company_cache.ttl_seconds = raw.trim().parse::<f64>().map_err(|_| {
                CatalogError::Config(format!(
                    "CATALOG_COMPANY_CACHE_TTL_SECONDS is not a number: '{raw}'"
                ))
            })?;
        }
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_leave_foreign_keys_off() {
        let config = StoreConfig::default();
        assert!(!config.enforce_foreign_keys);
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert_eq!(config.journal_mode, JournalMode::Wal);
    }

    #[test]
    fn parses_partial_toml() {
        let config = StoreConfig::from_toml_str(
            r#"
            db_path = "/var/lib/catalog/computers.db"
            journal_mode = "delete"

            [company_cache]
            enabled = true
            max_entries = 64
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/catalog/computers.db"));
        assert_eq!(config.journal_mode, JournalMode::Delete);
        assert!(config.company_cache.enabled);
        assert_eq!(config.company_cache.max_entries, 64);
        assert_eq!(config.company_cache.ttl_seconds, 15.0);
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn rejects_unknown_journal_mode_in_toml() {
        let err = StoreConfig::from_toml_str("journal_mode = \"memory\"").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("CATALOG_DB_PATH", "/tmp/other.db"),
            ("CATALOG_BUSY_TIMEOUT_MS", "250"),
            ("CATALOG_FOREIGN_KEYS", "on"),
            ("CATALOG_JOURNAL_MODE", "DELETE"),
        ]
        .into_iter()
        .collect();
        let mut config = StoreConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.busy_timeout_ms, 250);
        assert!(config.enforce_foreign_keys);
        assert_eq!(config.journal_mode, JournalMode::Delete);
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let mut config = StoreConfig::default();
        let err = config
            .apply_overrides(|k| (k == "CATALOG_BUSY_TIMEOUT_MS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn out_of_range_cache_ttl_is_a_config_error() {
        for ttl in ["inf", "-inf", "nan", "1e300", "-1.0"] {
            let toml = format!("[company_cache]\nenabled = true\nttl_seconds = {ttl}\n");
            let err = StoreConfig::from_toml_str(&toml).unwrap_err();
            assert!(matches!(err, CatalogError::Config(_)), "ttl {ttl}: {err}");
        }
        let config =
            StoreConfig::from_toml_str("[company_cache]\nttl_seconds = 86400.0\n").unwrap();
        assert_eq!(config.company_cache.ttl_seconds, MAX_CACHE_TTL_SECONDS);
    }

    #[test]
    fn cache_ttl_override_is_validated() {
        let mut config = StoreConfig::default();
        config
            .apply_overrides(|k| (k == "CATALOG_COMPANY_CACHE_TTL_SECONDS").then(|| "2.5".to_string()))
            .unwrap();
        assert_eq!(config.company_cache.ttl_seconds, 2.5);
        let err = config
            .apply_overrides(|k| (k == "CATALOG_COMPANY_CACHE_TTL_SECONDS").then(|| "inf".to_string()))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, "busy_timeout_ms = 1200\n").unwrap();
        let config = StoreConfig::load(&path).unwrap();
        // CATALOG_BUSY_TIMEOUT_MS is not expected in the test environment.
        if std::env::var("CATALOG_BUSY_TIMEOUT_MS").is_err() {
            assert_eq!(config.busy_timeout_ms, 1200);
        }
    }
}
