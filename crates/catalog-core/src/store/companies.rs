//! Company lookups used to hydrate computer rows.
//!
//! The catalog only reads companies. [`SqliteCompanyResolver`] serves them
//! from the `company` table and [`CachedCompanyResolver`] puts a bounded
//! LRU cache with a TTL in front of any resolver.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::debug;

use crate::config::MAX_CACHE_TTL_SECONDS;
use crate::errors::CatalogResult;
use crate::models::{Company, NO_COMPANY_ID};
use crate::store::database::CatalogDb;

/// Ids per `IN (...)` statement, kept well under SQLite's variable limit.
const LOOKUP_CHUNK: usize = 500;

/// Resolves a company id to a hydrated [`Company`].
pub trait CompanyResolver: Send + Sync {
    /// `Ok(None)` when no company has this id.
    fn lookup(&self, id: i64) -> CatalogResult<Option<Company>>;

    /// Resolve several ids at once. Ids with no company are left out of the
    /// returned map.
    fn lookup_many(&self, ids: &[i64]) -> CatalogResult<HashMap<i64, Company>> {
        let mut found = HashMap::with_capacity(ids.len());
        for &id in ids {
            if let Some(company) = self.lookup(id)? {
                found.insert(id, company);
            }
        }
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// SQLite-backed resolver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SqliteCompanyResolver {
    db: CatalogDb,
}

impl SqliteCompanyResolver {
    pub fn new(db: CatalogDb) -> Self {
        Self { db }
    }

    /// Every company ordered by id, for filling edit-form choices.
    pub fn list_companies(&self) -> CatalogResult<Vec<Company>> {
        let conn = self.db.connect()?;
        let mut stmt = conn.prepare("SELECT id, name FROM company ORDER BY id ASC;")?;
        let companies = stmt
            .query_map([], |row| Ok(Company::new(row.get(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(companies)
    }
}

impl CompanyResolver for SqliteCompanyResolver {
    fn lookup(&self, id: i64) -> CatalogResult<Option<Company>> {
        if id == NO_COMPANY_ID {
            return Ok(None);
        }
        let conn = self.db.connect()?;
        let company = conn
            .query_row(
                "SELECT id, name FROM company WHERE id = ?1;",
                params![id],
                |row| Ok(Company::new(row.get(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(company)
    }

    fn lookup_many(&self, ids: &[i64]) -> CatalogResult<HashMap<i64, Company>> {
        let wanted: Vec<i64> = ids.iter().copied().filter(|id| *id != NO_COMPANY_ID).collect();
        let mut found = HashMap::with_capacity(wanted.len());
        if wanted.is_empty() {
            return Ok(found);
        }
        let conn = self.db.connect()?;
        for chunk in wanted.chunks(LOOKUP_CHUNK) {
            let placeholders = (1..=chunk.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("SELECT id, name FROM company WHERE id IN ({placeholders});");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(chunk.iter()), |row| {
                Ok(Company::new(row.get(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let company = row?;
                found.insert(company.id, company);
            }
        }
        debug!(requested = wanted.len(), found = found.len(), "company batch lookup");
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Caching resolver
// ---------------------------------------------------------------------------

struct CacheEntry {
    value: Option<Company>,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

struct CacheState {
    entries: IndexMap<i64, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// LRU + TTL cache in front of another resolver. Misses are cached too, so
/// a dangling company id does not hit the store on every page.
pub struct CachedCompanyResolver {
    inner: Arc<dyn CompanyResolver>,
    max_entries: usize,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl CachedCompanyResolver {
    pub fn new(inner: Arc<dyn CompanyResolver>, max_entries: usize, ttl_seconds: f64) -> Self {
        Self {
            inner,
            max_entries: max_entries.max(1),
            ttl: Duration::try_from_secs_f64(ttl_seconds.clamp(0.1, MAX_CACHE_TTL_SECONDS))
                .unwrap_or(Duration::from_secs(1)),
            state: Mutex::new(CacheState {
                entries: IndexMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            entries: state.entries.len(),
            max_entries: self.max_entries,
            hits: state.hits,
            misses: state.misses,
        }
    }

    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Cached value for `id`, refreshing its LRU position. Outer `None`
    /// means "not cached".
    fn cached(state: &mut CacheState, id: i64, now: Instant) -> Option<Option<Company>> {
        let entry = state.entries.shift_remove(&id)?;
        if entry.expires_at <= now {
            return None;
        }
        let value = entry.value.clone();
        state.entries.insert(id, entry);
        Some(value)
    }

    fn store(&self, state: &mut CacheState, id: i64, value: Option<Company>) {
        let Some(expires_at) = Instant::now().checked_add(self.ttl) else {
            return;
        };
        state.entries.insert(id, CacheEntry { value, expires_at });
        while state.entries.len() > self.max_entries {
            state.entries.shift_remove_index(0);
        }
    }
}

impl CompanyResolver for CachedCompanyResolver {
    fn lookup(&self, id: i64) -> CatalogResult<Option<Company>> {
        {
            let mut state = self.state.lock();
            if let Some(value) = Self::cached(&mut state, id, Instant::now()) {
                state.hits += 1;
                return Ok(value);
            }
            state.misses += 1;
        }
        // The lock is not held across the inner lookup.
        let value = self.inner.lookup(id)?;
        let mut state = self.state.lock();
        self.store(&mut state, id, value.clone());
        Ok(value)
    }

    fn lookup_many(&self, ids: &[i64]) -> CatalogResult<HashMap<i64, Company>> {
        let mut found = HashMap::with_capacity(ids.len());
        let mut missing = Vec::new();
        {
            let mut state = self.state.lock();
            let now = Instant::now();
            for &id in ids {
                match Self::cached(&mut state, id, now) {
                    Some(value) => {
                        state.hits += 1;
                        if let Some(company) = value {
                            found.insert(id, company);
                        }
                    }
                    None => {
                        state.misses += 1;
                        missing.push(id);
                    }
                }
            }
        }
        if missing.is_empty() {
            return Ok(found);
        }
        let fetched = self.inner.lookup_many(&missing)?;
        let mut state = self.state.lock();
        for id in missing {
            let value = fetched.get(&id).cloned();
            self.store(&mut state, id, value.clone());
            if let Some(company) = value {
                found.insert(id, company);
            }
        }
        Ok(found)
    }
}
