//! Computer record store: CRUD, paged listing, search, and sorted listing.
//!
//! Every public method opens one connection, runs one statement, and drops
//! the connection. Company hydration runs afterwards as its own unit of work,
//! one batched resolver call per page.

use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexSet;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::errors::CatalogResult;
use crate::models::{Computer, NewComputer, NO_COMPANY_ID};
use crate::query::{ComputerQuery, SortColumn, SortDirection};
use crate::store::companies::{CachedCompanyResolver, CompanyResolver, SqliteCompanyResolver};
use crate::store::database::CatalogDb;

/// Persistence contract for computer records.
pub trait ComputerRepository: Send + Sync {
    /// Insert with a caller-assigned id. A duplicate id is a constraint
    /// violation.
    fn add(&self, computer: &Computer) -> CatalogResult<()>;

    /// Insert and let the store assign the id. Returns the new id.
    fn insert_new(&self, computer: &NewComputer) -> CatalogResult<i64>;

    /// Run a listing descriptor. At most one page of records is returned.
    fn fetch(&self, query: &ComputerQuery) -> CatalogResult<Vec<Computer>>;

    /// Rows the descriptor pages over, ignoring offset and limit.
    fn count_matching(&self, query: &ComputerQuery) -> CatalogResult<i64>;

    fn get(&self, id: i64) -> CatalogResult<Option<Computer>>;

    /// Overwrite every field of the row with `computer.id`. Returns whether
    /// a row matched.
    fn update(&self, computer: &Computer) -> CatalogResult<bool>;

    /// Returns whether a row was removed. Absent ids are not an error.
    fn delete(&self, id: i64) -> CatalogResult<bool>;

    /// `max(id) + 1`, or 0 for an empty catalog. Racy when used to pick the
    /// id of a concurrent insert; prefer [`ComputerRepository::insert_new`].
    fn max_id(&self) -> CatalogResult<i64>;

    fn count(&self) -> CatalogResult<i64>;

    fn list(&self, offset: i64) -> CatalogResult<Vec<Computer>> {
        self.fetch(&ComputerQuery::page(offset))
    }

    fn search_by_name(&self, fragment: &str) -> CatalogResult<Vec<Computer>> {
        self.fetch(&ComputerQuery::search(fragment))
    }

    fn sorted_list(
        &self,
        column: SortColumn,
        direction: SortDirection,
        offset: i64,
    ) -> CatalogResult<Vec<Computer>> {
        self.fetch(&ComputerQuery::sorted(column, direction, offset))
    }
}

/// Columns of one `computer` row before company hydration.
struct ComputerRow {
    id: i64,
    name: String,
    introduced: Option<NaiveDate>,
    discontinued: Option<NaiveDate>,
    company_id: Option<i64>,
}

impl ComputerRow {
    /// Expects `id, name, introduced, discontinued, company_id` in order.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            introduced: row.get(2)?,
            discontinued: row.get(3)?,
            company_id: row.get::<_, Option<i64>>(4)?.filter(|id| *id != NO_COMPANY_ID),
        })
    }
}

/// SQLite implementation of [`ComputerRepository`].
#[derive(Clone)]
pub struct ComputerStore {
    db: CatalogDb,
    companies: Arc<dyn CompanyResolver>,
}

impl ComputerStore {
    pub fn new(db: CatalogDb, companies: Arc<dyn CompanyResolver>) -> Self {
        Self { db, companies }
    }

    /// Store with the SQLite company resolver, cached when the config asks
    /// for it.
    pub fn from_db(db: CatalogDb) -> Self {
        let cache = db.config().company_cache.clone();
        let sqlite: Arc<dyn CompanyResolver> = Arc::new(SqliteCompanyResolver::new(db.clone()));
        let companies: Arc<dyn CompanyResolver> = if cache.enabled {
            Arc::new(CachedCompanyResolver::new(
                sqlite,
                cache.max_entries,
                cache.ttl_seconds,
            ))
        } else {
            sqlite
        };
        Self::new(db, companies)
    }

    /// Open the database, create the schema, and build the store.
    pub fn from_config(config: StoreConfig) -> CatalogResult<Self> {
        let db = CatalogDb::open(config)?;
        db.init_schema()?;
        Ok(Self::from_db(db))
    }

    pub fn db(&self) -> &CatalogDb {
        &self.db
    }

    pub fn companies(&self) -> &Arc<dyn CompanyResolver> {
        &self.companies
    }

    /// Turn raw rows into records, resolving every distinct company id of
    /// the batch in one resolver call. Unknown ids hydrate as no company.
    fn hydrate(&self, rows: Vec<ComputerRow>) -> CatalogResult<Vec<Computer>> {
        let ids: IndexSet<i64> = rows.iter().filter_map(|r| r.company_id).collect();
        let ids: Vec<i64> = ids.into_iter().collect();
        let companies = if ids.is_empty() {
            Default::default()
        } else {
            self.companies.lookup_many(&ids)?
        };
        Ok(rows
            .into_iter()
            .map(|row| Computer {
                id: row.id,
                name: row.name,
                introduced: row.introduced,
                discontinued: row.discontinued,
                company: row.company_id.and_then(|id| companies.get(&id).cloned()),
            })
            .collect())
    }
}

impl ComputerRepository for ComputerStore {
    fn add(&self, computer: &Computer) -> CatalogResult<()> {
        let conn = self.db.connect()?;
        conn.execute(
            "INSERT INTO computer(id, name, introduced, discontinued, company_id) \
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                computer.id,
                computer.name,
                computer.introduced,
                computer.discontinued,
                computer.company_id(),
            ],
        )?;
        info!(id = computer.id, "computer added");
        Ok(())
    }

    fn insert_new(&self, computer: &NewComputer) -> CatalogResult<i64> {
        let conn = self.db.connect()?;
        conn.execute(
            "INSERT INTO computer(name, introduced, discontinued, company_id) \
             VALUES (?1, ?2, ?3, ?4);",
            params![
                computer.name,
                computer.introduced,
                computer.discontinued,
                computer.bound_company_id(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        info!(id, "computer inserted");
        Ok(id)
    }

    fn fetch(&self, query: &ComputerQuery) -> CatalogResult<Vec<Computer>> {
        let built = query.build();
        let rows = {
            let conn = self.db.connect()?;
            let mut stmt = conn.prepare(&built.sql)?;
            let rows = stmt
                .query_map(params_from_iter(built.params.iter()), ComputerRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };
        debug!(query = %query.label(), rows = rows.len(), "computer listing");
        self.hydrate(rows)
    }

    fn count_matching(&self, query: &ComputerQuery) -> CatalogResult<i64> {
        let built = query.build_count();
        let conn = self.db.connect()?;
        let total = conn.query_row(&built.sql, params_from_iter(built.params.iter()), |row| {
            row.get(0)
        })?;
        Ok(total)
    }

    fn get(&self, id: i64) -> CatalogResult<Option<Computer>> {
        let row = {
            let conn = self.db.connect()?;
            conn.query_row(
                "SELECT id, name, introduced, discontinued, company_id \
                 FROM computer WHERE id = ?1;",
                params![id],
                ComputerRow::from_row,
            )
            .optional()?
        };
        match row {
            Some(row) => Ok(self.hydrate(vec![row])?.pop()),
            None => {
                debug!(id, "computer not found");
                Ok(None)
            }
        }
    }

    fn update(&self, computer: &Computer) -> CatalogResult<bool> {
        let conn = self.db.connect()?;
        let changed = conn.execute(
            "UPDATE computer \
             SET name = ?1, introduced = ?2, discontinued = ?3, company_id = ?4 \
             WHERE id = ?5;",
            params![
                computer.name,
                computer.introduced,
                computer.discontinued,
                computer.company_id(),
                computer.id,
            ],
        )?;
        info!(id = computer.id, changed, "computer updated");
        Ok(changed > 0)
    }

    fn delete(&self, id: i64) -> CatalogResult<bool> {
        let conn = self.db.connect()?;
        let removed = conn.execute("DELETE FROM computer WHERE id = ?1;", params![id])?;
        info!(id, removed, "computer deleted");
        Ok(removed > 0)
    }

    fn max_id(&self) -> CatalogResult<i64> {
        let conn = self.db.connect()?;
        let max: Option<i64> =
            conn.query_row("SELECT MAX(id) FROM computer;", [], |row| row.get(0))?;
        Ok(max.map_or(0, |m| m + 1))
    }

    fn count(&self) -> CatalogResult<i64> {
        self.count_matching(&ComputerQuery::page(0))
    }
}
