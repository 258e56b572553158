//! Parsing of dashboard query parameters and computer edit forms.
//!
//! This is the boundary where caller strings become typed values: sort keys
//! are checked against the allow-list here, and nothing unparsed reaches
//! the store.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::errors::{CatalogError, CatalogResult};
use crate::models::{Computer, NewComputer, NO_COMPANY_ID};
use crate::query::guards::PageRequest;
use crate::query::{ComputerQuery, SortColumn, SortDirection};
use crate::store::CompanyResolver;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Last value for `key`, trimmed; empty values count as missing.
fn param<'a>(params: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_int(field: &str, raw: &str) -> CatalogResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| CatalogError::malformed(format!("{field} must be an integer, got '{raw}'")))
}

/// `YYYY-MM-DD`; empty means no date.
pub fn parse_date(field: &str, raw: &str) -> CatalogResult<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if !DATE_RE.is_match(raw) {
        return Err(CatalogError::malformed(format!(
            "{field} must look like YYYY-MM-DD, got '{raw}'"
        )));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| CatalogError::malformed(format!("{field} is not a valid date: {e}")))
}

// ---------------------------------------------------------------------------
// Dashboard listing
// ---------------------------------------------------------------------------

/// Dashboard request: which page, and either a search or a sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    /// 1-based.
    pub page: i64,
    pub search: Option<String>,
    pub sort: Option<(SortColumn, SortDirection)>,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self {
            page: 1,
            search: None,
            sort: None,
        }
    }
}

impl ListingRequest {
    /// Read `page`, `search`, `column`, and `order`.
    ///
    /// `order` defaults to ascending and is ignored without `column`. Values
    /// outside the sort allow-list are rejected as malformed input.
    pub fn from_params(params: &[(&str, &str)]) -> CatalogResult<Self> {
        let page = match param(params, "page") {
            Some(raw) => parse_int("page", raw)?.max(1),
            None => 1,
        };
        let search = param(params, "search").map(str::to_string);
        let sort = match param(params, "column") {
            Some(raw_column) => {
                let column = raw_column.parse::<SortColumn>()?;
                let direction = match param(params, "order") {
                    Some(raw) => raw.parse::<SortDirection>()?,
                    None => SortDirection::default(),
                };
                Some((column, direction))
            }
            None => None,
        };
        Ok(Self { page, search, sort })
    }

    /// Search wins over sort; neither means the plain store-order page.
    pub fn to_query(&self) -> ComputerQuery {
        let page = PageRequest::page(self.page);
        match (&self.search, self.sort) {
            (Some(fragment), _) => ComputerQuery::Search {
                fragment: fragment.clone(),
                page,
            },
            (None, Some((column, direction))) => ComputerQuery::Sorted {
                column,
                direction,
                page,
            },
            (None, None) => ComputerQuery::Page(page),
        }
    }
}

// ---------------------------------------------------------------------------
// Add / edit form
// ---------------------------------------------------------------------------

/// Fields of the add/edit computer form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerForm {
    /// Absent on the add form.
    pub id: Option<i64>,
    pub name: String,
    pub introduced: Option<NaiveDate>,
    pub discontinued: Option<NaiveDate>,
    /// `0` when no company was picked.
    pub company_id: i64,
}

impl ComputerForm {
    /// Read `id`, `name`, `introduced`, `discontinued`, and `companyid`.
    ///
    /// No ordering is enforced between `introduced` and `discontinued`.
    pub fn from_params(params: &[(&str, &str)]) -> CatalogResult<Self> {
        let id = param(params, "id").map(|raw| parse_int("id", raw)).transpose()?;
        let name = param(params, "name")
            .ok_or_else(|| CatalogError::malformed("name is required"))?
            .to_string();
        let introduced = parse_date("introduced", param(params, "introduced").unwrap_or(""))?;
        let discontinued =
            parse_date("discontinued", param(params, "discontinued").unwrap_or(""))?;
        let company_id = match param(params, "companyid") {
            Some(raw) => parse_int("companyid", raw)?,
            None => NO_COMPANY_ID,
        };
        Ok(Self {
            id,
            name,
            introduced,
            discontinued,
            company_id,
        })
    }

    /// Build the record to update, hydrating the chosen company. A company id
    /// the resolver does not know becomes "no company".
    pub fn into_computer(self, companies: &dyn CompanyResolver) -> CatalogResult<Computer> {
        let id = self
            .id
            .ok_or_else(|| CatalogError::malformed("id is required to edit a computer"))?;
        let company = if self.company_id == NO_COMPANY_ID {
            None
        } else {
            companies.lookup(self.company_id)?
        };
        Ok(Computer {
            id,
            name: self.name,
            introduced: self.introduced,
            discontinued: self.discontinued,
            company,
        })
    }

    /// Record for a store-assigned insert; any `id` field is ignored.
    pub fn into_new_computer(self) -> NewComputer {
        NewComputer {
            name: self.name,
            introduced: self.introduced,
            discontinued: self.discontinued,
            company_id: Some(self.company_id).filter(|id| *id != NO_COMPANY_ID),
        }
    }
}
