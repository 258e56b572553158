//! Caller-facing catalog service.
//!
//! The repository returns typed errors. This layer applies the dashboard
//! policy on top of it: a failure is logged and the caller gets an empty
//! list, `0`, `None`, or `false`. Callers that must tell "empty" from
//! "failed" use [`ComputerService::repository`] directly.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::errors::CatalogResult;
use crate::form::ListingRequest;
use crate::models::{Computer, NewComputer};
use crate::query::guards::page_count;
use crate::query::{SortColumn, SortDirection};
use crate::store::ComputerRepository;

/// One dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Listing {
    pub computers: Vec<Computer>,
    /// Rows matching the request across all pages.
    pub total: i64,
    pub page: i64,
    pub page_count: i64,
}

fn degraded<T: Default>(operation: &str, result: CatalogResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!(operation, kind = ?e.kind(), error = %e, "catalog operation failed");
            T::default()
        }
    }
}

#[derive(Clone)]
pub struct ComputerService {
    repo: Arc<dyn ComputerRepository>,
}

impl ComputerService {
    pub fn new(repo: Arc<dyn ComputerRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn ComputerRepository> {
        &self.repo
    }

    /// `true` when the row was written.
    pub fn add(&self, computer: &Computer) -> bool {
        degraded("add", self.repo.add(computer).map(|()| true))
    }

    pub fn insert_new(&self, computer: &NewComputer) -> Option<i64> {
        degraded("insert_new", self.repo.insert_new(computer).map(Some))
    }

    pub fn list(&self, offset: i64) -> Vec<Computer> {
        degraded("list", self.repo.list(offset))
    }

    pub fn get(&self, id: i64) -> Option<Computer> {
        degraded("get", self.repo.get(id))
    }

    pub fn update(&self, computer: &Computer) -> bool {
        degraded("update", self.repo.update(computer))
    }

    pub fn delete(&self, id: i64) -> bool {
        degraded("delete", self.repo.delete(id))
    }

    pub fn max_id(&self) -> i64 {
        degraded("max_id", self.repo.max_id())
    }

    pub fn count(&self) -> i64 {
        degraded("count", self.repo.count())
    }

    pub fn search_by_name(&self, fragment: &str) -> Vec<Computer> {
        degraded("search_by_name", self.repo.search_by_name(fragment))
    }

    pub fn sorted_list(
        &self,
        column: SortColumn,
        direction: SortDirection,
        offset: i64,
    ) -> Vec<Computer> {
        degraded(
            "sorted_list",
            self.repo.sorted_list(column, direction, offset),
        )
    }

    /// Resolve a dashboard request to its page plus pagination totals.
    pub fn listing(&self, request: &ListingRequest) -> Listing {
        let query = request.to_query();
        let computers = degraded("listing", self.repo.fetch(&query));
        let total = degraded("listing_count", self.repo.count_matching(&query));
        info!(
            query = %query.label(),
            page = request.page,
            shown = computers.len(),
            total,
            "dashboard listing"
        );
        Listing {
            computers,
            total,
            page: request.page,
            page_count: page_count(total),
        }
    }
}
