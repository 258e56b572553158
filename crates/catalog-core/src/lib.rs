//! Data access for the computer catalog.
//!
//! This crate owns the SQLite schema for `computer` and `company`, turns
//! dashboard requests (page, search, sort) into parameterized queries, and
//! maps rows back into [`models::Computer`] records with their company
//! hydrated.
//!
//! [`store::ComputerStore`] returns typed [`errors::CatalogError`]s;
//! [`service::ComputerService`] wraps any repository with the dashboard's
//! log-and-return-empty policy.

pub mod config;
pub mod errors;
pub mod form;
pub mod logging;
pub mod models;
pub mod query;
pub mod service;
pub mod store;

pub use config::StoreConfig;
pub use errors::{CatalogError, CatalogResult, ErrorKind};
pub use models::{Company, Computer, NewComputer};
pub use service::{ComputerService, Listing};
pub use store::{CatalogDb, CompanyResolver, ComputerRepository, ComputerStore};
