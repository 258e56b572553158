pub mod companies;
pub mod computers;
pub mod database;
pub mod schema;

pub use companies::{CachedCompanyResolver, CompanyResolver, SqliteCompanyResolver};
pub use computers::{ComputerRepository, ComputerStore};
pub use database::CatalogDb;
