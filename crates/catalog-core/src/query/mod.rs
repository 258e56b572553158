//! Listing query construction: page bounds, sort keys, and SQL building.

pub mod builder;
pub mod guards;
pub mod sort;

pub use builder::{BuiltQuery, ComputerQuery};
pub use guards::{PageRequest, PAGE_SIZE};
pub use sort::{SortColumn, SortDirection};
