//! Listing request descriptors and the SQL they compile to.
//!
//! Every value coming from a caller is bound as a parameter. The only text
//! spliced into a statement is a fragment from [`order_clause`].

use rusqlite::types::Value;

use crate::query::guards::{like_pattern, truncate_search, PageRequest};
use crate::query::sort::{order_clause, SortColumn, SortDirection};

const SELECT_COMPUTERS: &str =
    "SELECT c.id, c.name, c.introduced, c.discontinued, c.company_id FROM computer c";
const JOIN_COMPANY: &str = " LEFT JOIN company comp ON c.company_id = comp.id";
const NAME_MATCHES: &str = " WHERE c.name LIKE ?1 ESCAPE '\\'";

/// One listing operation with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputerQuery {
    /// Store-native order, no ORDER BY.
    Page(PageRequest),
    /// Substring match on `name`, store-native order.
    Search { fragment: String, page: PageRequest },
    Sorted {
        column: SortColumn,
        direction: SortDirection,
        page: PageRequest,
    },
}

/// Compiled statement text plus positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl ComputerQuery {
    pub fn page(offset: i64) -> Self {
        ComputerQuery::Page(PageRequest::at(offset))
    }

    pub fn search(fragment: &str) -> Self {
        ComputerQuery::Search {
            fragment: fragment.to_string(),
            page: PageRequest::first(),
        }
    }

    pub fn sorted(column: SortColumn, direction: SortDirection, offset: i64) -> Self {
        ComputerQuery::Sorted {
            column,
            direction,
            page: PageRequest::at(offset),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        match self {
            ComputerQuery::Page(page)
            | ComputerQuery::Search { page, .. }
            | ComputerQuery::Sorted { page, .. } => page.normalized(),
        }
    }

    /// Short label used in log lines.
    pub fn label(&self) -> String {
        match self {
            ComputerQuery::Page(_) => "list".to_string(),
            ComputerQuery::Search { .. } => "search".to_string(),
            ComputerQuery::Sorted {
                column, direction, ..
            } => format!("sort {column} {direction}"),
        }
    }

    /// Statement returning the rows of this page.
    pub fn build(&self) -> BuiltQuery {
        let page = self.page_request();
        match self {
            ComputerQuery::Page(_) => BuiltQuery {
                sql: format!("{SELECT_COMPUTERS} LIMIT ?1 OFFSET ?2;"),
                params: vec![Value::Integer(page.limit), Value::Integer(page.offset)],
            },
            ComputerQuery::Search { fragment, .. } => BuiltQuery {
                sql: format!("{SELECT_COMPUTERS}{NAME_MATCHES} LIMIT ?2 OFFSET ?3;"),
                params: vec![
                    Value::Text(like_pattern(truncate_search(fragment))),
                    Value::Integer(page.limit),
                    Value::Integer(page.offset),
                ],
            },
            ComputerQuery::Sorted {
                column, direction, ..
            } => {
                let join = if column.needs_company_join() {
                    JOIN_COMPANY
                } else {
                    ""
                };
                BuiltQuery {
                    sql: format!(
                        "{SELECT_COMPUTERS}{join} {} LIMIT ?1 OFFSET ?2;",
                        order_clause(*column, *direction)
                    ),
                    params: vec![Value::Integer(page.limit), Value::Integer(page.offset)],
                }
            }
        }
    }

    /// Statement counting every row this query pages over, ignoring limits.
    pub fn build_count(&self) -> BuiltQuery {
        match self {
            ComputerQuery::Search { fragment, .. } => BuiltQuery {
                sql: format!("SELECT COUNT(*) FROM computer c{NAME_MATCHES};"),
                params: vec![Value::Text(like_pattern(truncate_search(fragment)))],
            },
            ComputerQuery::Page(_) | ComputerQuery::Sorted { .. } => BuiltQuery {
                sql: "SELECT COUNT(*) FROM computer;".to_string(),
                params: Vec::new(),
            },
        }
    }
}
