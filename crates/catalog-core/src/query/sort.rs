//! Closed set of sort keys and the prebuilt ORDER BY fragments they map to.
//!
//! Only the fragments in [`order_clause`] ever reach the SQL text; caller
//! strings are parsed into [`SortColumn`] / [`SortDirection`] first.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    Id,
    Name,
    Introduced,
    Discontinued,
    Company,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Id,
        SortColumn::Name,
        SortColumn::Introduced,
        SortColumn::Discontinued,
        SortColumn::Company,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Name => "name",
            SortColumn::Introduced => "introduced",
            SortColumn::Discontinued => "discontinued",
            SortColumn::Company => "company",
        }
    }

    /// Whether ordering needs the `company` table joined in.
    pub const fn needs_company_join(self) -> bool {
        matches!(self, SortColumn::Company)
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SortColumn::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| CatalogError::malformed(format!("unknown sort column '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = CatalogError;

    /// Accepts `asc`/`ascending` and `desc`/`descending`, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(CatalogError::malformed(format!(
                "unknown sort direction '{s}'"
            ))),
        }
    }
}

/// ORDER BY fragment for a sort key, aliased against `computer c` and
/// `company comp`.
///
/// NULL values sort last in both directions. `c.id` breaks ties so that
/// consecutive pages never overlap.
pub const fn order_clause(column: SortColumn, direction: SortDirection) -> &'static str {
    use SortColumn::*;
    use SortDirection::*;
    match (column, direction) {
        (Id, Ascending) => "ORDER BY c.id ASC",
        (Id, Descending) => "ORDER BY c.id DESC",
        (Name, Ascending) => "ORDER BY c.name ASC, c.id ASC",
        (Name, Descending) => "ORDER BY c.name DESC, c.id ASC",
        (Introduced, Ascending) => {
            "ORDER BY c.introduced IS NULL, c.introduced ASC, c.id ASC"
        }
        (Introduced, Descending) => {
            "ORDER BY c.introduced IS NULL, c.introduced DESC, c.id ASC"
        }
        (Discontinued, Ascending) => {
            "ORDER BY c.discontinued IS NULL, c.discontinued ASC, c.id ASC"
        }
        (Discontinued, Descending) => {
            "ORDER BY c.discontinued IS NULL, c.discontinued DESC, c.id ASC"
        }
        (Company, Ascending) => "ORDER BY comp.name IS NULL, comp.name ASC, c.id ASC",
        (Company, Descending) => "ORDER BY comp.name IS NULL, comp.name DESC, c.id ASC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn parses_allow_listed_columns() {
        assert_eq!("company".parse::<SortColumn>().unwrap(), SortColumn::Company);
        assert_eq!(" Introduced ".parse::<SortColumn>().unwrap(), SortColumn::Introduced);
        for column in SortColumn::ALL {
            assert_eq!(column.as_str().parse::<SortColumn>().unwrap(), column);
        }
    }

    #[test]
    fn rejects_injection_attempts() {
        let err = "name; DROP TABLE computer".parse::<SortColumn>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
        let err = "asc, (SELECT 1)".parse::<SortDirection>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn parses_directions() {
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!("descending".parse::<SortDirection>().unwrap(), SortDirection::Descending);
    }

    #[test]
    fn every_key_has_a_fragment() {
        for column in SortColumn::ALL {
            for direction in [SortDirection::Ascending, SortDirection::Descending] {
                let clause = order_clause(column, direction);
                assert!(clause.starts_with("ORDER BY "));
                assert!(clause.contains(&direction.as_str().to_uppercase()));
                assert_eq!(clause.contains("comp."), column.needs_company_join());
            }
        }
    }

    #[test]
    fn company_sort_forces_nulls_last() {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            assert!(order_clause(SortColumn::Company, direction)
                .starts_with("ORDER BY comp.name IS NULL"));
        }
    }
}
