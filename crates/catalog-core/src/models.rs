//! Domain records for the computer catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Company id that stands for "no company". Written as SQL NULL.
pub const NO_COMPANY_ID: i64 = 0;

// ---------------------------------------------------------------------------
// Company
// ---------------------------------------------------------------------------

/// A manufacturer, owned by the company resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

impl Company {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Computer
// ---------------------------------------------------------------------------

/// A catalog entry.
///
/// `company` is either a hydrated [`Company`] or `None`; a record never
/// carries a bare foreign key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Computer {
    pub id: i64,
    pub name: String,
    pub introduced: Option<NaiveDate>,
    pub discontinued: Option<NaiveDate>,
    pub company: Option<Company>,
}

impl Computer {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            introduced: None,
            discontinued: None,
            company: None,
        }
    }

    pub fn with_introduced(mut self, date: NaiveDate) -> Self {
        self.introduced = Some(date);
        self
    }

    pub fn with_discontinued(mut self, date: NaiveDate) -> Self {
        self.discontinued = Some(date);
        self
    }

    pub fn with_company(mut self, company: Company) -> Self {
        self.company = Some(company);
        self
    }

    /// Value bound to the `company_id` column: `None` when there is no
    /// company or the company carries [`NO_COMPANY_ID`].
    pub fn company_id(&self) -> Option<i64> {
        self.company
            .as_ref()
            .map(|c| c.id)
            .filter(|id| *id != NO_COMPANY_ID)
    }
}

/// A computer whose id is assigned by the store on insert.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewComputer {
    pub name: String,
    pub introduced: Option<NaiveDate>,
    pub discontinued: Option<NaiveDate>,
    pub company_id: Option<i64>,
}

impl NewComputer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn bound_company_id(&self) -> Option<i64> {
        self.company_id.filter(|id| *id != NO_COMPANY_ID)
    }
}
