//! Example selection filters
//!
//! Applies the `--filter` / `--skip` patterns to the catalog.

use regex::Regex;
use std::fmt;

use super::example::{Catalog, ExampleId};

/// Pattern used when no choose filter is given
pub const MATCH_ALL: ExamplePattern = ExamplePattern::All;

/// Pattern used when no skip filter is given
pub const MATCH_NONE: ExamplePattern = ExamplePattern::Nothing;

/// A pattern matched against example identifiers
///
/// A supplied pattern is always compiled, so an empty string matches every
/// example. Only an absent pattern falls back to [`MATCH_ALL`] / [`MATCH_NONE`].
#[derive(Clone, Debug)]
pub enum ExamplePattern {
    All,
    Nothing,
    Regex(Regex),
}

impl ExamplePattern {
    /// Compile a user-supplied pattern
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(ExamplePattern::Regex)
    }

    /// Compile an optional pattern, falling back to `default` when absent
    pub fn compile_or(pattern: Option<&str>, default: ExamplePattern) -> Result<Self, regex::Error> {
        match pattern {
            Some(p) => Self::compile(p),
            None => Ok(default),
        }
    }

    pub fn is_match(&self, id: &ExampleId) -> bool {
        match self {
            ExamplePattern::All => true,
            ExamplePattern::Nothing => false,
            ExamplePattern::Regex(re) => re.is_match(id.as_str()),
        }
    }
}

impl fmt::Display for ExamplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamplePattern::All => write!(f, "<all>"),
            ExamplePattern::Nothing => write!(f, "<none>"),
            ExamplePattern::Regex(re) => write!(f, "{}", re.as_str()),
        }
    }
}

/// Choose and skip filters for one run
#[derive(Clone, Debug)]
pub struct SelectionFilters {
    pub choose: ExamplePattern,
    pub skip: ExamplePattern,
}

impl Default for SelectionFilters {
    fn default() -> Self {
        Self {
            choose: MATCH_ALL,
            skip: MATCH_NONE,
        }
    }
}

impl SelectionFilters {
    /// Build filters from optional regex strings
    pub fn from_patterns(choose: Option<&str>, skip: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            choose: ExamplePattern::compile_or(choose, MATCH_ALL)?,
            skip: ExamplePattern::compile_or(skip, MATCH_NONE)?,
        })
    }

    /// Split the catalog into the work list and the skipped set
    pub fn select(&self, catalog: &Catalog) -> Selection {
        let skipped = catalog
            .iter()
            .filter(|id| self.skip.is_match(id))
            .cloned()
            .collect();

        let work_list = catalog
            .iter()
            .filter(|id| !self.skip.is_match(id))
            .filter(|id| self.choose.is_match(id))
            .cloned()
            .collect();

        Selection { work_list, skipped }
    }
}

/// Result of applying the filters to a catalog, both in catalog order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub work_list: Vec<ExampleId>,
    pub skipped: Vec<ExampleId>,
}
