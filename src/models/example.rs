//! Example identifiers and the example catalog
//!
//! Defines which example directories carry tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Angular documentation examples (`ng/doc/<name>`)
const NG_DOC_EXAMPLES: &[&str] = &[
    "quickstart",
    "toh-0",
    "toh-1",
    "toh-2",
    "toh-3",
    "toh-4",
    "toh-5",
    "toh-6",
    "template-syntax",
];

/// Angular components lottery codelab steps (`acx/lottery/<name>`)
const ACX_LOTTERY_EXAMPLES: &[&str] = &["1-base", "2-starteasy", "3-usebuttons", "4-final"];

/// Standalone HTML example
pub const HTML_EXAMPLE: &str = "html";

/// Relative path of one example directory, e.g. `ng/doc/toh-1`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExampleId(String);

impl ExampleId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Join category segments and a name with `/`
    pub fn from_segments(segments: &[&str], name: &str) -> Self {
        let mut path = segments.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(name);
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory of this example below the examples root
    pub fn dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExampleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sorted, duplicate-free list of every example known to have tests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<ExampleId>,
}

impl Catalog {
    /// Build the built-in catalog
    pub fn build() -> Self {
        let entries = NG_DOC_EXAMPLES
            .iter()
            .map(|name| ExampleId::from_segments(&["ng", "doc"], name))
            .chain(std::iter::once(ExampleId::new(HTML_EXAMPLE)))
            .chain(
                ACX_LOTTERY_EXAMPLES
                    .iter()
                    .map(|name| ExampleId::from_segments(&["acx", "lottery"], name)),
            )
            .collect();

        Self::from_ids(entries)
    }

    /// Build a catalog from arbitrary identifiers (sorted, deduplicated)
    pub fn from_ids(mut entries: Vec<ExampleId>) -> Self {
        entries.sort();
        entries.dedup();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExampleId> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn contains(&self, id: &ExampleId) -> bool {
        self.entries.binary_search(id).is_ok()
    }
}
