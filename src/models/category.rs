//! Classification categories
//!
//! A category is a human-defined group of source codes (an ICD-10 chapter, an
//! ATC main group) identified by its id. The code predicate decides which
//! source concepts belong to the category.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Code predicate selecting source concepts of one coding system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// An explicit list of source codes
    ExactSet { codes: SmallVec<[String; 4]> },
    /// Codes between `low` and `high`, inclusive, compared as strings
    Range { low: String, high: String },
    /// Codes starting with `prefix`
    Prefix { prefix: String },
}

impl Predicate {
    /// Range predicate over `[low, high]`
    #[must_use]
    pub fn range(low: impl Into<String>, high: impl Into<String>) -> Self {
        Self::Range {
            low: low.into(),
            high: high.into(),
        }
    }

    /// Prefix predicate
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix {
            prefix: prefix.into(),
        }
    }

    /// Exact-set predicate
    #[must_use]
    pub fn exact<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ExactSet {
            codes: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a source code satisfies the predicate
    ///
    /// Range bounds are compared lexicographically, since code ranges cross
    /// letter and digit boundaries (`S00` to `T88`).
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Self::ExactSet { codes } => codes.iter().any(|c| c == code),
            Self::Range { low, high } => low.as_str() <= code && code <= high.as_str(),
            Self::Prefix { prefix } => code.starts_with(prefix.as_str()),
        }
    }

    /// The `(code_start, code_end)` pair reported for this predicate
    #[must_use]
    pub fn bounds(&self) -> (String, String) {
        match self {
            Self::ExactSet { codes } => {
                let low = codes.iter().min().cloned().unwrap_or_default();
                let high = codes.iter().max().cloned().unwrap_or_default();
                (low, high)
            }
            Self::Range { low, high } => (low.clone(), high.clone()),
            Self::Prefix { prefix } => (prefix.clone(), prefix.clone()),
        }
    }

    /// Check that the predicate can select anything at all
    pub(crate) fn check(&self) -> Result<(), String> {
        match self {
            Self::ExactSet { codes } if codes.is_empty() => Err("empty code set".into()),
            Self::Range { low, high } if low > high => {
                Err(format!("range low '{low}' sorts after high '{high}'"))
            }
            Self::Prefix { prefix } if prefix.is_empty() => Err("empty prefix".into()),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactSet { codes } => write!(f, "{{{}}}", codes.join(", ")),
            Self::Range { low, high } => write!(f, "{low}-{high}"),
            Self::Prefix { prefix } => write!(f, "{prefix}*"),
        }
    }
}

/// A classification category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique id within its registry
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Source codes belonging to the category
    #[serde(rename = "predicate")]
    pub code_predicate: Predicate,
}

impl Category {
    /// Create a new category
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        code_predicate: Predicate,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            code_predicate,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.display_name, self.id, self.code_predicate)
    }
}
