//! Case-insensitive entity names
//!
//! Templates, stages, jobs and pipelines are all addressed by a
//! [`CaseInsensitiveName`]: `Deploy` and `deploy` name the same entity,
//! while the original spelling is kept for display.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Maximum length of an entity name
pub const MAX_NAME_LENGTH: usize = 255;

static NAME_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-.]+$"));

/// Name compared without regard to case
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseInsensitiveName(String);

impl CaseInsensitiveName {
    /// Wrap a name without validating its format
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Original spelling
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for comparisons
    #[inline]
    #[must_use]
    pub fn folded(&self) -> String {
        self.0.to_lowercase()
    }

    /// Check name format: alphanumerics, `_`, `-` and `.`, bounded length
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.0.len() > MAX_NAME_LENGTH {
            return false;
        }
        match NAME_PATTERN.as_ref() {
            Ok(pattern) => pattern.is_match(&self.0),
            Err(_) => false,
        }
    }
}

impl PartialEq for CaseInsensitiveName {
    fn eq(&self, other: &Self) -> bool {
        self.folded() == other.folded()
    }
}

impl Eq for CaseInsensitiveName {}

impl Hash for CaseInsensitiveName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded().hash(state);
    }
}

impl PartialOrd for CaseInsensitiveName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CaseInsensitiveName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(&other.folded())
    }
}

impl Display for CaseInsensitiveName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CaseInsensitiveName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for CaseInsensitiveName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CaseInsensitiveName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for CaseInsensitiveName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
