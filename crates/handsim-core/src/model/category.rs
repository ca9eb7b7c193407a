use core::fmt;
use serde::{Deserialize, Serialize};

/// Label partitioning deck cards into semantic groups.
///
/// Labels are trimmed and lower-cased, so `"Engine "` and `"engine"` name the
/// same category. Any label is accepted; the associated constructors cover the
/// ones the report tables use by default.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub const ENGINE: &'static str = "engine";
    pub const NON_ENGINE: &'static str = "non-engine";
    pub const HANDTRAP: &'static str = "handtrap";
    pub const BRICK: &'static str = "brick";
    pub const OTHER: &'static str = "other";

    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_ascii_lowercase())
    }

    pub fn engine() -> Self {
        Self::new(Self::ENGINE)
    }

    pub fn non_engine() -> Self {
        Self::new(Self::NON_ENGINE)
    }

    pub fn handtrap() -> Self {
        Self::new(Self::HANDTRAP)
    }

    pub fn brick() -> Self {
        Self::new(Self::BRICK)
    }

    pub fn other() -> Self {
        Self::new(Self::OTHER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
