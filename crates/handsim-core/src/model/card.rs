use crate::error::{OddsError, OddsResult};
use crate::model::category::Category;
use crate::model::deck::MAX_COPIES;
use core::fmt;
use serde::{Deserialize, Serialize};

/// One line of a deck list: a card identifier, its category and how many copies are run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardEntry {
    pub id: String,
    pub category: Category,
    pub copies: u32,
}

impl CardEntry {
    pub fn new(
        id: impl Into<String>,
        category: impl Into<Category>,
        copies: u32,
    ) -> OddsResult<Self> {
        let entry = Self {
            id: id.into(),
            category: category.into(),
            copies,
        };
        entry.validate()?;
        Ok(entry)
    }

    pub(crate) fn validate(&self) -> OddsResult<()> {
        if self.copies == 0 || self.copies > MAX_COPIES {
            return Err(OddsError::InvalidCopies {
                id: self.id.clone(),
                copies: self.copies,
            });
        }
        Ok(())
    }

    pub fn is_in(&self, category: &Category) -> bool {
        &self.category == category
    }
}

impl fmt::Display for CardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} [{}]", self.id, self.copies, self.category)
    }
}

/// A single physical copy of a deck entry.
///
/// `copy` is zero-based and always below `entry.copies`, so two drawn cards are
/// the same physical card exactly when both the entry and the copy index match.
#[derive(Debug, Clone, Copy)]
pub struct DrawnCard<'a> {
    pub entry: &'a CardEntry,
    pub copy: u32,
}

impl<'a> DrawnCard<'a> {
    pub const fn new(entry: &'a CardEntry, copy: u32) -> Self {
        Self { entry, copy }
    }

    pub fn id(&self) -> &'a str {
        &self.entry.id
    }

    pub fn category(&self) -> &'a Category {
        &self.entry.category
    }
}

impl PartialEq for DrawnCard<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.entry, other.entry) && self.copy == other.copy
    }
}

impl Eq for DrawnCard<'_> {}

impl fmt::Display for DrawnCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entry.id)
    }
}
