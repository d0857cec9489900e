//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, database_id::CategoryId};

/// The minimum number of characters in a category name.
pub const MIN_CATEGORY_NAME_LENGTH: usize = 3;

/// The emoji shown for categories without one.
pub const DEFAULT_EMOJI: &str = "🏷️";

/// Whether a category classifies money coming in or going out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Money coming in, e.g. salary.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl CategoryKind {
    /// The value stored in the database and sent in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }

    /// The human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
        }
    }
}

/// Returned when a string is not a category kind.
#[derive(Debug, thiserror::Error)]
#[error("unknown category kind \"{0}\"")]
pub struct UnknownCategoryKind(String);

impl FromStr for CategoryKind {
    type Err = UnknownCategoryKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(CategoryKind::Income),
            "expense" => Ok(CategoryKind::Expense),
            other => Err(UnknownCategoryKind(other.to_owned())),
        }
    }
}

/// A validated category name with at least [MIN_CATEGORY_NAME_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::CategoryNameTooShort] if the
    /// trimmed `name` is shorter than [MIN_CATEGORY_NAME_LENGTH].
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.chars().count() < MIN_CATEGORY_NAME_LENGTH {
            Err(Error::CategoryNameTooShort(MIN_CATEGORY_NAME_LENGTH))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the name is long enough.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One or two emoji (grapheme clusters) used as a category icon.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emoji(String);

impl Emoji {
    /// Create an emoji icon from `text` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmoji] if the trimmed text is empty or longer
    /// than two grapheme clusters.
    pub fn new(text: &str) -> Result<Self, Error> {
        let text = text.trim();
        let length = text.graphemes(true).count();

        if (1..=2).contains(&length) {
            Ok(Self(text.to_owned()))
        } else {
            Err(Error::InvalidEmoji)
        }
    }

    /// Create an emoji from a stored value, falling back to [DEFAULT_EMOJI].
    pub(crate) fn from_stored(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => Self(text),
            _ => Self::default(),
        }
    }
}

impl Default for Emoji {
    fn default() -> Self {
        Self(DEFAULT_EMOJI.to_owned())
    }
}

impl AsRef<str> for Emoji {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Emoji {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label for classifying transactions, e.g. "Food & Drinks" or "Salary".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub kind: CategoryKind,
    pub emoji: Emoji,
    /// Default categories are created with the database and cannot be changed.
    pub is_default: bool,
}

impl Category {
    /// The emoji and name, e.g. "🍜 Food & Drinks".
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

/// Form data for category creation.
#[derive(Debug, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub emoji: Option<String>,
    pub kind: CategoryKind,
}

/// Form data for category editing, the kind of a category cannot change.
#[derive(Debug, Deserialize)]
pub struct EditCategoryFormData {
    pub name: String,
    pub emoji: Option<String>,
}

/// Parse an optional emoji from a form, using [DEFAULT_EMOJI] when blank.
pub(crate) fn parse_form_emoji(emoji: Option<&str>) -> Result<Emoji, Error> {
    match emoji.map(str::trim) {
        Some(text) if !text.is_empty() => Emoji::new(text),
        _ => Ok(Emoji::default()),
    }
}
