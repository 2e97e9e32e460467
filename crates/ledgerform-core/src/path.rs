//! Dotted binding paths into the shared form state.
//!
//! A path is either a top-level field name (`amount`) or a cell inside an
//! array-valued field (`transactions.2.amount`).

use std::fmt;

/// Dotted path addressing one value in the form state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(String);

/// One step of a parsed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

impl FieldPath {
    /// Path of a top-level field.
    #[must_use]
    pub fn field(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Path of one cell of a row in an array-valued field.
    #[must_use]
    pub fn cell(array: &str, index: usize, column: &str) -> Self {
        Self(format!("{array}.{index}.{column}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parsed segments; all-digit segments are array indexes.
    pub fn segments(&self) -> impl Iterator<Item = Segment<'_>> {
        self.0.split('.').filter(|part| !part.is_empty()).map(|part| {
            if part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().map_or(Segment::Key(part), Segment::Index)
            } else {
                Segment::Key(part)
            }
        })
    }

    /// For a path under `array` (`array.N` or `array.N.rest`), returns `N`.
    #[must_use]
    pub fn row_index_under(&self, array: &str) -> Option<usize> {
        let rest = self.0.strip_prefix(array)?.strip_prefix('.')?;
        let index = rest.split('.').next()?;
        index.parse().ok()
    }

    /// Rewrites the row index of a path under `array`, keeping the suffix.
    #[must_use]
    pub fn with_row_index(&self, array: &str, index: usize) -> Self {
        let Some(rest) = self.0.strip_prefix(array).and_then(|r| r.strip_prefix('.')) else {
            return self.clone();
        };
        match rest.split_once('.') {
            Some((_, suffix)) => Self(format!("{array}.{index}.{suffix}")),
            None => Self(format!("{array}.{index}")),
        }
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
