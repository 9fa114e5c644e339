//! Page range selection
//!
//! Parses expressions such as `"1-3, 5, 7"` against a document's page count
//! and yields the zero-based page indices to copy, in the order written.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use crate::error::{Error, Result};

/// One comma-separated unit of a range expression (1-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageUnit {
    /// A single page, e.g. `5`
    Single(usize),
    /// An inclusive range, e.g. `3-7`
    Range { start: usize, end: usize },
}

impl FromStr for PageUnit {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        let token = token.trim();
        let malformed = || Error::MalformedRange(token.to_string());

        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_page_number(start).ok_or_else(malformed)?;
                let end = parse_page_number(end).ok_or_else(malformed)?;
                Ok(PageUnit::Range { start, end })
            }
            None => parse_page_number(token)
                .map(PageUnit::Single)
                .ok_or_else(malformed),
        }
    }
}

/// Parse one side of a unit. Only plain decimal digits are accepted.
///
/// A number too large for `usize` saturates, so it is reported as out of
/// range rather than malformed.
fn parse_page_number(s: &str) -> Option<usize> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse().unwrap_or(usize::MAX))
}

impl PageUnit {
    /// Check this unit against a document with `total` pages
    pub fn validate(&self, total: usize) -> Result<()> {
        match *self {
            PageUnit::Range { start, end } => {
                let in_bounds = |p: usize| (1..=total).contains(&p);
                if start <= end && in_bounds(start) && in_bounds(end) {
                    Ok(())
                } else {
                    Err(Error::InvalidRange(self.to_string()))
                }
            }
            PageUnit::Single(page) => {
                if (1..=total).contains(&page) {
                    Ok(())
                } else {
                    Err(Error::PageOutOfRange { page, total })
                }
            }
        }
    }

    /// Zero-based indices covered by this unit, ascending
    pub fn indices(&self) -> RangeInclusive<usize> {
        match *self {
            PageUnit::Single(page) => page - 1..=page - 1,
            PageUnit::Range { start, end } => start - 1..=end - 1,
        }
    }
}

impl fmt::Display for PageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageUnit::Single(page) => write!(f, "{}", page),
            PageUnit::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

/// A range expression resolved against a known page count
///
/// Every unit has been validated, so [`PageSelector::indices`] only yields
/// indices below the page count it was parsed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelector {
    units: Vec<PageUnit>,
    total_pages: usize,
}

impl PageSelector {
    /// Parse and validate `expr` for a document with `total_pages` pages.
    ///
    /// Units are handled left to right and the first failing unit decides
    /// the error: a token that is not a number or `a-b` pair gives
    /// [`Error::MalformedRange`], a bad range [`Error::InvalidRange`] and a
    /// single page outside the document [`Error::PageOutOfRange`].
    ///
    /// ```
    /// use pdf_edit::range::PageSelector;
    ///
    /// let selector = PageSelector::parse("1-3, 2", 5).unwrap();
    /// assert_eq!(selector.indices().collect::<Vec<_>>(), vec![0, 1, 2, 1]);
    /// ```
    pub fn parse(expr: &str, total_pages: usize) -> Result<Self> {
        let mut units = Vec::new();
        for token in expr.split(',') {
            let unit: PageUnit = token.parse()?;
            unit.validate(total_pages)?;
            units.push(unit);
        }

        Ok(Self { units, total_pages })
    }

    /// The parsed units, in the order written
    pub fn units(&self) -> &[PageUnit] {
        &self.units
    }

    /// Page count this selector was validated against
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Zero-based page indices in output order, duplicates included
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.units.iter().flat_map(PageUnit::indices)
    }

    /// Number of pages the selection produces
    pub fn len(&self) -> usize {
        self.units.iter().map(|u| u.indices().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve `expr` straight to zero-based indices
pub fn resolve_page_range(expr: &str, total_pages: usize) -> Result<Vec<usize>> {
    Ok(PageSelector::parse(expr, total_pages)?.indices().collect())
}
