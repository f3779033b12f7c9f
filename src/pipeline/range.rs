//! Inclusive page number ranges with optional bounds.

use crate::error::{Error, Result};
use std::ops::RangeInclusive;

/// Inclusive range of page numbers. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRange {
    /// Lowest page to include
    pub min: Option<u32>,
    /// Highest page to include
    pub max: Option<u32>,
}

impl PageRange {
    /// Range that includes every page, numbered or not.
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a range, rejecting `min > max`.
    pub fn new(min: Option<u32>, max: Option<u32>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(Error::InvalidPageRange(format!(
                    "min {} is greater than max {}",
                    lo, hi
                )));
            }
        }
        Ok(Self { min, max })
    }

    /// Whether neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Check if a page number falls inside the range.
    pub fn includes(&self, page: u32) -> bool {
        self.min.map_or(true, |lo| page >= lo) && self.max.map_or(true, |hi| page <= hi)
    }

    /// Check if a page id (a file stem) falls inside the range.
    ///
    /// Without bounds every stem is included. With a bound, only numeric
    /// stems can be compared; anything else is excluded.
    pub fn includes_stem(&self, stem: &str) -> bool {
        if self.is_unbounded() {
            return true;
        }
        match stem.parse::<u32>() {
            Ok(page) => self.includes(page),
            Err(_) => false,
        }
    }

    /// The pages to visit, when both bounds are set.
    pub fn pages(&self) -> Option<RangeInclusive<u32>> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => Some(lo..=hi),
            _ => None,
        }
    }

    /// Parse a range string (e.g., "10-20", "10-", "-20", "7", "all").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let bound = |part: &str| -> Result<Option<u32>> {
            let part = part.trim();
            if part.is_empty() {
                return Ok(None);
            }
            part.parse()
                .map(Some)
                .map_err(|_| Error::InvalidPageRange(format!("invalid page number: {:?}", part)))
        };

        match s.split_once('-') {
            Some((start, end)) => Self::new(bound(start)?, bound(end)?),
            None => {
                let page = bound(s)?;
                Self::new(page, page)
            }
        }
    }
}
