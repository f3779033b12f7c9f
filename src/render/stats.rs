//! Content counters filled while a document is rendered.

use crate::model::Element;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// What a rendered document contains.
///
/// Counters add up across pages, so a batch can report totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Titles and body paragraphs
    pub paragraph_count: u32,
    /// Headings
    pub heading_count: u32,
    /// Non-empty tables
    pub table_count: u32,
    /// Embedded pictures
    pub image_count: u32,
    /// Centered page numbers
    pub page_number_count: u32,
    /// Whitespace-separated words in paragraphs, headings and table cells
    pub word_count: u32,
    /// Non-whitespace characters in the same text
    pub char_count: u32,
}

impl ExtractionStats {
    /// Empty counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one element that was written to the output.
    pub fn record(&mut self, element: &Element) {
        match element {
            Element::Title { text } | Element::Paragraph { text } => {
                self.paragraph_count += 1;
                self.count_words(text);
            }
            Element::Heading { text, .. } => {
                self.heading_count += 1;
                self.count_words(text);
            }
            Element::PageNumber { .. } => self.page_number_count += 1,
            Element::Image { .. } => self.image_count += 1,
            Element::Table(grid) => {
                self.table_count += 1;
                self.count_words(&grid.plain_text());
            }
        }
    }

    fn count_words(&mut self, text: &str) {
        for word in text.split_whitespace() {
            self.word_count += 1;
            self.char_count += word.chars().count() as u32;
        }
    }
}

impl AddAssign<&ExtractionStats> for ExtractionStats {
    fn add_assign(&mut self, other: &ExtractionStats) {
        self.paragraph_count += other.paragraph_count;
        self.heading_count += other.heading_count;
        self.table_count += other.table_count;
        self.image_count += other.image_count;
        self.page_number_count += other.page_number_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
    }
}
