//! Page assembly: from ordered OCR blocks to an output document.
//!
//! [`assemble`] walks the blocks of one page in order and hands each one to a
//! [`DocumentBuilder`] operation chosen by its label. The builder owns the
//! document being built; it is consumed by [`DocumentBuilder::finish`] or
//! [`DocumentBuilder::save`], so a builder can never leak into a second page.

use crate::error::Result;
use crate::model::{Block, Document, Element, Label};
use crate::parser::parse_table;
use crate::render::{save_docx, ExtractionStats, RenderOptions};
use std::path::{Path, PathBuf};

/// Incrementally builds one output document.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
    options: RenderOptions,
}

impl DocumentBuilder {
    /// Create a builder with default render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom render options.
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            document: Document::new(),
            options,
        }
    }

    /// Add a document title.
    pub fn add_title(&mut self, text: impl Into<String>) {
        self.document.push(Element::Title { text: text.into() });
    }

    /// Add a heading. Levels are clamped to 1-9.
    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) {
        self.document.push(Element::Heading {
            text: text.into(),
            level: level.clamp(1, 9),
        });
    }

    /// Add a body paragraph.
    pub fn add_paragraph(&mut self, text: impl Into<String>) {
        self.document.push(Element::Paragraph { text: text.into() });
    }

    /// Add a picture. The file is read when the document is saved.
    pub fn add_image(&mut self, path: impl Into<PathBuf>) {
        self.document.push(Element::Image { path: path.into() });
    }

    /// Add a table from markup. Returns whether a table was added.
    pub fn add_table(&mut self, markup: &str) -> bool {
        match parse_table(markup) {
            Some(grid) => {
                self.document.push(Element::Table(grid));
                true
            }
            None => false,
        }
    }

    /// Add a centered page number.
    pub fn add_page_number(&mut self, number: impl Into<String>) {
        self.document.push(Element::PageNumber {
            number: number.into(),
        });
    }

    /// Number of elements added so far.
    pub fn len(&self) -> usize {
        self.document.len()
    }

    /// Check if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    /// Finish building and return the document model.
    pub fn finish(self) -> Document {
        self.document
    }

    /// Finish building and write the document as DOCX, replacing `path`.
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<ExtractionStats> {
        save_docx(&self.document, &self.options, path)
    }
}

/// Assemble the blocks of one page into a document.
///
/// `images_dir` is where the OCR provider stored extracted region images.
pub fn assemble(blocks: &[Block], images_dir: &Path) -> Document {
    let mut builder = DocumentBuilder::new();
    assemble_into(&mut builder, blocks, images_dir);
    builder.finish()
}

/// Feed the blocks of one page to an existing builder, in order.
pub fn assemble_into(builder: &mut DocumentBuilder, blocks: &[Block], images_dir: &Path) {
    let last = blocks.len().saturating_sub(1);

    for (index, block) in blocks.iter().enumerate() {
        let content = block.content.as_str();
        match &block.label {
            Label::DocTitle => builder.add_title(content),
            Label::ParagraphTitle => builder.add_heading(content, 1),
            Label::Image => match &block.bbox {
                Some(bbox) => builder.add_image(images_dir.join(bbox.image_file_name())),
                None => log::warn!("Skipping image block {} without a usable bounding box", index),
            },
            Label::Table => {
                if !builder.add_table(content) {
                    log::debug!("Table block {} has no table markup", index);
                }
            }
            Label::Number => {
                if index == last && is_page_number(content) {
                    builder.add_page_number(content.trim());
                } else {
                    log::debug!("Dropping number block {}: {:?}", index, content);
                }
            }
            Label::Text | Label::Other(_) => builder.add_paragraph(content),
        }
    }
}

/// A page number is a non-empty run of ASCII digits, ignoring surrounding whitespace.
pub fn is_page_number(content: &str) -> bool {
    let trimmed = content.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}
