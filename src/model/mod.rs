//! Document model types for OCR layout content.
//!
//! This module defines the two sides of the reconstruction engine: the
//! classified blocks an OCR provider produces for a page, and the ordered
//! element model the assembler builds from them before it is rendered.

mod block;
mod document;
mod table;

pub use block::{Block, BoundingBox, Label, PageResult};
pub use document::{Document, Element};
pub use table::{GridCell, GridRow, SourceCell, TableGrid};
