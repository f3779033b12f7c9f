//! Parsers for OCR block content.
//!
//! Layout providers encode tables as HTML fragments inside the block
//! content. This module turns that markup into a [`TableGrid`](crate::model::TableGrid).

mod table;

pub use table::{cell_text, parse_table, MAX_COLSPAN};
