//! Rendering module for writing assembled documents to output formats.

mod docx;
mod markdown;
mod options;
mod stats;
pub mod style;

pub(crate) use markdown::escape_html;

pub use docx::{save_docx, to_docx, DocxRenderer};
pub use markdown::{to_markdown, MarkdownRenderer};
pub use options::{RenderOptions, TableFallback};
pub use stats::ExtractionStats;
pub use style::{Alignment, StylePolicy, TextStyle};
