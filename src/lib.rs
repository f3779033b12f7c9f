//! # redocx
//!
//! Rebuild scanned document pages as editable Word documents.
//!
//! A page image (or PDF) goes through an external OCR + layout-analysis
//! service, an optional text-correction service, and finally a document
//! assembler that turns the ordered layout blocks into a styled DOCX file
//! (plus a Markdown rendering of the same content).
//!
//! ## Quick Start
//!
//! ```no_run
//! use redocx::{assemble_file, render};
//!
//! fn main() -> redocx::Result<()> {
//!     // Assemble a page from its OCR results
//!     let doc = assemble_file("output/12/12_res.json", "output/12/imgs")?;
//!
//!     // Write it as DOCX
//!     let options = render::RenderOptions::default();
//!     render::save_docx(&doc, &options, "output/12/12_result.docx")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Batch processing
//!
//! ```no_run
//! use redocx::pipeline::{collect_inputs, CommandOcrProvider, CommandSpec, PageRange, Pipeline, PipelineOptions};
//!
//! fn main() -> redocx::Result<()> {
//!     let ocr = CommandOcrProvider::spawn(&CommandSpec::parse("python3 ocr_server.py")?)?;
//!     let mut pipeline = Pipeline::new(Box::new(ocr), None, PipelineOptions::new());
//!
//!     let files = collect_inputs("input", PageRange::parse("1-50")?)?;
//!     let report = pipeline.run(&files);
//!     println!("{} pages done, {} failed", report.succeeded.len(), report.failed.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout-driven assembly**: titles, headings, paragraphs, images, tables, page numbers
//! - **Merged table cells**: HTML `colspan` becomes real merged DOCX cells
//! - **Pluggable services**: OCR and correction behind traits, or helper processes
//! - **Resumable batches**: every stage persists its output per page

pub mod assemble;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod rename;

// Re-export commonly used types
pub use assemble::{assemble, DocumentBuilder};
pub use error::{Error, Result};
pub use model::{Block, BoundingBox, Document, Element, Label, PageResult, TableGrid};
pub use pipeline::{
    build_page, BatchReport, OcrProvider, PageOutputLocation, PageRange, Pipeline,
    PipelineOptions, TextCorrector,
};
pub use render::{ExtractionStats, RenderOptions, StylePolicy, TableFallback};
pub use rename::{rename_numbered, RenameReport};

use std::path::Path;

/// Read a results JSON and assemble its blocks into a document.
///
/// # Arguments
///
/// * `json_path` - Path to a `<page>_res.json` or `<page>_improved.json`
/// * `images_dir` - Folder holding the page's extracted region images
pub fn assemble_file<P: AsRef<Path>, Q: AsRef<Path>>(json_path: P, images_dir: Q) -> Result<Document> {
    let page = PageResult::from_path(json_path)?;
    Ok(assemble(&page.blocks, images_dir.as_ref()))
}

/// Build a DOCX file straight from a results JSON.
///
/// # Example
///
/// ```no_run
/// let stats = redocx::build_docx("out/7/7_res.json", "out/7/imgs", "out/7/7_result.docx").unwrap();
/// println!("{} tables", stats.table_count);
/// ```
pub fn build_docx<P, Q, R>(json_path: P, images_dir: Q, docx_path: R) -> Result<ExtractionStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let doc = assemble_file(json_path, images_dir)?;
    render::save_docx(&doc, &RenderOptions::default(), docx_path)
}

/// Render a results JSON as Markdown.
pub fn to_markdown<P: AsRef<Path>, Q: AsRef<Path>>(json_path: P, images_dir: Q) -> Result<String> {
    let doc = assemble_file(json_path, images_dir)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_assemble_file_missing_json() {
        let dir = tempfile::tempdir().unwrap();
        let err = assemble_file(dir.path().join("1_res.json"), dir.path()).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(_)));
    }

    #[test]
    fn test_to_markdown_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("1_res.json");
        fs::write(
            &json,
            r#"{"parsing_res_list":[
                {"block_label":"doc_title","block_content":"Thong bao"},
                {"block_label":"text","block_content":"Noi dung"},
                {"block_label":"number","block_content":"1"}
            ]}"#,
        )
        .unwrap();

        let md = to_markdown(&json, dir.path().join("imgs")).unwrap();
        assert_eq!(md, "# Thong bao\n\nNoi dung\n\n<p align=\"center\">1</p>");
    }
}
