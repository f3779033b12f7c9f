//! Interfaces of the external OCR and text-correction services.
//!
//! Both are request/response services that are expensive to start, so a
//! batch constructs one instance of each up front and lends it to every
//! page. Methods take `&mut self`: a provider never has two calls in flight.

use crate::error::Result;
use crate::model::PageResult;
use std::path::Path;

/// Layout analysis + OCR for page images and PDFs.
pub trait OcrProvider {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "ocr"
    }

    /// Analyze `input`, returning one result per page found in it.
    ///
    /// Region images the provider extracts go under `output_dir/imgs/`,
    /// named after their bounding boxes.
    fn predict(&mut self, input: &Path, output_dir: &Path) -> Result<Vec<PageResult>>;
}

/// Text correction for raw OCR strings.
pub trait TextCorrector {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "corrector"
    }

    /// Correct a single string.
    fn correct(&mut self, text: &str) -> Result<String>;

    /// Correct several strings, returning them in the same order.
    ///
    /// The default implementation corrects one string at a time.
    fn correct_batch(&mut self, texts: &[String]) -> Result<Vec<String>> {
        texts.iter().map(|text| self.correct(text)).collect()
    }
}
