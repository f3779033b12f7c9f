//! Where the artifacts of one page live on disk.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Folder holding extracted region images, relative to the page folder.
pub const IMAGES_DIR: &str = "imgs";

/// Paths of every artifact produced for one page.
///
/// ```text
/// <root>/<page>/
///     imgs/
///     <page>_res.json
///     <page>_improved.json
///     <page>_result.docx
///     <page>.md
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOutputLocation {
    page: String,
    page_dir: PathBuf,
}

impl PageOutputLocation {
    /// Describe the location of `page` under `root` without touching the disk.
    pub fn new(root: impl AsRef<Path>, page: impl Into<String>) -> Self {
        let page = page.into();
        let page_dir = root.as_ref().join(&page);
        Self { page, page_dir }
    }

    /// Describe the location for an existing page folder; the page id is the folder name.
    pub fn from_page_dir(page_dir: impl Into<PathBuf>) -> Result<Self> {
        let page_dir = page_dir.into();
        let page = page_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Other(format!("not a page folder: {}", page_dir.display())))?;
        Ok(Self { page, page_dir })
    }

    /// Describe the location and create its folders.
    pub fn create(root: impl AsRef<Path>, page: impl Into<String>) -> Result<Self> {
        let location = Self::new(root, page);
        fs::create_dir_all(location.images_dir())?;
        Ok(location)
    }

    /// Page id.
    pub fn page(&self) -> &str {
        &self.page
    }

    /// The page folder.
    pub fn page_dir(&self) -> &Path {
        &self.page_dir
    }

    /// Folder of extracted region images.
    pub fn images_dir(&self) -> PathBuf {
        self.page_dir.join(IMAGES_DIR)
    }

    /// Raw OCR results.
    pub fn result_json(&self) -> PathBuf {
        self.artifact("_res.json")
    }

    /// Corrected OCR results.
    pub fn improved_json(&self) -> PathBuf {
        self.artifact("_improved.json")
    }

    /// Output DOCX.
    pub fn docx(&self) -> PathBuf {
        self.artifact("_result.docx")
    }

    /// Output Markdown.
    pub fn markdown(&self) -> PathBuf {
        self.artifact(".md")
    }

    /// The results JSON to build from: corrected if present, else raw.
    pub fn preferred_json(&self) -> Option<PathBuf> {
        [self.improved_json(), self.result_json()]
            .into_iter()
            .find(|path| path.is_file())
    }

    fn artifact(&self, suffix: &str) -> PathBuf {
        self.page_dir.join(format!("{}{}", self.page, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let location = PageOutputLocation::new("output", "620");
        assert_eq!(location.page_dir(), Path::new("output/620"));
        assert_eq!(location.images_dir(), Path::new("output/620/imgs"));
        assert_eq!(location.result_json(), Path::new("output/620/620_res.json"));
        assert_eq!(
            location.improved_json(),
            Path::new("output/620/620_improved.json")
        );
        assert_eq!(location.docx(), Path::new("output/620/620_result.docx"));
        assert_eq!(location.markdown(), Path::new("output/620/620.md"));
    }

    #[test]
    fn test_create_makes_folders() {
        let dir = tempfile::tempdir().unwrap();
        let location = PageOutputLocation::create(dir.path(), "7").unwrap();
        assert!(location.images_dir().is_dir());
        // idempotent
        PageOutputLocation::create(dir.path(), "7").unwrap();
    }

    #[test]
    fn test_from_page_dir() {
        let location = PageOutputLocation::from_page_dir("output/12").unwrap();
        assert_eq!(location.page(), "12");
        assert_eq!(location, PageOutputLocation::new("output", "12"));
    }

    #[test]
    fn test_preferred_json() {
        let dir = tempfile::tempdir().unwrap();
        let location = PageOutputLocation::create(dir.path(), "3").unwrap();
        assert_eq!(location.preferred_json(), None);

        fs::write(location.result_json(), "{}").unwrap();
        assert_eq!(location.preferred_json(), Some(location.result_json()));

        fs::write(location.improved_json(), "{}").unwrap();
        assert_eq!(location.preferred_json(), Some(location.improved_json()));
    }
}
