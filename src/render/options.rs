//! Rendering options and configuration.

/// Options for rendering an assembled document.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Widest an embedded image may be, in pixels at 96 DPI
    pub max_image_width_px: u32,

    /// Total table width in twentieths of a point
    pub table_width_twips: usize,

    /// Prefix for image paths in Markdown output (e.g., "imgs/")
    pub image_path_prefix: String,

    /// How to render tables in Markdown output
    pub table_fallback: TableFallback,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum image width.
    pub fn with_max_image_width(mut self, px: u32) -> Self {
        self.max_image_width_px = px.max(1);
        self
    }

    /// Set the table width.
    pub fn with_table_width(mut self, twips: usize) -> Self {
        self.table_width_twips = twips;
        self
    }

    /// Set the image path prefix.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_path_prefix = prefix.into();
        self
    }

    /// Set the table fallback mode.
    pub fn with_table_fallback(mut self, fallback: TableFallback) -> Self {
        self.table_fallback = fallback;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            // 6.5in of A4/Letter text width
            max_image_width_px: 624,
            table_width_twips: 9360,
            image_path_prefix: "imgs/".to_string(),
            table_fallback: TableFallback::Html,
        }
    }
}

/// How to render tables in Markdown, which has no merged cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableFallback {
    /// Pipe tables; merged cells repeat their text in every covered column
    Markdown,
    /// HTML tables whenever a cell spans several columns
    #[default]
    Html,
}
