//! Fixed visual styles for each kind of block.

use crate::model::Element;
use serde::{Deserialize, Serialize};

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left-aligned (default)
    #[default]
    Left,
    /// Centered
    Center,
    /// Right-aligned
    Right,
}

/// Font and paragraph settings of one named style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Style identifier in the output document
    pub style_id: &'static str,
    /// Display name of the style
    pub name: &'static str,
    /// Font size in points
    pub font_size_pt: u32,
    /// Bold text
    pub bold: bool,
    /// Paragraph alignment
    pub alignment: Alignment,
}

impl TextStyle {
    /// Font size in half-points, the unit DOCX run properties use.
    pub fn half_points(&self) -> usize {
        self.font_size_pt as usize * 2
    }
}

/// Name of the table style applied to every table.
pub const TABLE_STYLE_NAME: &str = "Light List Accent 1";

/// Identifier of [`TABLE_STYLE_NAME`] in the output document.
pub const TABLE_STYLE_ID: &str = "LightListAccent1";

/// Static mapping from block label to visual style.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylePolicy;

impl StylePolicy {
    /// `doc_title` blocks.
    pub const TITLE: TextStyle = TextStyle {
        style_id: "Title",
        name: "Title",
        font_size_pt: 24,
        bold: true,
        alignment: Alignment::Center,
    };

    /// `paragraph_title` blocks.
    pub const HEADING_1: TextStyle = TextStyle {
        style_id: "Heading1",
        name: "Heading 1",
        font_size_pt: 18,
        bold: true,
        alignment: Alignment::Left,
    };

    /// Body text, unknown labels, and table cells.
    pub const NORMAL: TextStyle = TextStyle {
        style_id: "Normal",
        name: "Normal",
        font_size_pt: 12,
        bold: false,
        alignment: Alignment::Left,
    };

    /// Page numbers keep the body font but are centered.
    pub const PAGE_NUMBER: TextStyle = TextStyle {
        alignment: Alignment::Center,
        ..Self::NORMAL
    };

    /// Styles added next to the document's built-in `Normal` style.
    pub const DEFINED: [TextStyle; 2] = [Self::TITLE, Self::HEADING_1];

    /// Style for an assembled element.
    pub fn for_element(element: &Element) -> TextStyle {
        match element {
            Element::Title { .. } => Self::TITLE,
            Element::Heading { .. } => Self::HEADING_1,
            Element::PageNumber { .. } => Self::PAGE_NUMBER,
            Element::Paragraph { .. } | Element::Image { .. } | Element::Table(_) => Self::NORMAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_styles() {
        let title = StylePolicy::for_element(&Element::Title { text: "A".into() });
        assert_eq!(title.font_size_pt, 24);
        assert!(title.bold);
        assert_eq!(title.alignment, Alignment::Center);

        let heading = StylePolicy::for_element(&Element::Heading {
            text: "B".into(),
            level: 1,
        });
        assert_eq!(heading.font_size_pt, 18);
        assert!(heading.bold);
        assert_eq!(heading.alignment, Alignment::Left);

        let body = StylePolicy::for_element(&Element::Paragraph { text: "c".into() });
        assert_eq!(body, StylePolicy::NORMAL);
        assert!(!body.bold);
    }

    #[test]
    fn test_page_number_centered() {
        let style = StylePolicy::for_element(&Element::PageNumber {
            number: "4".into(),
        });
        assert_eq!(style.alignment, Alignment::Center);
        assert_eq!(style.font_size_pt, StylePolicy::NORMAL.font_size_pt);
    }

    #[test]
    fn test_half_points() {
        assert_eq!(StylePolicy::TITLE.half_points(), 48);
        assert_eq!(StylePolicy::NORMAL.half_points(), 24);
    }
}
