//! Output document model.

use super::TableGrid;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A reconstructed document: the elements of one page, in render order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Elements in render order
    pub elements: Vec<Element>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element.
    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Get the number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over elements in render order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Get plain text content of the document.
    pub fn plain_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(Element::plain_text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// One rendered element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// Document title
    Title {
        /// Title text
        text: String,
    },

    /// Section heading
    Heading {
        /// Heading text
        text: String,
        /// Heading level (1-9)
        level: u8,
    },

    /// Body paragraph
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// Embedded picture, read from disk when the document is saved
    Image {
        /// Location of the region image
        path: PathBuf,
    },

    /// Table
    Table(TableGrid),

    /// Centered page number
    PageNumber {
        /// Page number digits
        number: String,
    },
}

impl Element {
    /// Short name of the element kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Title { .. } => "title",
            Element::Heading { .. } => "heading",
            Element::Paragraph { .. } => "paragraph",
            Element::Image { .. } => "image",
            Element::Table(_) => "table",
            Element::PageNumber { .. } => "page_number",
        }
    }

    /// Text carried by the element, if it has any.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Element::Title { text } | Element::Heading { text, .. } | Element::Paragraph { text } => {
                Some(text.clone())
            }
            Element::Table(grid) => Some(grid.plain_text()),
            Element::PageNumber { number } => Some(number.clone()),
            Element::Image { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_plain_text_skips_images() {
        let mut doc = Document::new();
        doc.push(Element::Title {
            text: "Report".into(),
        });
        doc.push(Element::Image {
            path: PathBuf::from("imgs/a.jpg"),
        });
        doc.push(Element::PageNumber {
            number: "3".into(),
        });
        assert_eq!(doc.plain_text(), "Report\n\n3");
    }

    #[test]
    fn test_element_serializes_with_type_tag() {
        let json = serde_json::to_string(&Element::Heading {
            text: "Scope".into(),
            level: 1,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"heading\""));
        assert!(json.contains("\"level\":1"));
    }
}
