//! Markdown rendering for assembled documents.

use crate::error::Result;
use crate::model::{Document, Element, GridRow, TableGrid};
use std::path::Path;

use super::{RenderOptions, TableFallback};

/// Convert a document to Markdown.
pub fn to_markdown(doc: &Document, options: &RenderOptions) -> Result<String> {
    let renderer = MarkdownRenderer::new(options.clone());
    renderer.render(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown.
    pub fn render(self, doc: &Document) -> Result<String> {
        let mut output = String::new();
        for element in doc.iter() {
            self.render_element(&mut output, element);
        }
        Ok(output.trim().to_string())
    }

    fn render_element(&self, output: &mut String, element: &Element) {
        match element {
            Element::Title { text } => {
                output.push_str(&format!("# {}\n\n", escape_markdown(text.trim())));
            }
            Element::Heading { text, level } => {
                // The title takes level one.
                let prefix = "#".repeat((*level as usize + 1).min(6));
                output.push_str(&format!("{} {}\n\n", prefix, escape_markdown(text.trim())));
            }
            Element::Paragraph { text } => {
                if text.trim().is_empty() {
                    return;
                }
                output.push_str(&escape_markdown(text.trim()));
                output.push_str("\n\n");
            }
            Element::Image { path } => {
                self.render_image(output, path);
            }
            Element::Table(grid) => {
                if grid.is_empty() {
                    return;
                }
                self.render_table(output, grid);
            }
            Element::PageNumber { number } => {
                output.push_str(&format!("<p align=\"center\">{}</p>\n\n", number));
            }
        }
    }

    fn render_image(&self, output: &mut String, path: &Path) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        output.push_str(&format!(
            "![]({}{})\n\n",
            self.options.image_path_prefix, file_name
        ));
    }

    fn render_table(&self, output: &mut String, grid: &TableGrid) {
        if grid.has_merged_cells() && self.options.table_fallback == TableFallback::Html {
            self.render_table_html(output, grid);
            return;
        }
        self.render_table_markdown(output, grid);
    }

    fn render_table_markdown(&self, output: &mut String, grid: &TableGrid) {
        for i in 0..grid.row_count() {
            output.push('|');
            for column in 0..grid.width {
                let text = grid
                    .cell_at(i, column)
                    .map(|cell| escape_markdown(&cell.text))
                    .unwrap_or_default();
                output.push_str(&format!(" {} |", text));
            }
            output.push('\n');

            if i == 0 {
                output.push('|');
                output.push_str(&" --- |".repeat(grid.width));
                output.push('\n');
            }
        }
        output.push('\n');
    }

    fn render_table_html(&self, output: &mut String, grid: &TableGrid) {
        output.push_str("<table>\n");
        for row in &grid.rows {
            self.render_html_row(output, row, grid.width);
        }
        output.push_str("</table>\n\n");
    }

    fn render_html_row(&self, output: &mut String, row: &GridRow, width: usize) {
        output.push_str("<tr>");
        for cell in &row.cells {
            let tag = if cell.is_header { "th" } else { "td" };
            let attrs = if cell.is_merged() {
                format!(" colspan=\"{}\"", cell.column_span)
            } else {
                String::new()
            };
            output.push_str(&format!(
                "<{}{}>{}</{}>",
                tag,
                attrs,
                escape_html(&cell.text),
                tag
            ));
        }
        for _ in row.filled_columns()..width {
            output.push_str("<td></td>");
        }
        output.push_str("</tr>\n");
    }
}

/// Escape special Markdown characters.
/// Only characters that could be misinterpreted as Markdown syntax.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Escape text for an HTML element body.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceCell;
    use std::path::PathBuf;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("[link]"), "\\[link\\]");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn test_render_title_heading_paragraph() {
        let mut doc = Document::new();
        doc.push(Element::Title {
            text: "Quyet dinh".into(),
        });
        doc.push(Element::Heading {
            text: "Dieu 1".into(),
            level: 1,
        });
        doc.push(Element::Paragraph {
            text: "Noi dung.".into(),
        });

        let result = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(result, "# Quyet dinh\n\n## Dieu 1\n\nNoi dung.");
    }

    #[test]
    fn test_render_image_uses_prefix() {
        let mut doc = Document::new();
        doc.push(Element::Image {
            path: PathBuf::from("/tmp/out/7/imgs/img_in_image_box_1_2_3_4.jpg"),
        });

        let result = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(result, "![](imgs/img_in_image_box_1_2_3_4.jpg)");
    }

    #[test]
    fn test_render_merged_table_as_html() {
        let mut doc = Document::new();
        doc.push(Element::Table(TableGrid::build(vec![
            vec![SourceCell::data("Tong").colspan(2)],
            vec![SourceCell::data("a"), SourceCell::data("b")],
            vec![SourceCell::data("c")],
        ])));

        let result = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert!(result.contains("<td colspan=\"2\">Tong</td>"));
        assert!(result.contains("<tr><th>a</th><th>b</th></tr>"));
        assert!(result.contains("<tr><td>c</td><td></td></tr>"));
    }

    #[test]
    fn test_render_plain_table_as_pipes() {
        let mut doc = Document::new();
        doc.push(Element::Table(TableGrid::build(vec![
            vec![SourceCell::data("a"), SourceCell::data("b")],
            vec![SourceCell::data("c")],
        ])));

        let result = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(result, "| a | b |\n| --- | --- |\n| c |  |");
    }

    #[test]
    fn test_render_page_number() {
        let mut doc = Document::new();
        doc.push(Element::PageNumber {
            number: "42".into(),
        });
        let result = to_markdown(&doc, &RenderOptions::new()).unwrap();
        assert_eq!(result, "<p align=\"center\">42</p>");
    }
}
