//! DOCX rendering for assembled documents.

use crate::error::{Error, Result};
use crate::model::{Document, Element, TableGrid};
use docx_rs::{AlignmentType, BreakType, Docx, Pic, Run, Style, StyleType};
use image::{GenericImageView, ImageFormat};
use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::Path;

use super::style::{Alignment, StylePolicy, TextStyle, TABLE_STYLE_ID, TABLE_STYLE_NAME};
use super::{ExtractionStats, RenderOptions};

/// English Metric Units per pixel at 96 DPI.
const EMU_PER_PX: u32 = 9525;

/// Build a DOCX package in memory.
pub fn to_docx(doc: &Document, options: &RenderOptions) -> Result<Docx> {
    DocxRenderer::new(options.clone()).render(doc)
}

/// Render a document and write it to `path`, replacing any existing file.
pub fn save_docx<P: AsRef<Path>>(
    doc: &Document,
    options: &RenderOptions,
    path: P,
) -> Result<ExtractionStats> {
    let mut renderer = DocxRenderer::new(options.clone());
    let docx = renderer.render_internal(doc)?;
    let file = File::create(path.as_ref())?;
    docx.build()
        .pack(file)
        .map_err(|e| Error::Render(format!("DOCX packaging error: {}", e)))?;
    log::debug!("Wrote {}", path.as_ref().display());
    Ok(renderer.stats)
}

/// DOCX renderer.
pub struct DocxRenderer {
    options: RenderOptions,
    stats: ExtractionStats,
}

impl DocxRenderer {
    /// Create a new DOCX renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            stats: ExtractionStats::new(),
        }
    }

    /// Render a document to an in-memory DOCX package.
    pub fn render(mut self, doc: &Document) -> Result<Docx> {
        self.render_internal(doc)
    }

    fn render_internal(&mut self, doc: &Document) -> Result<Docx> {
        let mut docx = base_document();
        for element in doc.iter() {
            docx = self.render_element(docx, element)?;
        }
        Ok(docx)
    }

    fn render_element(&mut self, docx: Docx, element: &Element) -> Result<Docx> {
        let style = StylePolicy::for_element(element);
        let docx = match element {
            Element::Title { text } | Element::Paragraph { text } => {
                docx.add_paragraph(styled_paragraph(text, &style))
            }
            Element::Heading { text, level } => {
                let style_id = format!("Heading{}", level);
                docx.add_paragraph(styled_paragraph(text, &style).style(&style_id))
            }
            Element::PageNumber { number } => docx.add_paragraph(styled_paragraph(number, &style)),
            Element::Image { path } => docx.add_paragraph(self.image_paragraph(path)?),
            Element::Table(grid) => {
                if grid.is_empty() {
                    return Ok(docx);
                }
                docx.add_table(self.table(grid))
            }
        };
        self.stats.record(element);
        Ok(docx)
    }

    fn image_paragraph(&self, path: &Path) -> Result<docx_rs::Paragraph> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ImageNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        let img = image::load_from_memory(&bytes)?;
        let (width, height) = img.dimensions();

        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let (fit_w, fit_h) = fit_width(width, height, self.options.max_image_width_px);
        let pic = Pic::new_with_dimensions(png, width, height)
            .size(fit_w * EMU_PER_PX, fit_h * EMU_PER_PX);

        Ok(docx_rs::Paragraph::new().add_run(Run::new().add_image(pic)))
    }

    fn table(&self, grid: &TableGrid) -> docx_rs::Table {
        let column_width = self.options.table_width_twips / grid.width.max(1);

        let rows = grid
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<docx_rs::TableCell> = row
                    .cells
                    .iter()
                    .map(|cell| {
                        let run = text_run(&cell.text, &StylePolicy::NORMAL, cell.is_header);
                        let table_cell = docx_rs::TableCell::new()
                            .add_paragraph(docx_rs::Paragraph::new().add_run(run));
                        if cell.is_merged() {
                            table_cell.grid_span(cell.column_span)
                        } else {
                            table_cell
                        }
                    })
                    .collect();

                // Trailing columns the row does not reach stay empty.
                for _ in row.filled_columns()..grid.width {
                    cells.push(docx_rs::TableCell::new().add_paragraph(docx_rs::Paragraph::new()));
                }
                docx_rs::TableRow::new(cells)
            })
            .collect();

        docx_rs::Table::new(rows)
            .style(TABLE_STYLE_ID)
            .set_grid(vec![column_width; grid.width])
    }
}

fn base_document() -> Docx {
    let mut docx = Docx::new().default_size(StylePolicy::NORMAL.half_points());
    for style in StylePolicy::DEFINED {
        docx = docx.add_style(paragraph_style(&style));
    }
    docx.add_style(Style::new(TABLE_STYLE_ID, StyleType::Table).name(TABLE_STYLE_NAME))
}

fn paragraph_style(style: &TextStyle) -> Style {
    let mut def = Style::new(style.style_id, StyleType::Paragraph)
        .name(style.name)
        .size(style.half_points())
        .align(alignment_type(style.alignment));
    if style.bold {
        def = def.bold();
    }
    def
}

fn styled_paragraph(text: &str, style: &TextStyle) -> docx_rs::Paragraph {
    docx_rs::Paragraph::new()
        .style(style.style_id)
        .align(alignment_type(style.alignment))
        .add_run(text_run(text, style, style.bold))
}

/// Build a run, turning newlines into line breaks.
fn text_run(text: &str, style: &TextStyle, bold: bool) -> Run {
    let mut run = Run::new().size(style.half_points());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    if bold {
        run = run.bold();
    }
    run
}

fn alignment_type(alignment: Alignment) -> AlignmentType {
    match alignment {
        Alignment::Left => AlignmentType::Left,
        Alignment::Center => AlignmentType::Center,
        Alignment::Right => AlignmentType::Right,
    }
}

/// Scale an image down to `max_width`, keeping its aspect ratio.
fn fit_width(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (height as u64 * max_width as u64 / width as u64).max(1);
    (max_width, scaled as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceCell;
    use std::io::Read;
    use std::path::PathBuf;

    fn package_part(docx: Docx, name: &str) -> String {
        let mut buffer = Cursor::new(Vec::new());
        docx.build().pack(&mut buffer).unwrap();
        let mut archive = zip::ZipArchive::new(buffer).unwrap();
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    /// Markup from the innermost opening tag before `text` up to the text node.
    fn enclosing<'a>(xml: &'a str, tags: &[&str], text: &str) -> &'a str {
        let end = xml.find(&format!(">{}</w:t>", text)).unwrap();
        let start = tags
            .iter()
            .filter_map(|tag| xml[..end].rfind(tag))
            .max()
            .unwrap();
        &xml[start..end]
    }

    fn cell<'a>(xml: &'a str, text: &str) -> &'a str {
        enclosing(xml, &["<w:tc>", "<w:tc "], text)
    }

    fn paragraph<'a>(xml: &'a str, text: &str) -> &'a str {
        enclosing(xml, &["<w:p>", "<w:p "], text)
    }

    fn is_bold(markup: &str) -> bool {
        markup.contains("<w:b ") || markup.contains("<w:b/>")
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width(100, 50, 624), (100, 50));
        assert_eq!(fit_width(1248, 400, 624), (624, 200));
        assert_eq!(fit_width(2000, 1, 624), (624, 1));
    }

    #[test]
    fn test_save_writes_zip_package() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");

        let mut doc = Document::new();
        doc.push(Element::Title {
            text: "Bao cao".into(),
        });
        doc.push(Element::Heading {
            text: "Muc 1".into(),
            level: 1,
        });
        doc.push(Element::Paragraph {
            text: "Dong 1\nDong 2".into(),
        });
        doc.push(Element::Table(TableGrid::build(vec![
            vec![SourceCell::data("Merged").colspan(2)],
            vec![SourceCell::data("a"), SourceCell::data("b")],
            vec![SourceCell::data("c")],
        ])));
        doc.push(Element::PageNumber {
            number: "12".into(),
        });

        let stats = save_docx(&doc, &RenderOptions::default(), &path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.page_number_count, 1);
    }

    #[test]
    fn test_document_xml_styles_and_merges() {
        let mut doc = Document::new();
        doc.push(Element::Title {
            text: "Bao cao".into(),
        });
        doc.push(Element::Table(TableGrid::build(vec![
            vec![SourceCell::data("Merged").colspan(2)],
            vec![SourceCell::data("Head1"), SourceCell::data("Head2")],
            vec![SourceCell::data("Body1"), SourceCell::data("Body2")],
            vec![SourceCell::header("Th3"), SourceCell::data("Body3")],
        ])));
        doc.push(Element::PageNumber {
            number: "12".into(),
        });

        let xml = package_part(to_docx(&doc, &RenderOptions::default()).unwrap(), "word/document.xml");

        let title = paragraph(&xml, "Bao cao");
        assert!(title.contains(r#"w:jc w:val="center""#));
        assert!(title.contains(r#"w:sz w:val="48""#));
        assert!(is_bold(title));

        assert!(cell(&xml, "Merged").contains(r#"w:gridSpan w:val="2""#));
        assert!(!cell(&xml, "Body1").contains("w:gridSpan"));

        assert!(is_bold(cell(&xml, "Head1")));
        assert!(is_bold(cell(&xml, "Head2")));
        assert!(is_bold(cell(&xml, "Th3")));
        assert!(!is_bold(cell(&xml, "Body1")));
        assert!(!is_bold(cell(&xml, "Body3")));

        assert!(paragraph(&xml, "12").contains(r#"w:jc w:val="center""#));
    }

    #[test]
    fn test_styles_define_normal_once() {
        let styles = package_part(to_docx(&Document::new(), &RenderOptions::default()).unwrap(), "word/styles.xml");
        assert_eq!(styles.matches(r#"w:styleId="Normal""#).count(), 1);
        assert_eq!(styles.matches(r#"w:styleId="Title""#).count(), 1);
        assert_eq!(styles.matches(r#"w:styleId="Heading1""#).count(), 1);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        fs::write(&path, "stale").unwrap();

        save_docx(&Document::new(), &RenderOptions::default(), &path).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_missing_image_fails_at_insertion() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new();
        doc.push(Element::Image {
            path: dir.path().join("imgs").join("img_in_image_box_1_2_3_4.jpg"),
        });

        let err = save_docx(&doc, &RenderOptions::default(), dir.path().join("out.docx"))
            .unwrap_err();
        assert!(matches!(err, Error::ImageNotFound(_)));
    }

    #[test]
    fn test_embeds_existing_image() {
        let dir = tempfile::tempdir().unwrap();
        let image_path: PathBuf = dir.path().join("img_in_image_box_0_0_8_4.jpg");
        image::RgbImage::from_pixel(8, 4, image::Rgb([200, 10, 10]))
            .save_with_format(&image_path, ImageFormat::Jpeg)
            .unwrap();

        let mut doc = Document::new();
        doc.push(Element::Image { path: image_path });

        let stats = save_docx(&doc, &RenderOptions::default(), dir.path().join("out.docx")).unwrap();
        assert_eq!(stats.image_count, 1);
    }

    #[test]
    fn test_empty_table_is_skipped() {
        let mut doc = Document::new();
        doc.push(Element::Table(TableGrid::default()));
        let mut renderer = DocxRenderer::new(RenderOptions::default());
        renderer.render_internal(&doc).unwrap();
        assert_eq!(renderer.stats.table_count, 0);
    }
}
