//! Correction stage: run a page's text through a [`TextCorrector`].

use super::TextCorrector;
use crate::error::{Error, Result};
use crate::model::{Label, PageResult};
use crate::render::escape_html;
use regex::{Captures, Regex};
use scraper::Html;
use std::collections::HashMap;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Counts from one correction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorrectionStats {
    /// Segments sent to the corrector
    pub corrected: usize,
    /// Blank segments passed through untouched
    pub skipped: usize,
}

/// Opening tag, inner markup, closing tag of a table cell.
fn cell_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(r"(?is)(<t[dh]\b[^>]*>)(.*?)(</t[dh]\s*>)").expect("valid cell pattern")
    })
}

/// Where a segment's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SegmentKey {
    block: usize,
    cell: Option<usize>,
}

/// Correct every block of a page in place.
///
/// Table blocks are corrected cell by cell: only the text inside `<td>` and
/// `<th>` elements is sent, and each cell's inner markup is replaced by the
/// corrected text. Other blocks are corrected whole. Whitespace-only
/// segments are never sent. All segments of the page go out in a single
/// batch call.
pub fn correct_page(
    page: &mut PageResult,
    corrector: &mut dyn TextCorrector,
) -> Result<CorrectionStats> {
    let mut stats = CorrectionStats::default();
    let mut keys = Vec::new();
    let mut texts = Vec::new();

    for (index, block) in page.blocks.iter().enumerate() {
        let segments: Vec<(Option<usize>, String)> = if block.label == Label::Table {
            cell_texts(&block.content)
                .into_iter()
                .enumerate()
                .map(|(cell, text)| (Some(cell), text))
                .collect()
        } else {
            vec![(None, block.content.clone())]
        };

        for (cell, text) in segments {
            if text.trim().is_empty() {
                stats.skipped += 1;
                continue;
            }
            keys.push(SegmentKey {
                block: index,
                cell,
            });
            texts.push(text);
        }
    }

    if texts.is_empty() {
        return Ok(stats);
    }

    let corrected = corrector.correct_batch(&texts)?;
    if corrected.len() != texts.len() {
        return Err(Error::BatchLength {
            expected: texts.len(),
            actual: corrected.len(),
        });
    }
    stats.corrected = corrected.len();

    let corrections: HashMap<SegmentKey, String> = keys
        .into_iter()
        .zip(corrected)
        .map(|(key, text)| (key, text.nfc().collect()))
        .collect();

    for (index, block) in page.blocks.iter_mut().enumerate() {
        if block.label == Label::Table {
            if let Some(content) = rewrite_cells(&block.content, index, &corrections) {
                block.content = content;
            }
        } else if let Some(text) = corrections.get(&SegmentKey {
            block: index,
            cell: None,
        }) {
            block.content = text.clone();
        }
    }

    Ok(stats)
}

/// Text of each table cell in the markup, in document order.
fn cell_texts(markup: &str) -> Vec<String> {
    cell_regex()
        .captures_iter(markup)
        .map(|caps| {
            let fragment = Html::parse_fragment(&caps[2]);
            fragment.root_element().text().collect::<String>()
        })
        .collect()
}

fn rewrite_cells(
    markup: &str,
    block: usize,
    corrections: &HashMap<SegmentKey, String>,
) -> Option<String> {
    let mut cell = 0;
    let mut changed = false;
    let rewritten = cell_regex().replace_all(markup, |caps: &Captures<'_>| {
        let key = SegmentKey {
            block,
            cell: Some(cell),
        };
        cell += 1;
        match corrections.get(&key) {
            Some(text) => {
                changed = true;
                format!("{}{}{}", &caps[1], escape_html(text), &caps[3])
            }
            None => caps[0].to_string(),
        }
    });
    changed.then(|| rewritten.into_owned())
}
