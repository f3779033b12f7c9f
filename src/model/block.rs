//! OCR layout blocks and per-page results.
//!
//! The JSON shape is the one layout-analysis pipelines write next to each
//! page: `{"parsing_res_list": [{"block_label", "block_content",
//! "block_bbox"}, ...]}`. Decoding is deliberately forgiving; a block never
//! fails to load because a field is missing or has an odd type.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Semantic role of a block on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Label {
    /// Document title (`doc_title`)
    DocTitle,
    /// Section heading (`paragraph_title`)
    ParagraphTitle,
    /// Body text (`text`)
    #[default]
    Text,
    /// Table markup (`table`)
    Table,
    /// Picture region (`image`)
    Image,
    /// Numeric region, usually a page number (`number`)
    Number,
    /// Any label outside the known set, kept verbatim
    Other(String),
}

impl Label {
    /// The label as it appears in results JSON.
    pub fn as_str(&self) -> &str {
        match self {
            Label::DocTitle => "doc_title",
            Label::ParagraphTitle => "paragraph_title",
            Label::Text => "text",
            Label::Table => "table",
            Label::Image => "image",
            Label::Number => "number",
            Label::Other(raw) => raw,
        }
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        match raw {
            "doc_title" => Label::DocTitle,
            "paragraph_title" => Label::ParagraphTitle,
            "text" => Label::Text,
            "table" => Label::Table,
            "image" => Label::Image,
            "number" => Label::Number,
            other => Label::Other(other.to_string()),
        }
    }
}

impl From<String> for Label {
    fn from(raw: String) -> Self {
        match Label::from(raw.as_str()) {
            Label::Other(_) => Label::Other(raw),
            known => known,
        }
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region of a block in page pixel space: left, top, right, bottom.
///
/// Coordinates keep their JSON spelling, because extracted region images are
/// named after them and `34` and `34.0` name different files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundingBox {
    coords: [Number; 4],
}

impl BoundingBox {
    /// Create a bounding box from four coordinates.
    pub fn new(
        left: impl Into<Number>,
        top: impl Into<Number>,
        right: impl Into<Number>,
        bottom: impl Into<Number>,
    ) -> Self {
        Self {
            coords: [left.into(), top.into(), right.into(), bottom.into()],
        }
    }

    /// Build a bounding box from raw JSON values.
    ///
    /// Returns `None` unless there are exactly four numbers.
    pub fn from_values(values: &[Value]) -> Option<Self> {
        match values {
            [Value::Number(l), Value::Number(t), Value::Number(r), Value::Number(b)] => {
                Some(Self {
                    coords: [l.clone(), t.clone(), r.clone(), b.clone()],
                })
            }
            _ => None,
        }
    }

    /// File name of the region image the OCR provider extracts for this box.
    pub fn image_file_name(&self) -> String {
        let [l, t, r, b] = &self.coords;
        format!("img_in_image_box_{}_{}_{}_{}.jpg", l, t, r, b)
    }
}

/// One recognized region on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Semantic role
    #[serde(
        rename = "block_label",
        default,
        deserialize_with = "lenient_label"
    )]
    pub label: Label,

    /// Text, or table markup for table blocks
    #[serde(
        rename = "block_content",
        default,
        deserialize_with = "lenient_content"
    )]
    pub content: String,

    /// Region on the page, if the provider reported a usable one
    #[serde(
        rename = "block_bbox",
        default,
        deserialize_with = "lenient_bbox",
        skip_serializing_if = "Option::is_none"
    )]
    pub bbox: Option<BoundingBox>,

    /// Provider fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Block {
    /// Create a block without a bounding box.
    pub fn new(label: impl Into<Label>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
            bbox: None,
            extra: Map::new(),
        }
    }

    /// Set the bounding box and return self.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Label, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => Label::from(raw),
        _ => Label::default(),
    })
}

fn lenient_content<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_bbox<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<BoundingBox>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => BoundingBox::from_values(&values),
        _ => None,
    })
}

fn lenient_blocks<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<Block>, D::Error> {
    let values = match Value::deserialize(deserializer)? {
        Value::Array(values) => values,
        _ => return Ok(Vec::new()),
    };

    let mut blocks = Vec::with_capacity(values.len());
    for value in values {
        if !value.is_object() {
            log::warn!("Ignoring non-object entry in parsing_res_list: {}", value);
            continue;
        }
        blocks.push(serde_json::from_value(value).map_err(serde::de::Error::custom)?);
    }
    Ok(blocks)
}

/// Layout result for one page, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Blocks in render order
    #[serde(
        rename = "parsing_res_list",
        default,
        deserialize_with = "lenient_blocks"
    )]
    pub blocks: Vec<Block>,

    /// Other top-level fields written by the provider
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageResult {
    /// Create a result from blocks.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            extra: Map::new(),
        }
    }

    /// Decode a result from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a result from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::MissingArtifact(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Self::from_json(&json)
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the result as pretty-printed JSON, replacing any existing file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Concatenate several results into one, keeping block order.
    ///
    /// Top-level fields come from the first result.
    pub fn merge(results: Vec<PageResult>) -> PageResult {
        let mut results = results.into_iter();
        let mut merged = results.next().unwrap_or_default();
        for result in results {
            merged.blocks.extend(result.blocks);
        }
        merged
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the page has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip_names() {
        for raw in ["doc_title", "paragraph_title", "text", "table", "image", "number"] {
            assert_eq!(Label::from(raw).as_str(), raw);
        }
        assert_eq!(Label::from("formula"), Label::Other("formula".into()));
        assert_eq!(String::from(Label::Other("seal".into())), "seal");
    }

    #[test]
    fn test_block_defaults() {
        let block: Block = serde_json::from_str("{}").unwrap();
        assert_eq!(block.label, Label::Text);
        assert_eq!(block.content, "");
        assert!(block.bbox.is_none());
    }

    #[test]
    fn test_block_coerces_odd_fields() {
        let block: Block = serde_json::from_str(
            r#"{"block_label": 7, "block_content": 42, "block_bbox": [1, 2, 3]}"#,
        )
        .unwrap();
        assert_eq!(block.label, Label::Text);
        assert_eq!(block.content, "42");
        assert!(block.bbox.is_none());

        let block: Block =
            serde_json::from_str(r#"{"block_bbox": [1, "2", 3, 4], "block_content": null}"#)
                .unwrap();
        assert!(block.bbox.is_none());
        assert_eq!(block.content, "");
    }

    #[test]
    fn test_image_file_name_keeps_number_spelling() {
        let block: Block = serde_json::from_str(
            r#"{"block_label": "image", "block_bbox": [34, 45, 200, 300]}"#,
        )
        .unwrap();
        assert_eq!(
            block.bbox.unwrap().image_file_name(),
            "img_in_image_box_34_45_200_300.jpg"
        );

        let bbox = BoundingBox::from_values(&serde_json::from_str::<Vec<Value>>("[1.5, 2, 3, 4]").unwrap())
            .unwrap();
        assert_eq!(bbox.image_file_name(), "img_in_image_box_1.5_2_3_4.jpg");
    }

    #[test]
    fn test_page_result_keeps_unknown_fields() {
        let json = r#"{
            "input_path": "620.jpg",
            "parsing_res_list": [
                {"block_label": "text", "block_content": "Xin chao", "block_id": 3}
            ]
        }"#;
        let page = PageResult::from_json(json).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.extra["input_path"], "620.jpg");
        assert_eq!(page.blocks[0].extra["block_id"], 3);

        let again = PageResult::from_json(&page.to_json().unwrap()).unwrap();
        assert_eq!(again, page);
    }

    #[test]
    fn test_page_result_missing_list_and_bad_entries() {
        let page = PageResult::from_json(r#"{"width": 1000}"#).unwrap();
        assert!(page.is_empty());

        let page = PageResult::from_json(r#"{"parsing_res_list": [null, {"block_label": "text"}]}"#)
            .unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_missing_file_is_missing_artifact() {
        let err = PageResult::from_path("/nonexistent/redocx/1_res.json").unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(_)));
    }

    #[test]
    fn test_merge_keeps_order() {
        let first = PageResult::new(vec![Block::new("text", "a")]);
        let second = PageResult::new(vec![Block::new("text", "b"), Block::new("number", "2")]);
        let merged = PageResult::merge(vec![first, second]);
        let contents: Vec<_> = merged.blocks.iter().map(|b| b.content.as_str()).collect();
        assert_eq!(contents, ["a", "b", "2"]);
        assert!(PageResult::merge(Vec::new()).is_empty());
    }
}
