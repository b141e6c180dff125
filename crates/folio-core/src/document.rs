//! Project document model.
//!
//! A [`Document`] is the persisted content of one project: a title, an
//! ordered list of typed [`Block`]s and two timestamps. The JSON shape
//! (`title`, `content`, `created`, `lastModified`, blocks as
//! `{"type": ..., "content": ...}`) is the portable format shared by the
//! store and the export envelope.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FolioError;

/// Body of the single block a new project starts with.
pub const INITIAL_TEXT: &str = "Start writing your project description here...";

/// Preview text for projects without any text block.
pub const EMPTY_PREVIEW: &str = "No content yet";

/// Block kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    Title,
    Image,
}

impl BlockKind {
    pub const ALL: [BlockKind; 3] = [BlockKind::Text, BlockKind::Title, BlockKind::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Title => "title",
            BlockKind::Image => "image",
        }
    }

    /// Placeholder payload for a freshly inserted block.
    pub fn placeholder(&self) -> &'static str {
        match self {
            BlockKind::Text => "New text content...",
            BlockKind::Title => "New Section Title",
            BlockKind::Image => "https://placehold.co/600x400",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(BlockKind::Text),
            "title" => Ok(BlockKind::Title),
            "image" => Ok(BlockKind::Image),
            other => Err(FolioError::InvalidInput(format!(
                "Unknown block type: {} (use text, title or image)",
                other
            ))),
        }
    }
}

/// One typed unit of project content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Block {
    /// Free text
    Text(String),
    /// Section heading
    Title(String),
    /// Image URL
    Image(String),
}

impl Block {
    pub fn new(kind: BlockKind, payload: impl Into<String>) -> Self {
        let payload = payload.into();
        match kind {
            BlockKind::Text => Block::Text(payload),
            BlockKind::Title => Block::Title(payload),
            BlockKind::Image => Block::Image(payload),
        }
    }

    /// A block of `kind` carrying its placeholder payload.
    pub fn placeholder(kind: BlockKind) -> Self {
        Block::new(kind, kind.placeholder())
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Text(_) => BlockKind::Text,
            Block::Title(_) => BlockKind::Title,
            Block::Image(_) => BlockKind::Image,
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Block::Text(p) | Block::Title(p) | Block::Image(p) => p,
        }
    }

    pub(crate) fn set_payload(&mut self, payload: String) {
        match self {
            Block::Text(p) | Block::Title(p) | Block::Image(p) => *p = payload,
        }
    }
}

/// Persisted content of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,

    pub content: Vec<Block>,

    /// Absent in first-generation documents; filled with the load time.
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl Document {
    /// A new project document: the name as title plus one starter text block.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            content: vec![Block::Text(INITIAL_TEXT.to_string())],
            created: now,
            last_modified: now,
        }
    }

    /// Parse a stored document and restore the non-empty invariant.
    ///
    /// Documents written by other tools may carry an empty block list; they
    /// get the starter block back instead of being rejected.
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        let mut doc: Document = serde_json::from_str(raw)?;
        doc.ensure_content();
        Ok(doc)
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// First text block truncated to 80 characters, for listings.
    pub fn preview(&self) -> String {
        self.content
            .iter()
            .find_map(|block| match block {
                Block::Text(text) => Some(truncate(text, 80)),
                _ => None,
            })
            .unwrap_or_else(|| EMPTY_PREVIEW.to_string())
    }

    pub(crate) fn ensure_content(&mut self) {
        if self.content.is_empty() {
            self.content.push(Block::Text(INITIAL_TEXT.to_string()));
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_json_shape() {
        let block = Block::Title("Overview".to_string());
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "type": "title", "content": "Overview" })
        );
    }

    #[test]
    fn test_document_json_field_names() {
        let doc = Document::new("Voyage", Utc::now());
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("lastModified").is_some());
        assert!(value.get("created").is_some());
        assert_eq!(value["content"][0]["type"], "text");
    }

    #[test]
    fn test_legacy_document_without_created() {
        let raw = r#"{
            "title": "Props",
            "content": [{"type": "text", "content": "hello"}],
            "lastModified": "2025-01-02T03:04:05Z"
        }"#;
        let doc = Document::from_json(raw).unwrap();
        assert_eq!(doc.title, "Props");
        assert_eq!(doc.content, vec![Block::Text("hello".into())]);
    }

    #[test]
    fn test_empty_content_gets_starter_block() {
        let raw = r#"{"title": "Empty", "content": []}"#;
        let doc = Document::from_json(raw).unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_unknown_block_type_is_rejected() {
        let raw = r#"{"title": "x", "content": [{"type": "video", "content": "y"}]}"#;
        assert!(Document::from_json(raw).is_err());
    }

    #[test]
    fn test_preview() {
        let mut doc = Document::new("x", Utc::now());
        doc.content = vec![Block::Image("u".into()), Block::Text("a".repeat(100))];
        let preview = doc.preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 83);

        doc.content = vec![Block::Title("only".into())];
        assert_eq!(doc.preview(), EMPTY_PREVIEW);
    }

    #[test]
    fn test_block_kind_from_str() {
        assert_eq!("Image".parse::<BlockKind>().unwrap(), BlockKind::Image);
        assert!("video".parse::<BlockKind>().is_err());
    }
}
