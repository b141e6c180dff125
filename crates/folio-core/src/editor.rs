//! Block editor operations.
//!
//! Every operation mutates a [`Document`] in place and reports whether it
//! changed anything. The invariant `content.len() >= 1` holds after each
//! call: the only removal path, [`delete`], refuses to remove the last block.
//! Gating happens one level up, in the workspace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::document::{Block, BlockKind, Document};
use crate::error::{FolioError, Result};

/// Direction for [`move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Map a `±1` offset to a direction.
    pub fn from_offset(offset: i32) -> Option<Self> {
        match offset {
            -1 => Some(Direction::Up),
            1 => Some(Direction::Down),
            _ => None,
        }
    }

    fn target(self, index: usize) -> Option<usize> {
        match self {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

impl FromStr for Direction {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "-1" => Ok(Direction::Up),
            "down" | "+1" | "1" => Ok(Direction::Down),
            other => Err(FolioError::InvalidInput(format!(
                "Unknown direction: {} (use up or down)",
                other
            ))),
        }
    }
}

/// Insert a placeholder block of `kind`.
///
/// `position` past the end (or `None`) appends. Returns the index of the
/// new block.
pub fn insert(
    doc: &mut Document,
    kind: BlockKind,
    position: Option<usize>,
    now: DateTime<Utc>,
) -> usize {
    let index = position
        .filter(|&p| p <= doc.content.len())
        .unwrap_or(doc.content.len());
    doc.content.insert(index, Block::placeholder(kind));
    doc.last_modified = now;
    index
}

/// Replace the payload of the block at `index`.
///
/// Out-of-range indexes are a silent no-op and return `false`.
pub fn update(doc: &mut Document, index: usize, payload: &str, now: DateTime<Utc>) -> bool {
    match doc.content.get_mut(index) {
        Some(block) => {
            block.set_payload(payload.to_string());
            doc.last_modified = now;
            true
        }
        None => false,
    }
}

/// Remove the block at `index`.
///
/// # Errors
///
/// Returns `FolioError::LastBlock` when the document holds a single block;
/// the document is left unchanged. An out-of-range index on a larger
/// document returns `Ok(None)`.
pub fn delete(doc: &mut Document, index: usize, now: DateTime<Utc>) -> Result<Option<Block>> {
    if doc.content.len() <= 1 {
        return Err(FolioError::LastBlock);
    }
    if index >= doc.content.len() {
        return Ok(None);
    }
    let removed = doc.content.remove(index);
    doc.last_modified = now;
    Ok(Some(removed))
}

/// Swap the block at `index` with its neighbour.
///
/// No wraparound: moving the first block up or the last block down is a
/// no-op and returns `false`.
pub fn move_block(
    doc: &mut Document,
    index: usize,
    direction: Direction,
    now: DateTime<Utc>,
) -> bool {
    let len = doc.content.len();
    if index >= len {
        return false;
    }
    match direction.target(index) {
        Some(target) if target < len => {
            doc.content.swap(index, target);
            doc.last_modified = now;
            true
        }
        _ => false,
    }
}

/// Retitle the document. An unchanged title is a no-op.
pub fn set_title(doc: &mut Document, title: &str, now: DateTime<Utc>) -> bool {
    if doc.title == title {
        return false;
    }
    doc.title = title.to_string();
    doc.last_modified = now;
    true
}
