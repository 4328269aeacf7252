//! Content records and background load plumbing
//!
//! The scene never fetches content itself. It queues `ContentRequest`s for
//! the host, and the host reports completions back as `ContentEvent`s through
//! a channel that is drained at the start of a later frame.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::sim::TileId;

/// One content record supplied by the surrounding application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub cover_image_ref: Option<String>,
    #[serde(default)]
    pub thumbnail_ref: Option<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            excerpt: None,
            cover_image_ref: None,
            thumbnail_ref: None,
        }
    }

    /// Asset shown while the tile is a thumbnail (falls back to the cover)
    pub fn thumbnail_source(&self) -> Option<&str> {
        self.thumbnail_ref
            .as_deref()
            .or(self.cover_image_ref.as_deref())
    }

    /// Full-resolution cover, only when it differs from the thumbnail
    pub fn full_source(&self) -> Option<&str> {
        match (&self.cover_image_ref, &self.thumbnail_ref) {
            (Some(cover), Some(thumb)) if cover == thumb => None,
            (Some(cover), _) => Some(cover),
            (None, _) => None,
        }
    }
}

/// Parse a JSON array of content records
pub fn parse_content_list(json: &str) -> Result<Vec<ContentItem>, serde_json::Error> {
    serde_json::from_str(json)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Thumbnail,
    /// Cover image, title and excerpt for fullscreen display
    Full,
}

/// Load state of one kind of content on a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContentStatus {
    #[default]
    NotRequested,
    Pending,
    Loaded,
    /// Placeholder stays visible
    Failed,
}

/// Work the host should perform in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub tile: TileId,
    pub kind: ContentKind,
    pub asset: Option<String>,
}

/// Completion of a `ContentRequest`
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEvent {
    pub tile: TileId,
    pub kind: ContentKind,
    pub result: Result<(), ContentError>,
}

impl ContentEvent {
    pub fn loaded(request: &ContentRequest) -> Self {
        Self {
            tile: request.tile.clone(),
            kind: request.kind,
            result: Ok(()),
        }
    }

    pub fn failed(request: &ContentRequest, reason: impl Into<String>) -> Self {
        Self {
            tile: request.tile.clone(),
            kind: request.kind,
            result: Err(ContentError::LoadFailed {
                asset: request.asset.clone().unwrap_or_default(),
                reason: reason.into(),
            }),
        }
    }
}
