//! Error types for layouts, settings and content loading

use thiserror::Error;

/// Errors raised while resolving a layout
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout calculator not found: {0}")]
    UnknownMode(String),

    #[error("layout parameter `{key}` has the wrong type (expected {expected})")]
    InvalidParam { key: String, expected: &'static str },

    #[error("tile `{id}` is {width} cells wide but the grid only has {columns} columns")]
    TileTooWide { id: String, width: u32, columns: u32 },
}

/// Errors raised while loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A failed background content load for one tile
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    #[error("no asset reference for {0}")]
    MissingAsset(String),

    #[error("failed to load {asset}: {reason}")]
    LoadFailed { asset: String, reason: String },
}
