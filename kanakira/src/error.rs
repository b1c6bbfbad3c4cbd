//! Errors raised while building a font

use std::path::PathBuf;

use thiserror::Error;
use write_fonts::types::Tag;

/// Which of the two input fonts a glyph was requested from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceRole {
    /// The font providing the Katakana outlines
    Japanese,
    /// The monospace font providing the Latin outlines
    Romaji,
}

impl std::fmt::Display for SourceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceRole::Japanese => f.write_str("Japanese"),
            SourceRole::Romaji => f.write_str("Romaji"),
        }
    }
}

/// A problem with the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config field '{field}': {reason}")]
    Field { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn field(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Field {
            field,
            reason: reason.into(),
        }
    }
}

/// An error that aborts the build.
///
/// Every failure is fatal: a font is only written once every grapheme has
/// been composited and every table compiled.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unable to open {role} source font '{}': {reason}", .path.display())]
    SourceFont {
        role: SourceRole,
        path: PathBuf,
        reason: String,
    },

    #[error(
        "Missing glyph for '{grapheme}': {ch:?} ({}) has no outline in the {role} source font",
        unicode(.ch)
    )]
    MissingGlyph {
        grapheme: String,
        ch: char,
        role: SourceRole,
    },

    #[error(
        "Duplicate grapheme: '{second}' maps to {}, already taken by '{first}'",
        unicode(.key)
    )]
    DuplicateGrapheme {
        key: char,
        first: String,
        second: String,
    },

    #[error("No Romaji given for '{grapheme}'")]
    EmptyRomaji { grapheme: String },

    #[error("Outline for '{grapheme}' cannot be encoded: {reason}")]
    MalformedOutline { grapheme: String, reason: String },

    #[error("Compiling table '{tag}' failed: {reason}")]
    Table { tag: Tag, reason: String },

    #[error("Unable to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn unicode(ch: &char) -> String {
    format!("U+{:04X}", *ch as u32)
}
