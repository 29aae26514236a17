use indexmap::IndexMap;
use rusqlite::Row;
use serde::Serialize;

/// Identifier supplied by the chat transport. Never generated here.
pub type OwnerId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEntry {
    pub tag: String,
    pub content: String,
}

impl NoteEntry {
    pub fn new(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            content: content.into(),
        }
    }
}

impl<'a> TryFrom<&Row<'a>> for NoteEntry {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'a>) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            tag: row.get(0)?,
            content: row.get(1)?,
        })
    }
}

/// Notes grouped by tag, tags in the order they were first seen.
pub type ExportGroups = IndexMap<String, Vec<String>>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a tag is required")]
    MissingTag,
    #[error("note text must not be empty")]
    EmptyContent,
    #[error("a search keyword is required")]
    EmptyKeyword,
}
