//! Error types for backlist operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving book records or publishing them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid list document: {0}")]
    Parse(String),

    #[error("Frontmatter opened with `---` but never closed")]
    UnclosedFrontmatter,

    #[error("Book records directory not found: {0}")]
    RecordsRootNotFound(PathBuf),

    #[error("Record {path} has no `{field}` field in its frontmatter")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Identifier `{id}` matches {} record files", .paths.len())]
    AmbiguousMatch { id: String, paths: Vec<PathBuf> },

    #[error("Invalid BibTeX: {0}")]
    InvalidBibtex(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Zotero API error: {0}")]
    Api(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;
