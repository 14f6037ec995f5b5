//! Identifier listing from list-document frontmatter.
//!
//! A list document's frontmatter maps `sections` to an ordered sequence.
//! Two section shapes appear in practice and are auto-detected per section:
//!
//! - `listings`: objects with a `type` discriminator; the `id` field is
//!   collected when `type` is `"book"` (other types are interleaved links
//!   and get skipped);
//! - `books`: a flat list of bare identifier strings.
//!
//! The default policy is lenient: entries matching neither shape are
//! skipped. Strict mode turns them into parse errors instead.

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct ListFrontmatter {
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    listings: Option<Vec<Entry>>,
    #[serde(default)]
    books: Option<Vec<serde_yaml::Value>>,
}

/// One entry under a section's `listings` key.
///
/// Untagged: a mapping with a `type` field is a listing object, a plain
/// string is treated as a bare identifier, and anything else falls through
/// to `Other` for the shape policy to deal with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Listing {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        id: Option<String>,
    },
    Id(String),
    Other(serde_yaml::Value),
}

/// Collect book identifiers from frontmatter text, in document order.
///
/// Duplicates are preserved; order is sections first, then entries within
/// each section. Unrecognized entry shapes are skipped silently.
pub fn book_ids(frontmatter: &str) -> Result<Vec<String>> {
    collect(frontmatter, false)
}

/// Like [`book_ids`], but unrecognized entry shapes are parse errors.
pub fn book_ids_strict(frontmatter: &str) -> Result<Vec<String>> {
    collect(frontmatter, true)
}

fn collect(frontmatter: &str, strict: bool) -> Result<Vec<String>> {
    let parsed: ListFrontmatter = serde_yaml::from_str(frontmatter)?;

    let mut ids = Vec::new();
    for (index, section) in parsed.sections.iter().enumerate() {
        let known_shape = section.listings.is_some() || section.books.is_some();
        if !known_shape && strict {
            return Err(Error::Parse(format!(
                "section {index} has neither `listings` nor `books`"
            )));
        }

        if let Some(listings) = &section.listings {
            for entry in listings {
                match entry {
                    Entry::Listing { kind, id } => {
                        if kind != "book" {
                            continue;
                        }
                        match id {
                            Some(id) => ids.push(id.clone()),
                            None if strict => {
                                return Err(Error::Parse(format!(
                                    "book listing without `id` in section {index}"
                                )));
                            }
                            None => {}
                        }
                    }
                    Entry::Id(id) => ids.push(id.clone()),
                    Entry::Other(value) if strict => {
                        return Err(Error::Parse(format!(
                            "unrecognized listing shape in section {index}: {value:?}"
                        )));
                    }
                    Entry::Other(_) => {}
                }
            }
        }

        if let Some(books) = &section.books {
            for value in books {
                match value {
                    serde_yaml::Value::String(id) => ids.push(id.clone()),
                    _ if strict => {
                        return Err(Error::Parse(format!(
                            "non-string book id in section {index}"
                        )));
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(ids)
}
