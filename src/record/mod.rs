//! Book record lookup and field extraction.
//!
//! Book records are `.bib` files living under a `_books` directory a fixed
//! number of levels above each list document. A record file's name contains
//! the book identifier as a substring, which means an identifier that is a
//! prefix of another can match more than one file; matches are still all
//! returned, but every such ambiguity is reported alongside the paths so
//! callers can warn or fail.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::frontmatter;
use crate::list;

/// Directory name holding book record files, relative to the records root.
pub const RECORDS_DIR: &str = "_books";

/// How many path components to ascend from a list document to reach the
/// directory containing [`RECORDS_DIR`].
const ROOT_ASCENT: usize = 5;

/// Record file paths resolved for a set of identifiers.
///
/// `paths` is in directory-walk order, not identifier order. An identifier
/// with zero matches contributes nothing; an identifier with more than one
/// match contributes all of them plus an entry in `ambiguities`.
#[derive(Debug, Default)]
pub struct Located {
    pub paths: Vec<PathBuf>,
    pub ambiguities: Vec<Ambiguity>,
}

/// An identifier whose substring match hit more than one record file.
#[derive(Debug)]
pub struct Ambiguity {
    pub id: String,
    pub paths: Vec<PathBuf>,
}

impl Located {
    /// Return the resolved paths, failing if any identifier was ambiguous.
    pub fn strict(mut self) -> Result<Vec<PathBuf>> {
        if let Some(ambiguity) = self.ambiguities.drain(..).next() {
            return Err(Error::AmbiguousMatch {
                id: ambiguity.id,
                paths: ambiguity.paths,
            });
        }
        Ok(self.paths)
    }
}

/// Compute the records root for a list document: five components up from
/// the document's absolute path, then down into [`RECORDS_DIR`].
pub fn records_root(list_path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(list_path)?;
    let base = absolute
        .ancestors()
        .nth(ROOT_ASCENT)
        .ok_or_else(|| Error::RecordsRootNotFound(absolute.clone()))?;
    let root = base.join(RECORDS_DIR);
    if !root.is_dir() {
        return Err(Error::RecordsRootNotFound(root));
    }
    Ok(root)
}

/// Walk `root` and associate every `.bib` file with the identifiers whose
/// text appears in its filename.
///
/// The walk visits each directory's files (in name order) before descending
/// into its subdirectories, so results are stable across platforms and keep
/// the historical top-down order. A file matching several identifiers
/// appears once per matching identifier, preserving the historical output
/// shape.
pub fn locate(root: &Path, ids: &[String]) -> Result<Located> {
    if !root.is_dir() {
        return Err(Error::RecordsRootNotFound(root.to_path_buf()));
    }

    let mut located = Located::default();
    let mut per_id: HashMap<&str, Vec<PathBuf>> = HashMap::new();

    // Files sort before directories, names break ties: pre-order traversal
    // then yields a directory's files before any subdirectory's contents.
    let walker = WalkDir::new(root).sort_by(|a, b| {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    });

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("bib") {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        for id in ids {
            if name.contains(id.as_str()) {
                located.paths.push(path.to_path_buf());
                // Track distinct files per identifier value, so an id listed
                // twice does not read as an ambiguous match.
                let bucket = per_id.entry(id.as_str()).or_default();
                if !bucket.iter().any(|p| p == path) {
                    bucket.push(path.to_path_buf());
                }
            }
        }
    }

    // Report ambiguities in original identifier order.
    for id in ids {
        if let Some(paths) = per_id.remove(id.as_str()) {
            if paths.len() > 1 {
                located.ambiguities.push(Ambiguity {
                    id: id.clone(),
                    paths,
                });
            }
        }
    }

    Ok(located)
}

/// Resolve a list document end to end: extract frontmatter, list its book
/// identifiers, and locate the matching record files on disk.
pub fn resolve_list(list_path: &Path) -> Result<Located> {
    let text = fs::read_to_string(list_path)?;
    let doc = frontmatter::split(&text)?;
    let ids = list::book_ids(doc.frontmatter.unwrap_or(""))?;
    let root = records_root(list_path)?;
    locate(&root, &ids)
}

/// One parsed book record file.
#[derive(Debug)]
pub struct BookRecord {
    path: PathBuf,
    fields: serde_yaml::Mapping,
    body: String,
}

impl BookRecord {
    /// Read and split a record file into frontmatter fields and BibTeX body.
    pub fn open(path: &Path) -> Result<BookRecord> {
        let text = fs::read_to_string(path)?;
        let doc = frontmatter::split(&text)?;
        let fields = match doc.frontmatter {
            Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
            _ => serde_yaml::Mapping::new(),
        };
        Ok(BookRecord {
            path: path.to_path_buf(),
            fields,
            body: doc.body.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The record's purchase-link code.
    ///
    /// ASIN-like codes may be written unquoted in YAML and parse as numbers;
    /// they are coerced to their string spelling here.
    pub fn asin(&self) -> Result<String> {
        self.fields
            .get("amzn")
            .and_then(scalar_to_string)
            .ok_or_else(|| Error::MissingField {
                path: self.path.clone(),
                field: "amzn",
            })
    }

    /// The raw BibTeX body following the frontmatter.
    pub fn bibtex(&self) -> &str {
        &self.body
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Purchase-link codes extracted from a batch of record files.
///
/// Records without an `amzn` field are collected in `missing` instead of
/// failing the whole batch; partial results stay useful for reporting.
#[derive(Debug, Default)]
pub struct AsinReport {
    pub asins: Vec<String>,
    pub missing: Vec<PathBuf>,
}

/// Extract the `amzn` field from each record file, in input order.
pub fn collect_asins(paths: &[PathBuf]) -> Result<AsinReport> {
    let mut report = AsinReport::default();
    for path in paths {
        let record = BookRecord::open(path)?;
        match record.asin() {
            Ok(asin) => report.asins.push(asin),
            Err(Error::MissingField { path, .. }) => report.missing.push(path),
            Err(other) => return Err(other),
        }
    }
    Ok(report)
}

/// Concatenate the BibTeX bodies of each record file, in input order.
pub fn collect_bibtex(paths: &[PathBuf]) -> Result<String> {
    let mut bibtex = String::new();
    for path in paths {
        let record = BookRecord::open(path)?;
        bibtex.push_str(record.bibtex());
    }
    Ok(bibtex)
}
