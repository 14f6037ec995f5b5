//! # backlist
//!
//! Library behind the Backlist publishing tools: book lists are text
//! documents with YAML frontmatter naming book identifiers; each identifier
//! resolves to a `.bib` record file under a shared `_books` directory, and
//! each record carries a purchase-link code plus a BibTeX body.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use backlist::record;
//!
//! let located = record::resolve_list(Path::new("lists/2024/05/reading/index.md")).unwrap();
//! let report = record::collect_asins(&located.paths).unwrap();
//! println!("{}", report.asins.join(", "));
//! ```
//!
//! The resolution pipeline is four small steps, each usable on its own:
//! [`frontmatter::split`] to peel the YAML block off a document,
//! [`list::book_ids`] to walk its sections, [`record::locate`] to find the
//! matching `.bib` files, and [`record::collect_asins`] /
//! [`record::collect_bibtex`] to pull fields or BibTeX bodies out of them.

pub mod bibtex;
pub mod compose;
pub mod error;
pub mod frontmatter;
pub mod list;
pub mod record;
pub mod zotero;

pub use error::{Error, Result};
pub use record::{AsinReport, BookRecord, Located, resolve_list};
