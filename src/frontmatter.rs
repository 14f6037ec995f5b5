//! YAML frontmatter extraction.
//!
//! List documents and book record files both open with an optional
//! frontmatter block delimited by lines containing exactly `---`. The
//! extractor is deliberately dumb about content: it returns the raw text
//! between the delimiters and leaves YAML parsing to the caller.

use std::io::BufRead;

use crate::error::{Error, Result};

/// Frontmatter delimiter line (without line terminator).
pub const DELIMITER: &str = "---";

/// A document split into raw frontmatter and body.
///
/// `frontmatter` is `None` when the document does not start with a `---`
/// line; `body` is then the entire input, unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    pub frontmatter: Option<&'a str>,
    pub body: &'a str,
}

/// Split a document into frontmatter and body without copying.
///
/// A document whose first line is `---` must contain a closing `---` line;
/// otherwise this is an [`Error::UnclosedFrontmatter`]. Truncating silently
/// would hide half-written record files from the caller.
pub fn split(text: &str) -> Result<Document<'_>> {
    let mut rest = text;
    let first = take_line(&mut rest);
    if trim_line_end(first) != DELIMITER {
        return Ok(Document {
            frontmatter: None,
            body: text,
        });
    }

    let after_open = rest;
    let mut len = 0usize;
    loop {
        if rest.is_empty() {
            return Err(Error::UnclosedFrontmatter);
        }
        let line = take_line(&mut rest);
        if trim_line_end(line) == DELIMITER {
            return Ok(Document {
                frontmatter: Some(&after_open[..len]),
                body: rest,
            });
        }
        len += line.len();
    }
}

/// Read the frontmatter block from a reader, consuming it.
///
/// The reader is left positioned at the first body line so the caller can
/// continue reading the body incrementally from the same stream. When the
/// first line is not `---`, that line is consumed and the remaining stream
/// is the non-frontmatter body.
pub fn read_frontmatter<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(String::new());
    }
    if trim_line_end(&line) != DELIMITER {
        return Ok(String::new());
    }

    let mut yaml = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(Error::UnclosedFrontmatter);
        }
        if trim_line_end(&line) == DELIMITER {
            return Ok(yaml);
        }
        yaml.push_str(&line);
    }
}

/// Read the remainder of a stream after [`read_frontmatter`].
pub fn read_body<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut body = String::new();
    reader.read_to_string(&mut body)?;
    Ok(body)
}

fn take_line<'a>(text: &mut &'a str) -> &'a str {
    match text.find('\n') {
        Some(i) => {
            let (line, rest) = text.split_at(i + 1);
            *text = rest;
            line
        }
        None => {
            let line = *text;
            *text = "";
            line
        }
    }
}

fn trim_line_end(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn basic_frontmatter() {
        let doc = split("---\namzn: B000ABCDEF\n---\n@book{x,\n}\n").unwrap();
        assert_eq!(doc.frontmatter, Some("amzn: B000ABCDEF\n"));
        assert_eq!(doc.body, "@book{x,\n}\n");
    }

    #[test]
    fn empty_frontmatter_block() {
        let doc = split("---\n---\nbody\n").unwrap();
        assert_eq!(doc.frontmatter, Some(""));
        assert_eq!(doc.body, "body\n");
    }

    #[test]
    fn no_frontmatter_returns_body_unchanged() {
        let text = "just text\nwith --- inline\nand more\n";
        let doc = split(text).unwrap();
        assert_eq!(doc.frontmatter, None);
        assert_eq!(doc.body, text);
    }

    #[test]
    fn delimiter_free_text_is_idempotent_as_body() {
        let text = "sections: none here\n";
        let once = split(text).unwrap().body;
        let twice = split(once).unwrap().body;
        assert_eq!(twice, text);
    }

    #[test]
    fn unclosed_frontmatter_is_an_error() {
        let err = split("---\namzn: 123\n").unwrap_err();
        assert!(matches!(err, Error::UnclosedFrontmatter));
    }

    #[test]
    fn crlf_delimiters() {
        let doc = split("---\r\namzn: 123\r\n---\r\nbody\r\n").unwrap();
        assert_eq!(doc.frontmatter, Some("amzn: 123\r\n"));
        assert_eq!(doc.body, "body\r\n");
    }

    #[test]
    fn missing_trailing_newline_on_closing_delimiter() {
        let doc = split("---\namzn: 123\n---").unwrap();
        assert_eq!(doc.frontmatter, Some("amzn: 123\n"));
        assert_eq!(doc.body, "");
    }

    #[test]
    fn streaming_read_leaves_reader_at_body() {
        let mut reader = Cursor::new("---\namzn: 123\n---\n@book{x,\n}\n");
        let yaml = read_frontmatter(&mut reader).unwrap();
        assert_eq!(yaml, "amzn: 123\n");
        let body = read_body(&mut reader).unwrap();
        assert_eq!(body, "@book{x,\n}\n");
    }

    #[test]
    fn streaming_read_without_frontmatter() {
        let mut reader = Cursor::new("first line\nsecond line\n");
        let yaml = read_frontmatter(&mut reader).unwrap();
        assert_eq!(yaml, "");
        // The probed first line is consumed; the rest of the stream is body.
        let body = read_body(&mut reader).unwrap();
        assert_eq!(body, "second line\n");
    }

    #[test]
    fn streaming_unclosed_is_an_error() {
        let mut reader = Cursor::new("---\namzn: 123\n");
        let err = read_frontmatter(&mut reader).unwrap_err();
        assert!(matches!(err, Error::UnclosedFrontmatter));
    }

    #[test]
    fn empty_input() {
        let doc = split("").unwrap();
        assert_eq!(doc.frontmatter, None);
        assert_eq!(doc.body, "");
    }
}
