//! Minimal BibTeX entry parser.
//!
//! Parses only what the Zotero submission needs: entry type, citation key,
//! and a flat map of field values with one level of brace or quote
//! delimiters stripped. String macros, concatenation with `#`, and
//! cross-references are not supported; record files in this workflow do not
//! use them.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// One `@type{key, ...}` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry type, lower-cased (`book`, `article`, ...).
    pub kind: String,
    /// Citation key.
    pub key: String,
    fields: HashMap<String, String>,
}

impl Entry {
    /// Look up a field by its lower-cased name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Parse every entry in a BibTeX document, in document order.
///
/// Text between entries is ignored, as are `@comment` and `@preamble`
/// blocks.
pub fn parse(input: &str) -> Result<Vec<Entry>> {
    let mut parser = Parser {
        rest: input.as_bytes(),
    };
    let mut entries = Vec::new();

    while parser.seek(b'@') {
        parser.bump(); // '@'
        let kind = parser.take_identifier().to_ascii_lowercase();
        parser.skip_whitespace();
        if !parser.eat(b'{') {
            return Err(Error::InvalidBibtex(format!(
                "expected `{{` after `@{kind}`"
            )));
        }
        if kind == "comment" || kind == "preamble" || kind == "string" {
            parser.skip_balanced()?;
            continue;
        }

        let key = parser.take_until(&[b',', b'}'])?.trim().to_string();
        if key.is_empty() {
            return Err(Error::InvalidBibtex(format!(
                "entry `@{kind}` has no citation key"
            )));
        }

        let mut fields = HashMap::new();
        loop {
            parser.skip_whitespace();
            if parser.eat(b'}') {
                break;
            }
            if !parser.eat(b',') {
                return Err(Error::InvalidBibtex(format!(
                    "malformed entry `{key}`: expected `,` or `}}`"
                )));
            }
            parser.skip_whitespace();
            if parser.eat(b'}') {
                // Trailing comma before the closing brace.
                break;
            }

            let name = parser.take_identifier().to_ascii_lowercase();
            if name.is_empty() {
                return Err(Error::InvalidBibtex(format!(
                    "malformed field name in entry `{key}`"
                )));
            }
            parser.skip_whitespace();
            if !parser.eat(b'=') {
                return Err(Error::InvalidBibtex(format!(
                    "field `{name}` in entry `{key}` has no value"
                )));
            }
            parser.skip_whitespace();
            let value = parser.take_value(&key, &name)?;
            fields.insert(name, value);
        }

        entries.push(Entry { kind, key, fields });
    }

    Ok(entries)
}

struct Parser<'a> {
    rest: &'a [u8],
}

impl<'a> Parser<'a> {
    /// Advance to the next occurrence of `byte`; false when exhausted.
    fn seek(&mut self, byte: u8) -> bool {
        match self.rest.iter().position(|&b| b == byte) {
            Some(i) => {
                self.rest = &self.rest[i..];
                true
            }
            None => {
                self.rest = &[];
                false
            }
        }
    }

    fn bump(&mut self) {
        self.rest = &self.rest[1..];
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.rest.first() == Some(&byte) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.rest.first() {
            if b.is_ascii_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn take_identifier(&mut self) -> String {
        let end = self
            .rest
            .iter()
            .position(|&b| !(b.is_ascii_alphanumeric() || b == b'_' || b == b'-'))
            .unwrap_or(self.rest.len());
        let (ident, rest) = self.rest.split_at(end);
        self.rest = rest;
        String::from_utf8_lossy(ident).into_owned()
    }

    fn take_until(&mut self, stops: &[u8]) -> Result<String> {
        let end = self
            .rest
            .iter()
            .position(|b| stops.contains(b))
            .ok_or_else(|| Error::InvalidBibtex("unterminated entry".to_string()))?;
        let (taken, rest) = self.rest.split_at(end);
        self.rest = rest;
        Ok(String::from_utf8_lossy(taken).into_owned())
    }

    /// Consume a field value: `{balanced}`, `"quoted"`, or a bare token.
    fn take_value(&mut self, key: &str, name: &str) -> Result<String> {
        match self.rest.first() {
            Some(b'{') => {
                self.bump();
                let mut depth = 1usize;
                let mut value = Vec::new();
                for (i, &b) in self.rest.iter().enumerate() {
                    match b {
                        b'{' => depth += 1,
                        b'}' => {
                            depth -= 1;
                            if depth == 0 {
                                self.rest = &self.rest[i + 1..];
                                return Ok(String::from_utf8_lossy(&value).into_owned());
                            }
                        }
                        _ => {}
                    }
                    value.push(b);
                }
                Err(Error::InvalidBibtex(format!(
                    "unbalanced braces in field `{name}` of entry `{key}`"
                )))
            }
            Some(b'"') => {
                self.bump();
                let value = self.take_until(&[b'"'])?;
                self.bump(); // closing quote
                Ok(value)
            }
            Some(_) => {
                let value = self.take_until(&[b',', b'}', b'\n'])?;
                Ok(value.trim().to_string())
            }
            None => Err(Error::InvalidBibtex(format!(
                "missing value for field `{name}` in entry `{key}`"
            ))),
        }
    }

    /// Skip a `{...}` group whose opening brace was already consumed.
    fn skip_balanced(&mut self) -> Result<()> {
        let mut depth = 1usize;
        for (i, &b) in self.rest.iter().enumerate() {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.rest = &self.rest[i + 1..];
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(Error::InvalidBibtex("unbalanced braces".to_string()))
    }
}
