//! Line-preserving model of `alire.toml`
//!
//! Only the array-of-tables sections the driver edits are modelled. A
//! section starts at a `[[name]]` header immediately followed by a
//! `key = value` line and extends over the consecutive entry lines below
//! it. Everything else is kept as verbatim text, so rendering an untouched
//! document reproduces its source byte for byte.
//!
//! A section owns at most one blank line above its header. Appended
//! sections bring their own separator, which lets a later removal restore
//! the manifest exactly.

use std::fmt;

use toml_edit::{DocumentMut, Value};

use crate::error::{Error, Result};
use crate::source::PinTarget;

/// Array holding the crate's dependencies
pub const DEPENDS_ON: &str = "depends-on";
/// Array holding the crate's pins
pub const PINS: &str = "pins";

/// A parsed manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Text(String),
    Section(ArraySection),
}

/// One `[[array]]` header and its entry lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySection {
    leading: String,
    header: String,
    array: String,
    entries: Vec<Entry>,
}

impl ArraySection {
    pub fn array(&self) -> &str {
        &self.array
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.leading);
        out.push_str(&self.header);
        for entry in &self.entries {
            out.push_str(&entry.line);
        }
    }
}

/// A single `key = value` line of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    key: String,
    line: String,
}

/// Typed value of an [`Entry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    /// A version constraint, as in `libfoo = "^1.0"`
    Constraint(String),
    /// An inline table, as in `libfoo = { path = '../libfoo' }`
    Source(PinTarget),
}

impl Entry {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The line as written, including its line terminator.
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn value(&self) -> Result<EntryValue> {
        let doc: DocumentMut = self.line.parse().map_err(|e: toml_edit::TomlError| Error::Parse {
            what: format!("entry {}", self.key),
            message: e.message().to_string(),
        })?;
        let value = doc
            .get(&self.key)
            .and_then(|item| item.as_value())
            .ok_or_else(|| Error::invalid(format!("entry {}", self.key), "missing value"))?;

        match value {
            Value::String(s) => Ok(EntryValue::Constraint(s.value().clone())),
            Value::InlineTable(table) => Ok(EntryValue::Source(PinTarget::from_inline(table)?)),
            other => Err(Error::invalid(
                format!("entry {}", self.key),
                format!("unsupported {} value", other.type_name()),
            )),
        }
    }
}

impl ManifestDocument {
    /// Split `source` into text and array sections. Never fails; anything
    /// not recognised as a section stays text.
    pub fn parse(source: &str) -> Self {
        let lines: Vec<&str> = source.split_inclusive('\n').collect();
        let mut blocks = Vec::new();
        let mut text = String::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let starts_section = lines.get(i + 1).is_some_and(|next| entry_key(next).is_some());
            match header_name(line) {
                Some(array) if starts_section => {
                    let leading = take_blank_line(&mut text);
                    if !text.is_empty() {
                        blocks.push(Block::Text(std::mem::take(&mut text)));
                    }

                    let mut entries = Vec::new();
                    i += 1;
                    while let Some(key) = lines.get(i).and_then(|l| entry_key(l)) {
                        entries.push(Entry {
                            key: key.to_string(),
                            line: lines[i].to_string(),
                        });
                        i += 1;
                    }
                    blocks.push(Block::Section(ArraySection {
                        leading,
                        header: line.to_string(),
                        array: array.to_string(),
                        entries,
                    }));
                }
                _ => {
                    text.push_str(line);
                    i += 1;
                }
            }
        }
        if !text.is_empty() {
            blocks.push(Block::Text(text));
        }

        Self { blocks }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Text(text) => out.push_str(text),
                Block::Section(section) => section.render_into(&mut out),
            }
        }
        out
    }

    pub fn sections(&self) -> impl Iterator<Item = &ArraySection> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Section(section) => Some(section),
            Block::Text(_) => None,
        })
    }

    /// All entries of `array`, in document order.
    pub fn entries<'a, 'b>(&'a self, array: &'b str) -> impl Iterator<Item = &'a Entry> + use<'a, 'b> {
        self.sections()
            .filter(move |s| s.array == array)
            .flat_map(|s| s.entries.iter())
    }

    pub fn find(&self, array: &str, key: &str) -> Option<&Entry> {
        self.entries(array).find(|e| e.key == key)
    }

    pub fn contains(&self, array: &str, key: &str) -> bool {
        self.find(array, key).is_some()
    }

    /// Remove the first `key` entry of `array`.
    ///
    /// A section left without entries goes away together with its header
    /// and leading blank line. Returns whether anything was removed.
    pub fn remove(&mut self, array: &str, key: &str) -> bool {
        let position = self.blocks.iter().position(|block| {
            matches!(block, Block::Section(s) if s.array == array && s.entries.iter().any(|e| e.key == key))
        });
        let Some(index) = position else {
            return false;
        };

        if let Block::Section(section) = &mut self.blocks[index] {
            if section.entries.len() > 1 {
                if let Some(at) = section.entries.iter().position(|e| e.key == key) {
                    section.entries.remove(at);
                }
                return true;
            }
        }
        self.blocks.remove(index);
        true
    }

    /// Append `\n[[array]]\n<key> = <value>\n` at the end of the document.
    pub fn append(&mut self, array: &str, key: &str, value: &str) {
        self.ensure_trailing_newline();
        self.blocks.push(Block::Section(ArraySection {
            leading: "\n".to_string(),
            header: format!("[[{array}]]\n"),
            array: array.to_string(),
            entries: vec![Entry {
                key: key.to_string(),
                line: format!("{key} = {value}\n"),
            }],
        }));
    }

    fn ensure_trailing_newline(&mut self) {
        let last = match self.blocks.last_mut() {
            Some(Block::Text(text)) => text,
            Some(Block::Section(section)) => match section.entries.last_mut() {
                Some(entry) => &mut entry.line,
                None => &mut section.header,
            },
            None => return,
        };
        if !last.ends_with('\n') {
            last.push('\n');
        }
    }
}

impl fmt::Display for ManifestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Name inside a `[[name]]` header line.
fn header_name(line: &str) -> Option<&str> {
    let inner = line.trim().strip_prefix("[[")?.strip_suffix("]]")?.trim();
    if inner.is_empty() || inner.contains(['[', ']']) {
        return None;
    }
    Some(inner)
}

/// Bare key of a `key = value` line.
fn entry_key(line: &str) -> Option<&str> {
    let (key, _) = line.trim_start().split_once('=')?;
    let key = key.trim();
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    bare.then_some(key)
}

/// Split a trailing blank line off `text`.
fn take_blank_line(text: &mut String) -> String {
    let Some(body) = text.strip_suffix('\n') else {
        return String::new();
    };
    let start = body.rfind('\n').map_or(0, |i| i + 1);
    if text[start..].trim().is_empty() {
        text.split_off(start)
    } else {
        String::new()
    }
}
