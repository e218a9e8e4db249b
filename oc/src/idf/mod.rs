//! EnergyPlus IDF document model
//!
//! Models an IDF file as an ordered sequence of items: raw spans (comments,
//! blank lines, whitespace) and objects (class name plus ordered fields).
//! Parsing is structural only - commas, semicolons and `!` comments - with no
//! IDD schema. Every item keeps its original text, and rendering re-emits it
//! verbatim unless the object was rewritten, so an untouched document
//! round-trips byte-for-byte.

use thiserror::Error;
use tracing::debug;

mod committer;

pub use committer::{CommitError, commit};

/// Errors from parsing an IDF source
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdfError {
    #[error("unterminated object starting at byte {offset}")]
    UnterminatedObject { offset: usize },

    #[error("object with no class name at byte {offset}")]
    EmptyObject { offset: usize },
}

/// One IDF object: class name plus ordered field values
///
/// `raw` holds the object's original text; it is cleared when the object is
/// rewritten and the renderer regenerates it.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfObject {
    pub class: String,
    pub fields: Vec<String>,
    raw: Option<String>,
}

impl IdfObject {
    /// First field is the object name by IDF convention
    pub fn name(&self) -> Option<&str> {
        self.fields.first().map(String::as_str)
    }

    /// Replace this object's fields, dropping the original text
    pub(crate) fn rewrite(&mut self, fields: Vec<String>) {
        debug!(class = %self.class, field_count = %fields.len(), "IdfObject::rewrite: called");
        self.fields = fields;
        self.raw = None;
    }

    /// Render the object, regenerating text only when rewritten
    fn render(&self) -> String {
        debug!(class = %self.class, rewritten = %self.raw.is_none(), "IdfObject::render: called");
        if let Some(raw) = &self.raw {
            return raw.clone();
        }

        let mut out = format!("{},\n", self.class);
        for (i, field) in self.fields.iter().enumerate() {
            let terminator = if i + 1 == self.fields.len() { ';' } else { ',' };
            out.push_str(&format!("    {}{}\n", field, terminator));
        }
        out
    }
}

/// One item of the document stream
#[derive(Debug, Clone, PartialEq)]
enum DocumentItem {
    /// Whitespace and comments between objects, kept verbatim
    Raw(String),
    Object(IdfObject),
}

/// An IDF document: ordered raw spans and objects
///
/// The core never opens or saves files; callers hand in the loaded source
/// text and persist the rendered output themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDocument {
    items: Vec<DocumentItem>,
}

impl ScheduleDocument {
    /// Parse an IDF source into the document model
    pub fn parse(source: &str) -> Result<Self, IdfError> {
        debug!(source_len = %source.len(), "ScheduleDocument::parse: called");
        let bytes = source.as_bytes();
        let mut items = Vec::new();
        let mut cursor = 0;

        while cursor < bytes.len() {
            let object_start = match find_object_start(source, cursor) {
                Some(pos) => pos,
                None => {
                    // Only whitespace/comments remain
                    items.push(DocumentItem::Raw(source[cursor..].to_string()));
                    cursor = bytes.len();
                    break;
                }
            };

            if object_start > cursor {
                items.push(DocumentItem::Raw(source[cursor..object_start].to_string()));
            }

            let object_end = find_object_end(source, object_start)
                .ok_or(IdfError::UnterminatedObject { offset: object_start })?;

            let raw = &source[object_start..=object_end];
            items.push(DocumentItem::Object(parse_object(raw, object_start)?));
            cursor = object_end + 1;
        }

        if cursor >= bytes.len() && items.is_empty() {
            items.push(DocumentItem::Raw(source.to_string()));
        }

        debug!(item_count = %items.len(), "ScheduleDocument::parse: done");
        Ok(Self { items })
    }

    /// Render the document back to IDF text
    pub fn render(&self) -> String {
        debug!(item_count = %self.items.len(), "ScheduleDocument::render: called");
        let mut out = String::new();
        for item in &self.items {
            match item {
                DocumentItem::Raw(text) => out.push_str(text),
                DocumentItem::Object(object) => out.push_str(&object.render()),
            }
        }
        out
    }

    /// Iterate the document's objects in order
    pub fn objects(&self) -> impl Iterator<Item = &IdfObject> {
        self.items.iter().filter_map(|item| match item {
            DocumentItem::Object(object) => Some(object),
            DocumentItem::Raw(_) => None,
        })
    }

    /// Find the first object of `class` named `name` (exact name match)
    pub(crate) fn find_object_mut(&mut self, class: &str, name: &str) -> Option<&mut IdfObject> {
        debug!(%class, %name, "ScheduleDocument::find_object_mut: called");
        self.items.iter_mut().find_map(|item| match item {
            DocumentItem::Object(object)
                if object.class.eq_ignore_ascii_case(class) && object.name() == Some(name) =>
            {
                Some(object)
            }
            _ => None,
        })
    }
}

/// Position of the next non-whitespace, non-comment character
fn find_object_start(source: &str, from: usize) -> Option<usize> {
    let mut in_comment = false;
    for (offset, ch) in source[from..].char_indices() {
        match ch {
            '\n' => in_comment = false,
            '!' => in_comment = true,
            c if c.is_whitespace() || in_comment => {}
            _ => return Some(from + offset),
        }
    }
    None
}

/// Position of the object's terminating semicolon
fn find_object_end(source: &str, from: usize) -> Option<usize> {
    let mut in_comment = false;
    for (offset, ch) in source[from..].char_indices() {
        match ch {
            '\n' => in_comment = false,
            '!' => in_comment = true,
            ';' if !in_comment => return Some(from + offset),
            _ => {}
        }
    }
    None
}

/// Split an object span into class and fields, dropping inline comments
fn parse_object(raw: &str, offset: usize) -> Result<IdfObject, IdfError> {
    debug!(raw_len = %raw.len(), "parse_object: called");
    let mut stripped = String::with_capacity(raw.len());
    let mut in_comment = false;
    for ch in raw.chars() {
        match ch {
            '\n' => {
                in_comment = false;
                stripped.push(ch);
            }
            '!' => in_comment = true,
            _ if in_comment => {}
            _ => stripped.push(ch),
        }
    }

    let body = stripped.trim_end().trim_end_matches(';');
    let mut parts = body.split(',').map(|part| part.trim().to_string());

    let class = parts.next().filter(|c| !c.is_empty()).ok_or(IdfError::EmptyObject { offset })?;
    let fields: Vec<String> = parts.collect();

    Ok(IdfObject {
        class,
        fields,
        raw: Some(raw.to_string()),
    })
}
