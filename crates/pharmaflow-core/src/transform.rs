//! Line-to-record transform.
//!
//! Converts comma-separated input lines into the downstream record blocks.
//! The block format is pinned by existing consumers: the emitted text is not
//! valid JSON on its own (each block carries a trailing comma and the blocks
//! are not wrapped in an array), so do not "fix" the shape here without
//! coordinating with whatever ingests the output bucket.

use std::borrow::Cow;

/// An ordered attribute schema plus the fixed comment field emitted at the
/// top of every record block.
///
/// Values are paired positionally with attributes: a line with fewer values
/// than attributes emits only the pairs that are present, and values beyond
/// the attribute list are silently dropped. No escaping of embedded quotes
/// or commas is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    attributes: Vec<String>,
    comment: String,
}

impl RecordSchema {
    pub fn new(attributes: Vec<String>, comment: impl Into<String>) -> Self {
        Self {
            attributes,
            comment: comment.into(),
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Transform one comma-separated line into a record block.
    ///
    /// Emits `min(values, attributes)` key/value pairs in attribute order,
    /// separated by `,\n`, with the block terminated by `},\n`.
    pub fn transform_line(&self, line: &str) -> String {
        let mut block = String::from("{\n");
        block.push_str("  \"comment\": \"");
        block.push_str(&self.comment);
        block.push_str("\",\n");

        let pairs: Vec<String> = line
            .split(',')
            .zip(self.attributes.iter())
            .map(|(value, attribute)| format!("  \"{}\":\"{}\"", attribute, value))
            .collect();
        if !pairs.is_empty() {
            block.push_str(&pairs.join(",\n"));
            block.push('\n');
        }

        block.push_str("},\n");
        block
    }

    /// Transform every line of `input`, concatenating the record blocks.
    pub fn transform_text(&self, input: &str) -> String {
        let mut out = String::new();
        for line in input.lines() {
            out.push_str(&self.transform_line(line));
        }
        out
    }

    /// Transform raw object bytes. Invalid UTF-8 sequences are replaced and
    /// logged rather than failing the object.
    pub fn transform_bytes(&self, data: &[u8]) -> String {
        let text: Cow<'_, str> = match std::str::from_utf8(data) {
            Ok(text) => Cow::Borrowed(text),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "object is not valid UTF-8, replacing invalid sequences"
                );
                String::from_utf8_lossy(data)
            }
        };
        self.transform_text(&text)
    }
}
