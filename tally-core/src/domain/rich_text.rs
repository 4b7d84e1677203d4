use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A rich-text document as stored by the PSA server: a JSON array of block
/// nodes, each with a `type` and an optional `content` list of inline nodes.
/// Some server responses wrap the blocks in a doc node
/// (`{"type":"doc","content":[...]}`); both shapes are accepted.
///
/// Tally never renders these documents; it only needs to build plain-text
/// ones and to decide whether a document carries any visible content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(Value);

impl RichText {
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Build a single-paragraph document from plain text.
    pub fn from_plain_text(text: impl AsRef<str>) -> Self {
        Self(json!([
            {
                "type": "paragraph",
                "content": [
                    { "type": "text", "text": text.as_ref() }
                ]
            }
        ]))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// True when the document reduces to no visible content.
    ///
    /// An empty paragraph (`{"type":"paragraph","content":[]}`), a missing
    /// `content` field, and whitespace-only text nodes all count as empty.
    pub fn is_empty(&self) -> bool {
        match self.blocks() {
            Some(blocks) => !blocks.iter().any(block_has_content),
            None => true,
        }
    }

    /// Concatenated plain text of all text nodes, blocks joined by newlines.
    pub fn text(&self) -> String {
        let Some(blocks) = self.blocks() else {
            return String::new();
        };

        blocks
            .iter()
            .map(block_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The block list, unwrapping a doc-node wrapper if present.
    fn blocks(&self) -> Option<&Vec<Value>> {
        match &self.0 {
            Value::Array(blocks) => Some(blocks),
            Value::Object(doc) => match doc.get("content") {
                Some(Value::Array(blocks)) => Some(blocks),
                _ => None,
            },
            _ => None,
        }
    }
}

fn block_has_content(block: &Value) -> bool {
    match block.get("content") {
        Some(Value::Array(nodes)) => nodes.iter().any(node_has_content),
        _ => false,
    }
}

fn node_has_content(node: &Value) -> bool {
    match node.get("text") {
        Some(Value::String(text)) => !text.trim().is_empty(),
        // Non-text inline nodes (mentions, images) count as content.
        _ => node.get("type").is_some(),
    }
}

fn block_text(block: &Value) -> String {
    match block.get("content") {
        Some(Value::Array(nodes)) => nodes
            .iter()
            .filter_map(|n| n.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}
