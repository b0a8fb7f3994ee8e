//! Conversion between flat strings and the single-paragraph document used by
//! one-line variable inputs.
//!
//! ```ignore
//! let doc = parse_string_to_content("Hi {{user.name}}");
//! assert_eq!(content_to_string(&doc), "Hi {{user.name}}");
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::validator::is_valid_variable_name;

lazy_static! {
    /// `{{`, one or more non-`}` characters, `}}`
    pub(crate) static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{([^}]+)\}\}").expect("valid placeholder regex");
}

/// Node of a plain-text document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlainTextNode {
    Doc {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Vec<PlainTextNode>>,
    },
    Paragraph {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Vec<PlainTextNode>>,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    Variable {
        #[serde(default)]
        attrs: VariableAttrs,
    },
}

/// Root of a plain-text document (`type: "doc"`)
pub type PlainTextDocument = PlainTextNode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub is_invalid: bool,
}

impl PlainTextNode {
    pub fn text(text: impl Into<String>) -> Self {
        PlainTextNode::Text { text: text.into() }
    }

    pub fn variable(id: impl Into<String>) -> Self {
        PlainTextNode::Variable {
            attrs: VariableAttrs {
                id: Some(id.into()),
                is_invalid: false,
            },
        }
    }
}

/// Parse a string with `{{path}}` placeholders into a one-paragraph document.
///
/// Valid placeholders become variable nodes; invalid ones stay literal text,
/// braces included, so the input is always recoverable.
pub fn parse_string_to_content(text: &str) -> PlainTextDocument {
    let mut nodes = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        push_literal(&mut nodes, &text[last..whole.start()]);

        let name = inner.as_str().trim();
        if is_valid_variable_name(name) {
            nodes.push(PlainTextNode::variable(name));
        } else {
            push_literal(&mut nodes, whole.as_str());
        }

        last = whole.end();
    }

    push_literal(&mut nodes, &text[last..]);

    let paragraph = PlainTextNode::Paragraph {
        content: (!nodes.is_empty()).then_some(nodes),
    };

    PlainTextNode::Doc {
        content: Some(vec![paragraph]),
    }
}

/// Append literal text, extending the previous run when there is one
fn push_literal(nodes: &mut Vec<PlainTextNode>, literal: &str) {
    if literal.is_empty() {
        return;
    }

    match nodes.last_mut() {
        Some(PlainTextNode::Text { text }) => text.push_str(literal),
        _ => nodes.push(PlainTextNode::text(literal)),
    }
}

/// Serialize a plain-text document back into a flat string.
pub fn content_to_string(doc: &PlainTextDocument) -> String {
    let mut out = String::new();
    write_node(doc, &mut out);
    out
}

fn write_node(node: &PlainTextNode, out: &mut String) {
    match node {
        PlainTextNode::Doc { content } | PlainTextNode::Paragraph { content } => {
            for child in content.iter().flatten() {
                write_node(child, out);
            }
        }
        PlainTextNode::Text { text } => out.push_str(text),
        PlainTextNode::Variable { attrs } => {
            if let Some(id) = attrs.id.as_deref().filter(|id| !id.is_empty()) {
                out.push_str("{{");
                out.push_str(id);
                out.push_str("}}");
            }
        }
    }
}

/// Placeholder tokens whose name fails validation, in order of appearance.
pub fn find_invalid_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?;
            if is_valid_variable_name(inner.as_str()) {
                None
            } else {
                Some(whole.as_str().to_string())
            }
        })
        .collect()
}

/// Valid placeholder names in `text`, trimmed, in order of appearance.
pub(crate) fn placeholder_names(text: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER_RE.captures_iter(text).filter_map(|caps| {
        let name = caps.get(1)?.as_str().trim();
        is_valid_variable_name(name).then_some(name)
    })
}
