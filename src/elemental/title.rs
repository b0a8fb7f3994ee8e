//! Channel title and subject handling.
//!
//! A channel stores its title either as strings in its `raw` bag or as a
//! `meta` node at the head of its elements. Which one is used depends on the
//! channel and on what the existing document already does:
//!
//! | channel | storage |
//! |---------|---------|
//! | email   | `raw.subject` when already stored there, otherwise a meta node |
//! | push    | `raw.title` + `raw.text`, no elements |
//! | inbox   | meta node, first text element doubles as the title |
//! | others  | detected format, meta node by default |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::document::{ChannelPatch, ChannelTarget, ElementalDocument, ElementalUpdate, MetaPatch};
use super::error::{ContentError, ContentResult};
use super::merger::{merge_update, ExistingMeta};
use super::node::{ActionNode, ChannelNode, ElementalNode, NodeBase, TextNode};

/// Where a channel currently keeps its title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectStorageFormat {
    Raw,
    Meta,
    None,
}

/// Channels with their own title conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Email,
    Push,
    Inbox,
    Other,
}

impl ChannelKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "email" => ChannelKind::Email,
            "push" => ChannelKind::Push,
            "inbox" => ChannelKind::Inbox,
            _ => ChannelKind::Other,
        }
    }
}

/// Raw title strings of a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTitle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RawTitle {
    /// Write the set strings into an existing `raw` bag
    pub fn merge_into(&self, raw: &mut Map<String, Value>) {
        let entries = [
            ("subject", &self.subject),
            ("title", &self.title),
            ("text", &self.text),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                raw.insert(key.to_string(), Value::String(value.clone()));
            }
        }
    }
}

/// Channel content after a title change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleUpdate {
    pub elements: Vec<ElementalNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawTitle>,
}

/// Detect how `channel_name` stores its title in `doc`.
pub fn get_subject_storage_format(doc: Option<&ElementalDocument>, channel_name: &str) -> SubjectStorageFormat {
    let Some(channel) = doc.and_then(|d| d.channel(channel_name)) else {
        return SubjectStorageFormat::None;
    };

    if channel.raw_str("subject").is_some() || channel.raw_str("title").is_some() {
        return SubjectStorageFormat::Raw;
    }

    if channel.meta().and_then(|meta| meta.title.as_deref()).is_some() {
        return SubjectStorageFormat::Meta;
    }

    SubjectStorageFormat::None
}

/// Current title of a channel node, empty when it has none.
pub fn extract_current_title(channel: Option<&ChannelNode>, channel_name: &str) -> String {
    let Some(channel) = channel else {
        return String::new();
    };

    let meta_title = move || {
        channel
            .meta()
            .and_then(|meta| meta.title.as_deref())
            .filter(|title| !title.is_empty())
    };

    let title = match ChannelKind::from_name(channel_name) {
        ChannelKind::Email => channel.raw_str("subject").or_else(meta_title),
        ChannelKind::Push => channel
            .raw_str("title")
            .or_else(meta_title)
            .or_else(|| first_text(channel)),
        ChannelKind::Inbox => meta_title()
            .or_else(|| channel.raw_str("title"))
            .or_else(|| first_text(channel)),
        ChannelKind::Other => channel
            .raw_str("subject")
            .or_else(|| channel.raw_str("title"))
            .or_else(meta_title),
    };

    title.unwrap_or_default().to_string()
}

/// Compute the elements and raw strings that store `new_title` for a channel.
///
/// Meta nodes in `elements` are dropped; the title is positioned according to
/// the channel convention instead.
pub fn create_title_update(
    original: Option<&ElementalDocument>,
    channel_name: &str,
    new_title: &str,
    elements: &[ElementalNode],
) -> TitleUpdate {
    let content: Vec<ElementalNode> = elements.iter().filter(|n| !n.is_meta()).cloned().collect();
    let existing = original.and_then(|doc| doc.channel(channel_name));

    match ChannelKind::from_name(channel_name) {
        ChannelKind::Push => push_title_update(existing, new_title, &content),
        ChannelKind::Inbox => inbox_title_update(existing, new_title, content),
        kind => {
            let format = get_subject_storage_format(original, channel_name);
            if format != SubjectStorageFormat::Raw {
                return with_meta(existing, new_title, content);
            }

            let uses_title_key = kind != ChannelKind::Email
                && existing.is_some_and(|c| c.raw_str("subject").is_none());
            let raw = if uses_title_key {
                RawTitle {
                    title: Some(new_title.to_string()),
                    ..Default::default()
                }
            } else {
                RawTitle {
                    subject: Some(new_title.to_string()),
                    ..Default::default()
                }
            };

            TitleUpdate {
                elements: content,
                raw: Some(raw),
            }
        }
    }
}

fn push_title_update(existing: Option<&ChannelNode>, new_title: &str, content: &[ElementalNode]) -> TitleUpdate {
    let texts: Vec<&str> = content
        .iter()
        .filter_map(|node| match node {
            ElementalNode::Text(text) => Some(text.content.as_deref().unwrap_or_default()),
            _ => None,
        })
        .collect();

    let (title, text) = if texts.is_empty() {
        let text = existing.and_then(|c| c.raw_str("text")).unwrap_or_default();
        (new_title, text)
    } else {
        let title = texts
            .first()
            .copied()
            .filter(|first| !first.is_empty() && *first != "\n")
            .unwrap_or(new_title);
        (title, texts.get(1).copied().unwrap_or_default())
    };

    TitleUpdate {
        elements: Vec::new(),
        raw: Some(RawTitle {
            title: Some(title.to_string()),
            text: Some(text.to_string()),
            ..Default::default()
        }),
    }
}

fn inbox_title_update(existing: Option<&ChannelNode>, new_title: &str, mut content: Vec<ElementalNode>) -> TitleUpdate {
    let leading_title = match content.first() {
        Some(ElementalNode::Text(text)) => text
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string),
        _ => None,
    };

    let title = match leading_title {
        Some(title) => {
            content.remove(0);
            title
        }
        None => new_title.to_string(),
    };

    let cleaned = content.into_iter().map(clean_inbox_node).collect();
    with_meta(existing, &title, cleaned)
}

/// Strip styling from inbox text and action nodes
fn clean_inbox_node(node: ElementalNode) -> ElementalNode {
    match node {
        ElementalNode::Text(text) => ElementalNode::Text(TextNode {
            content: text.content,
            base: NodeBase::default(),
        }),
        ElementalNode::Action(action) => ElementalNode::Action(ActionNode {
            content: action.content,
            href: action.href,
            align: action.align,
            base: NodeBase::default(),
        }),
        other => other,
    }
}

/// Prepend a meta node, reusing the existing one's extra properties
fn with_meta(existing: Option<&ChannelNode>, title: &str, content: Vec<ElementalNode>) -> TitleUpdate {
    let meta = match existing.and_then(ChannelNode::meta) {
        Some(meta) => {
            let mut meta = meta.clone();
            meta.base.extra.remove("title");
            meta.title = Some(title.to_string());
            ElementalNode::Meta(meta)
        }
        None => ElementalNode::meta(title),
    };

    TitleUpdate {
        elements: std::iter::once(meta).chain(content).collect(),
        raw: None,
    }
}

/// Set a channel's title and content in one step.
///
/// Raw title strings are merged into the channel's existing `raw` bag so that
/// unrelated raw keys survive.
pub fn update_channel_title(
    doc: Option<&ElementalDocument>,
    channel_name: &str,
    new_title: &str,
    elements: &[ElementalNode],
) -> ContentResult<ElementalDocument> {
    if channel_name.trim().is_empty() {
        return Err(ContentError::EmptyChannel);
    }

    let TitleUpdate { mut elements, raw } = create_title_update(doc, channel_name, new_title, elements);

    let meta = if elements.first().is_some_and(ElementalNode::is_meta) {
        let mut node = elements.remove(0).to_value()?;
        if let Value::Object(map) = &mut node {
            map.remove("type");
        }
        Some(serde_json::from_value::<MetaPatch>(node)?)
    } else {
        None
    };

    let channel = match raw {
        Some(raw) => {
            let mut bag = doc
                .and_then(|d| d.channel(channel_name))
                .and_then(|c| c.raw.clone())
                .unwrap_or_default();
            raw.merge_into(&mut bag);

            let mut properties = Map::new();
            properties.insert("raw".to_string(), Value::Object(bag));
            ChannelTarget::Patch(ChannelPatch {
                channel: Some(channel_name.to_string()),
                properties,
            })
        }
        None => ChannelTarget::Name(channel_name.to_string()),
    };

    let update = ElementalUpdate {
        elements,
        channel: Some(channel),
        meta,
    };

    // Push keeps its title in `raw` only
    let existing_meta = match ChannelKind::from_name(channel_name) {
        ChannelKind::Push => ExistingMeta::Discard,
        _ => ExistingMeta::Keep,
    };

    Ok(merge_update(doc, &update, existing_meta))
}

fn first_text(channel: &ChannelNode) -> Option<&str> {
    channel.base.elements.iter().flatten().find_map(|node| match node {
        ElementalNode::Text(text) => text.content.as_deref().filter(|c| !c.is_empty()),
        _ => None,
    })
}
