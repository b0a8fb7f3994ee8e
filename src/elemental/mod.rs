//! Elemental template content.
//!
//! This module provides:
//! - Variable name validation (`{{user.firstName}}` paths)
//! - Conversion between flat strings and single-paragraph documents
//! - Variable extraction across nested, localized channel content
//! - Channel content merging that keeps each channel's title storage format
//! - Variable substitution for previews
//!
//! # Example
//!
//! ```ignore
//! let elements: Vec<ElementalNode> = serde_json::from_value(json!([
//!     { "type": "text", "content": "Hi {{user.name}}" },
//!     { "type": "action", "content": "Track", "href": "{{order.url}}" }
//! ]))?;
//!
//! assert_eq!(extract_variables_from_content(&elements), ["order.url", "user.name"]);
//!
//! let doc = update_elemental(None, &ElementalUpdate {
//!     elements,
//!     channel: Some("email".into()),
//!     meta: Some(MetaPatch::title("Your order")),
//! });
//! ```
//!
//! All functions are pure: they never mutate their arguments and keep no
//! state between calls.

mod codec;
mod document;
mod error;
mod extractor;
mod merger;
mod node;
mod preview;
mod title;
mod validator;

pub use codec::{
    content_to_string, find_invalid_placeholders, parse_string_to_content, PlainTextDocument,
    PlainTextNode, VariableAttrs,
};
pub use document::{
    ChannelPatch, ChannelTarget, ElementalDocument, ElementalUpdate, MetaPatch, DEFAULT_CHANNEL,
    ELEMENTAL_VERSION,
};
pub(crate) use document::{lenient, lenient_or_default};
pub use error::{ContentError, ContentResult};
pub use extractor::{extract_variables_from_content, extractable_fields, LOCALE_FIELDS};
pub use merger::update_elemental;
pub use node::{
    ActionNode, ChannelNode, ContainerNode, ElementalNode, Field, ImageNode, LinkNode, ListNode,
    LocaleEntry, LocaleOverlay, MetaNode, NodeBase, NodeKind, TextNode,
};
pub use preview::render_preview;
pub use title::{
    create_title_update, extract_current_title, get_subject_storage_format, update_channel_title,
    ChannelKind, RawTitle, SubjectStorageFormat, TitleUpdate,
};
pub use validator::is_valid_variable_name;
