//! Channel content merging.
//!
//! [`update_elemental`] replaces the content of exactly one channel of a
//! document and leaves every other node, and every property it does not
//! touch, as it was.

use serde_json::{Map, Value};

use super::document::{ElementalDocument, ElementalUpdate, DEFAULT_CHANNEL, ELEMENTAL_VERSION};
use super::node::{ChannelNode, ElementalNode};

/// Channel properties an update can never overwrite
const RESERVED_CHANNEL_KEYS: [&str; 3] = ["type", "elements", "channel"];

/// Apply `update` to one channel of `doc`, returning a new document.
///
/// The target is the channel named by `update.channel`, or the first channel
/// when no name is given. When no channel matches, a new one is appended.
pub fn update_elemental(doc: Option<&ElementalDocument>, update: &ElementalUpdate) -> ElementalDocument {
    merge_update(doc, update, ExistingMeta::Keep)
}

/// What happens to the target channel's `meta` node when the update has none
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExistingMeta {
    Keep,
    Discard,
}

pub(crate) fn merge_update(
    doc: Option<&ElementalDocument>,
    update: &ElementalUpdate,
    existing_meta: ExistingMeta,
) -> ElementalDocument {
    let target = update.channel.as_ref().and_then(|c| c.name());
    let properties = update.channel.as_ref().and_then(|c| c.properties());

    let mut handled = false;
    let mut elements = Vec::new();

    for node in doc.map(|d| d.elements.as_slice()).unwrap_or_default() {
        let selected = !handled
            && match (node, target) {
                (ElementalNode::Channel(channel), Some(name)) => channel.channel.as_deref() == Some(name),
                (ElementalNode::Channel(_), None) => true,
                (ElementalNode::Other(value), _) => is_opaque_channel(value, target),
                _ => false,
            };

        if !selected {
            elements.push(node.clone());
            continue;
        }

        handled = true;
        match node {
            ElementalNode::Channel(channel) => {
                tracing::debug!(channel = channel.name(), "Updating channel content");
                elements.push(merge_channel(channel, properties, update, existing_meta));
            }
            other => {
                tracing::warn!("Updating unreadable channel node, replacing content only");
                elements.push(attach_elements(other.clone(), &channel_elements(None, update)));
            }
        }
    }

    if !handled {
        let name = target.unwrap_or(DEFAULT_CHANNEL);
        tracing::debug!(channel = name, "Channel not found, appending new channel");
        elements.push(new_channel(name, properties, update));
    }

    match doc {
        Some(doc) => ElementalDocument {
            version: doc.version.clone(),
            elements,
            extra: doc.extra.clone(),
        },
        None => ElementalDocument {
            version: Some(ELEMENTAL_VERSION.to_string()),
            elements,
            extra: Map::new(),
        },
    }
}

/// Children of an updated channel: the meta node first, then the new content
fn channel_elements(existing_meta: Option<&ElementalNode>, update: &ElementalUpdate) -> Vec<ElementalNode> {
    let meta = match &update.meta {
        Some(patch) => Some(patch.to_node()),
        None => existing_meta.cloned(),
    };

    meta.into_iter().chain(update.elements.iter().cloned()).collect()
}

fn overlay_properties(map: &mut Map<String, Value>, properties: Option<&Map<String, Value>>) {
    for (key, value) in properties.into_iter().flatten() {
        if !RESERVED_CHANNEL_KEYS.contains(&key.as_str()) {
            map.insert(key.clone(), value.clone());
        }
    }
}

/// An opaque node that still reads as a channel, named `target` if one is given
fn is_opaque_channel(value: &Value, target: Option<&str>) -> bool {
    if value.get("type").and_then(Value::as_str) != Some("channel") {
        return false;
    }
    match target {
        Some(name) => value.get("channel").and_then(Value::as_str) == Some(name),
        None => true,
    }
}

fn merge_channel(
    existing: &ChannelNode,
    properties: Option<&Map<String, Value>>,
    update: &ElementalUpdate,
    existing_meta: ExistingMeta,
) -> ElementalNode {
    let carried_meta = match existing_meta {
        ExistingMeta::Keep => existing.base.elements.iter().flatten().find(|n| n.is_meta()),
        ExistingMeta::Discard => None,
    };
    let elements = channel_elements(carried_meta, update);

    // Overlaying onto the JSON form keeps typed and unknown properties alike.
    let mut map = match serde_json::to_value(existing) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            tracing::warn!(channel = existing.name(), "Channel did not serialize, replacing content only");
            let mut channel = existing.clone();
            channel.base.set_elements(elements);
            return ElementalNode::Channel(channel);
        }
    };

    map.remove("elements");
    overlay_properties(&mut map, properties);

    let mut channel = match ElementalNode::from_value(with_type(map)) {
        ElementalNode::Channel(channel) => channel,
        other => {
            // A patch gave a typed property an unexpected shape; keep it as sent.
            return attach_elements(other, &elements);
        }
    };
    channel.channel = existing.channel.clone();
    channel.base.set_elements(elements);
    ElementalNode::Channel(channel)
}

fn new_channel(name: &str, properties: Option<&Map<String, Value>>, update: &ElementalUpdate) -> ElementalNode {
    let elements = channel_elements(None, update);

    let mut map = Map::new();
    overlay_properties(&mut map, properties);
    map.insert("channel".to_string(), Value::String(name.to_string()));

    match ElementalNode::from_value(with_type(map)) {
        ElementalNode::Channel(mut channel) => {
            channel.base.set_elements(elements);
            ElementalNode::Channel(channel)
        }
        other => attach_elements(other, &elements),
    }
}

fn with_type(mut map: Map<String, Value>) -> Value {
    map.insert("type".to_string(), Value::String("channel".to_string()));
    Value::Object(map)
}

/// Set `elements` on a channel that could only be represented opaquely
fn attach_elements(node: ElementalNode, elements: &[ElementalNode]) -> ElementalNode {
    let ElementalNode::Other(Value::Object(mut map)) = node else {
        return node;
    };

    let children = elements.iter().filter_map(|e| e.to_value().ok()).collect();
    map.insert("elements".to_string(), Value::Array(children));
    ElementalNode::Other(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elemental::document::{ChannelPatch, ChannelTarget, MetaPatch};
    use serde_json::json;

    fn doc(value: Value) -> ElementalDocument {
        serde_json::from_value(value).unwrap()
    }

    fn nodes(value: Value) -> Vec<ElementalNode> {
        serde_json::from_value(value).unwrap()
    }

    fn two_channel_doc() -> ElementalDocument {
        doc(json!({
            "version": "2022-01-01",
            "elements": [
                {
                    "type": "channel",
                    "channel": "email",
                    "raw": { "subject": "Welcome" },
                    "elements": [ { "type": "text", "content": "Email body" } ]
                },
                { "type": "comment", "content": "note" },
                {
                    "type": "channel",
                    "channel": "sms",
                    "elements": [ { "type": "text", "content": "Old sms" } ]
                }
            ]
        }))
    }

    #[test]
    fn test_updates_named_channel_only() {
        let original = two_channel_doc();
        let update = ElementalUpdate {
            elements: nodes(json!([ { "type": "text", "content": "New sms" } ])),
            channel: Some("sms".into()),
            meta: None,
        };

        let result = update_elemental(Some(&original), &update);

        assert_eq!(result.elements.len(), 3);
        assert_eq!(result.elements[0], original.elements[0]);
        assert_eq!(result.elements[1], original.elements[1]);
        assert_eq!(
            result.elements[2].to_value().unwrap(),
            json!({
                "type": "channel",
                "channel": "sms",
                "elements": [ { "type": "text", "content": "New sms" } ]
            })
        );
        assert_eq!(result.version.as_deref(), Some("2022-01-01"));
    }

    #[test]
    fn test_unnamed_update_targets_first_channel() {
        let original = two_channel_doc();
        let update = ElementalUpdate {
            elements: nodes(json!([ { "type": "text", "content": "Replaced" } ])),
            ..Default::default()
        };

        let result = update_elemental(Some(&original), &update);

        let email = result.elements[0].as_channel().unwrap();
        assert_eq!(email.name(), "email");
        assert_eq!(email.raw_str("subject"), Some("Welcome"));
        assert_eq!(email.base.elements.as_ref().unwrap(), &update.elements);
        assert_eq!(result.elements[2], original.elements[2]);
    }

    #[test]
    fn test_only_first_duplicate_is_updated() {
        let original = doc(json!({
            "elements": [
                { "type": "channel", "channel": "email", "elements": [] },
                { "type": "channel", "channel": "email", "elements": [ { "type": "divider" } ] }
            ]
        }));
        let update = ElementalUpdate {
            elements: nodes(json!([ { "type": "text", "content": "x" } ])),
            channel: Some("email".into()),
            meta: None,
        };

        let result = update_elemental(Some(&original), &update);
        assert_eq!(result.elements[0].elements().len(), 1);
        assert_eq!(result.elements[1], original.elements[1]);
    }

    #[test]
    fn test_existing_meta_carried_forward() {
        let original = doc(json!({
            "elements": [{
                "type": "channel",
                "channel": "email",
                "elements": [
                    { "type": "meta", "title": "Subject", "locales": { "fr": { "title": "Sujet" } } },
                    { "type": "text", "content": "old" }
                ]
            }]
        }));
        let update = ElementalUpdate {
            elements: nodes(json!([ { "type": "text", "content": "new" } ])),
            ..Default::default()
        };

        let result = update_elemental(Some(&original), &update);
        let children = result.elements[0].elements();

        assert_eq!(children.len(), 2);
        assert_eq!(children[0], original.elements[0].elements()[0]);
        assert_eq!(children[1], ElementalNode::text("new"));
    }

    #[test]
    fn test_meta_patch_replaces_existing_meta() {
        let original = doc(json!({
            "elements": [{
                "type": "channel",
                "channel": "email",
                "elements": [ { "type": "meta", "title": "Old" } ]
            }]
        }));
        let update = ElementalUpdate {
            elements: vec![ElementalNode::text("body")],
            channel: Some("email".into()),
            meta: Some(MetaPatch::title("New")),
        };

        let result = update_elemental(Some(&original), &update);
        assert_eq!(
            result.elements[0].elements(),
            &[ElementalNode::meta("New"), ElementalNode::text("body")]
        );
    }

    #[test]
    fn test_channel_patch_overlays_properties() {
        let original = doc(json!({
            "elements": [{
                "type": "channel",
                "channel": "push",
                "raw": { "title": "Old", "text": "Body" },
                "if": "{{enabled}}",
                "custom": "kept",
                "elements": []
            }]
        }));
        let patch: ChannelPatch = serde_json::from_value(json!({
            "channel": "push",
            "raw": { "title": "New" },
            "type": "ignored",
            "elements": [ { "type": "text", "content": "ignored" } ],
            "brand": "added"
        }))
        .unwrap();
        let update = ElementalUpdate {
            elements: vec![],
            channel: Some(ChannelTarget::Patch(patch)),
            meta: None,
        };

        let result = update_elemental(Some(&original), &update);

        assert_eq!(
            result.elements[0].to_value().unwrap(),
            json!({
                "type": "channel",
                "channel": "push",
                "raw": { "title": "New" },
                "if": "{{enabled}}",
                "custom": "kept",
                "brand": "added",
                "elements": []
            })
        );
    }

    #[test]
    fn test_missing_channel_is_appended() {
        let original = two_channel_doc();
        let update = ElementalUpdate {
            elements: vec![ElementalNode::text("Hi")],
            channel: Some("inbox".into()),
            meta: Some(MetaPatch::title("Inbox title")),
        };

        let result = update_elemental(Some(&original), &update);

        assert_eq!(result.elements.len(), 4);
        assert_eq!(&result.elements[..3], &original.elements[..]);
        assert_eq!(
            result.elements[3].to_value().unwrap(),
            json!({
                "type": "channel",
                "channel": "inbox",
                "elements": [
                    { "type": "meta", "title": "Inbox title" },
                    { "type": "text", "content": "Hi" }
                ]
            })
        );
    }

    #[test]
    fn test_absent_document_defaults() {
        let update = ElementalUpdate {
            elements: vec![ElementalNode::text("Hello")],
            ..Default::default()
        };

        let result = update_elemental(None, &update);

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "version": "2022-01-01",
                "elements": [{
                    "type": "channel",
                    "channel": "email",
                    "elements": [ { "type": "text", "content": "Hello" } ]
                }]
            })
        );
    }

    #[test]
    fn test_new_channel_from_patch_properties() {
        let patch: ChannelPatch =
            serde_json::from_value(json!({ "channel": "slack", "raw": { "text": "hey" } })).unwrap();
        let update = ElementalUpdate {
            elements: vec![],
            channel: Some(ChannelTarget::Patch(patch)),
            meta: None,
        };

        let result = update_elemental(Some(&doc(json!({ "elements": [] }))), &update);

        assert_eq!(
            result.elements[0].to_value().unwrap(),
            json!({ "type": "channel", "channel": "slack", "raw": { "text": "hey" }, "elements": [] })
        );
    }

    #[test]
    fn test_document_properties_preserved() {
        let original = doc(json!({
            "version": "2023-05-05",
            "brand": "acme",
            "elements": [ { "type": "text", "content": "loose" } ]
        }));
        let update = ElementalUpdate::default();

        let result = update_elemental(Some(&original), &update);

        assert_eq!(result.version.as_deref(), Some("2023-05-05"));
        assert_eq!(result.extra.get("brand"), Some(&json!("acme")));
        assert_eq!(result.elements[0], original.elements[0]);
        assert_eq!(result.elements[1].as_channel().map(|c| c.name()), Some("email"));
    }

    #[test]
    fn test_input_not_mutated() {
        let original = two_channel_doc();
        let snapshot = original.clone();
        let update = ElementalUpdate {
            elements: vec![ElementalNode::text("changed")],
            channel: Some("email".into()),
            meta: Some(MetaPatch::title("T")),
        };

        let _ = update_elemental(Some(&original), &update);
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_channel_with_misshapen_raw_is_updated_in_place() {
        let original = doc(json!({
            "version": "2022-01-01",
            "elements": [
                { "type": "channel", "channel": "sms", "raw": "legacy", "elements": [] }
            ]
        }));
        let update = ElementalUpdate {
            elements: vec![ElementalNode::text("new")],
            channel: Some("sms".into()),
            meta: None,
        };

        let result = update_elemental(Some(&original), &update);
        assert_eq!(
            serde_json::to_value(&result.elements).unwrap(),
            json!([{
                "type": "channel",
                "channel": "sms",
                "raw": "legacy",
                "elements": [ { "type": "text", "content": "new" } ]
            }])
        );
    }

    #[test]
    fn test_opaque_channel_is_not_duplicated() {
        let original = ElementalDocument {
            version: None,
            elements: vec![ElementalNode::Other(json!({ "type": "channel", "channel": "sms" }))],
            extra: Map::new(),
        };
        let update = ElementalUpdate {
            elements: vec![ElementalNode::text("new")],
            channel: Some("sms".into()),
            meta: None,
        };

        let result = update_elemental(Some(&original), &update);
        assert_eq!(result.elements.len(), 1);
        assert_eq!(
            result.elements[0],
            ElementalNode::Other(json!({
                "type": "channel",
                "channel": "sms",
                "elements": [ { "type": "text", "content": "new" } ]
            }))
        );
    }

    #[test]
    fn test_discarded_meta_is_not_carried_forward() {
        let original = doc(json!({
            "elements": [{
                "type": "channel",
                "channel": "push",
                "elements": [ { "type": "meta", "title": "Old" }, { "type": "text", "content": "x" } ]
            }]
        }));
        let update = ElementalUpdate {
            elements: vec![],
            channel: Some("push".into()),
            meta: None,
        };

        let kept = merge_update(Some(&original), &update, ExistingMeta::Keep);
        assert_eq!(kept.elements[0].elements().len(), 1);

        let discarded = merge_update(Some(&original), &update, ExistingMeta::Discard);
        assert!(discarded.elements[0].elements().is_empty());
    }
}
