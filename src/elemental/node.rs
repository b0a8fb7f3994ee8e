//! Elemental content nodes.
//!
//! A node is a closed sum over the content kinds an elemental document can
//! hold. Every variant keeps the properties it does not model in a flattened
//! `extra` bag so that a document survives a deserialize/serialize cycle
//! without losing styling or editor-specific data.
//!
//! Nodes whose `type` is unknown are kept verbatim as
//! [`ElementalNode::Other`]. A known node with a property of the wrong JSON
//! type still decodes: only that property moves into `extra`, unread.

use std::collections::BTreeMap;

use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Discriminator of an [`ElementalNode`], as written in its `type` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Text,
    String,
    Link,
    Img,
    Image,
    Action,
    Meta,
    Channel,
    Divider,
    Group,
    Columns,
    Column,
    Quote,
    Html,
    Comment,
    List,
    ListItem,
    Unknown,
}

impl NodeKind {
    /// Resolve a `type` property value
    pub fn from_type(value: &str) -> Self {
        match value {
            "text" => NodeKind::Text,
            "string" => NodeKind::String,
            "link" => NodeKind::Link,
            "img" => NodeKind::Img,
            "image" => NodeKind::Image,
            "action" => NodeKind::Action,
            "meta" => NodeKind::Meta,
            "channel" => NodeKind::Channel,
            "divider" => NodeKind::Divider,
            "group" => NodeKind::Group,
            "columns" => NodeKind::Columns,
            "column" => NodeKind::Column,
            "quote" => NodeKind::Quote,
            "html" => NodeKind::Html,
            "comment" => NodeKind::Comment,
            "list" => NodeKind::List,
            "list-item" => NodeKind::ListItem,
            _ => NodeKind::Unknown,
        }
    }

    /// The `type` property value, `None` for unknown kinds
    pub fn as_type(&self) -> Option<&'static str> {
        match self {
            NodeKind::Text => Some("text"),
            NodeKind::String => Some("string"),
            NodeKind::Link => Some("link"),
            NodeKind::Img => Some("img"),
            NodeKind::Image => Some("image"),
            NodeKind::Action => Some("action"),
            NodeKind::Meta => Some("meta"),
            NodeKind::Channel => Some("channel"),
            NodeKind::Divider => Some("divider"),
            NodeKind::Group => Some("group"),
            NodeKind::Columns => Some("columns"),
            NodeKind::Column => Some("column"),
            NodeKind::Quote => Some("quote"),
            NodeKind::Html => Some("html"),
            NodeKind::Comment => Some("comment"),
            NodeKind::List => Some("list"),
            NodeKind::ListItem => Some("list-item"),
            NodeKind::Unknown => None,
        }
    }
}

/// A string property that may carry `{{variable}}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Content,
    Href,
    Src,
    AltText,
    Title,
    ImgSrc,
    ImgHref,
}

impl Field {
    /// Property name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Field::Content => "content",
            Field::Href => "href",
            Field::Src => "src",
            Field::AltText => "alt_text",
            Field::Title => "title",
            Field::ImgSrc => "imgSrc",
            Field::ImgHref => "imgHref",
        }
    }
}

/// Properties shared by every node kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeBase {
    /// Conditional directive, e.g. `{{isVisible}}`
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub if_expr: Option<String>,

    /// Loop directive, e.g. `{{items}}`
    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_expr: Option<String>,

    /// Per-locale overlays keyed by locale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<BTreeMap<String, LocaleEntry>>,

    /// Child nodes in render order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementalNode>>,

    /// Properties not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeBase {
    /// Replace the children, dropping any unreadable `elements` kept in `extra`
    pub fn set_elements(&mut self, elements: Vec<ElementalNode>) {
        self.extra.remove("elements");
        self.elements = Some(elements);
    }

    /// Overlays of the `locales` map that are objects
    pub fn overlays(&self) -> impl Iterator<Item = &LocaleOverlay> {
        self.locales
            .iter()
            .flat_map(|locales| locales.values())
            .filter_map(LocaleEntry::overlay)
    }

    pub fn overlays_mut(&mut self) -> impl Iterator<Item = &mut LocaleOverlay> {
        self.locales
            .iter_mut()
            .flat_map(|locales| locales.values_mut())
            .filter_map(LocaleEntry::overlay_mut)
    }
}

/// One value of a node's `locales` map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocaleEntry {
    Overlay(LocaleOverlay),
    /// Anything that is not an object, kept as received
    Opaque(Value),
}

impl LocaleEntry {
    pub fn overlay(&self) -> Option<&LocaleOverlay> {
        match self {
            LocaleEntry::Overlay(overlay) => Some(overlay),
            LocaleEntry::Opaque(_) => None,
        }
    }

    pub fn overlay_mut(&mut self) -> Option<&mut LocaleOverlay> {
        match self {
            LocaleEntry::Overlay(overlay) => Some(overlay),
            LocaleEntry::Opaque(_) => None,
        }
    }
}

/// Partial per-locale replacement of a node's content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocaleOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ElementalNode>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `text`, `string`, `quote` and `html` nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(flatten)]
    pub base: NodeBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(flatten)]
    pub base: NodeBase,
}

/// `img` and `image` nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,

    #[serde(flatten)]
    pub base: NodeBase,
}

/// Button-like call to action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,

    #[serde(flatten)]
    pub base: NodeBase,
}

/// Title carrier for a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(flatten)]
    pub base: NodeBase,
}

/// Per-channel content root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelNode {
    /// Channel name (`email`, `push`, `inbox`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    /// Free-form channel strings such as `subject`, `title` and `text`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub base: NodeBase,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListNode {
    #[serde(rename = "imgSrc", default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,

    #[serde(rename = "imgHref", default, skip_serializing_if = "Option::is_none")]
    pub img_href: Option<String>,

    #[serde(flatten)]
    pub base: NodeBase,
}

/// Nodes without variable-bearing fields of their own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerNode {
    #[serde(flatten)]
    pub base: NodeBase,
}

/// One node of an elemental document
#[derive(Debug, Clone, PartialEq)]
pub enum ElementalNode {
    Text(TextNode),
    String(TextNode),
    Link(LinkNode),
    Img(ImageNode),
    Image(ImageNode),
    Action(ActionNode),
    Meta(MetaNode),
    Channel(ChannelNode),
    Divider(ContainerNode),
    Group(ContainerNode),
    Columns(ContainerNode),
    Column(ContainerNode),
    Quote(TextNode),
    Html(TextNode),
    Comment(ContainerNode),
    List(ListNode),
    ListItem(ContainerNode),
    /// Unknown kind or non-object node, kept exactly as received
    Other(Value),
}

impl ElementalNode {
    /// Plain `text` node
    pub fn text(content: impl Into<String>) -> Self {
        ElementalNode::Text(TextNode {
            content: Some(content.into()),
            base: NodeBase::default(),
        })
    }

    /// `meta` node carrying a title
    pub fn meta(title: impl Into<String>) -> Self {
        ElementalNode::Meta(MetaNode {
            title: Some(title.into()),
            base: NodeBase::default(),
        })
    }

    /// Empty `channel` node
    pub fn channel(name: impl Into<String>) -> Self {
        ElementalNode::Channel(ChannelNode {
            channel: Some(name.into()),
            ..Default::default()
        })
    }

    /// Build a node from JSON. Never fails: unknown kinds and non-objects
    /// become [`ElementalNode::Other`], misshapen properties of known kinds
    /// are kept in `extra`.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return ElementalNode::Other(value);
        };

        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .map(NodeKind::from_type)
            .unwrap_or(NodeKind::Unknown);

        if kind == NodeKind::Unknown {
            return ElementalNode::Other(Value::Object(map));
        }

        let tag = map.remove("type");
        let mut misshapen = take_misshapen(&mut map, BASE_SHAPES);
        misshapen.extend(take_misshapen(&mut map, kind_shapes(kind)));
        let misshapen_overlays = take_misshapen_overlays(&mut map);
        if !misshapen.is_empty() || !misshapen_overlays.is_empty() {
            tracing::debug!(kind = ?kind, "Keeping misshapen node properties unread");
        }

        let body = Value::Object(map);
        match Self::decode(kind, &body) {
            Ok(mut node) => {
                node.restore_misshapen(misshapen, misshapen_overlays);
                node
            }
            Err(e) => {
                tracing::debug!(kind = ?kind, error = %e, "Keeping undecodable node verbatim");
                let Value::Object(mut map) = body else {
                    return ElementalNode::Other(body);
                };
                map.extend(misshapen);
                if let Some(Value::Object(locales)) = map.get_mut("locales") {
                    for (locale, props) in misshapen_overlays {
                        if let Some(Value::Object(overlay)) = locales.get_mut(&locale) {
                            overlay.extend(props);
                        }
                    }
                }
                if let Some(tag) = tag {
                    map.insert("type".to_string(), tag);
                }
                ElementalNode::Other(Value::Object(map))
            }
        }
    }

    fn restore_misshapen(&mut self, misshapen: Map<String, Value>, overlays: BTreeMap<String, Map<String, Value>>) {
        let Some(base) = self.base_mut() else {
            return;
        };
        base.extra.extend(misshapen);

        for (locale, props) in overlays {
            if let Some(LocaleEntry::Overlay(overlay)) = base.locales.as_mut().and_then(|l| l.get_mut(&locale)) {
                overlay.extra.extend(props);
            }
        }
    }

    fn decode(kind: NodeKind, body: &Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            NodeKind::Text => ElementalNode::Text(TextNode::deserialize(body)?),
            NodeKind::String => ElementalNode::String(TextNode::deserialize(body)?),
            NodeKind::Link => ElementalNode::Link(LinkNode::deserialize(body)?),
            NodeKind::Img => ElementalNode::Img(ImageNode::deserialize(body)?),
            NodeKind::Image => ElementalNode::Image(ImageNode::deserialize(body)?),
            NodeKind::Action => ElementalNode::Action(ActionNode::deserialize(body)?),
            NodeKind::Meta => ElementalNode::Meta(MetaNode::deserialize(body)?),
            NodeKind::Channel => ElementalNode::Channel(ChannelNode::deserialize(body)?),
            NodeKind::Divider => ElementalNode::Divider(ContainerNode::deserialize(body)?),
            NodeKind::Group => ElementalNode::Group(ContainerNode::deserialize(body)?),
            NodeKind::Columns => ElementalNode::Columns(ContainerNode::deserialize(body)?),
            NodeKind::Column => ElementalNode::Column(ContainerNode::deserialize(body)?),
            NodeKind::Quote => ElementalNode::Quote(TextNode::deserialize(body)?),
            NodeKind::Html => ElementalNode::Html(TextNode::deserialize(body)?),
            NodeKind::Comment => ElementalNode::Comment(ContainerNode::deserialize(body)?),
            NodeKind::List => ElementalNode::List(ListNode::deserialize(body)?),
            NodeKind::ListItem => ElementalNode::ListItem(ContainerNode::deserialize(body)?),
            NodeKind::Unknown => ElementalNode::Other(body.clone()),
        })
    }

    /// JSON form of the node, `type` included
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let body = match self {
            ElementalNode::Text(n)
            | ElementalNode::String(n)
            | ElementalNode::Quote(n)
            | ElementalNode::Html(n) => serde_json::to_value(n)?,
            ElementalNode::Link(n) => serde_json::to_value(n)?,
            ElementalNode::Img(n) | ElementalNode::Image(n) => serde_json::to_value(n)?,
            ElementalNode::Action(n) => serde_json::to_value(n)?,
            ElementalNode::Meta(n) => serde_json::to_value(n)?,
            ElementalNode::Channel(n) => serde_json::to_value(n)?,
            ElementalNode::List(n) => serde_json::to_value(n)?,
            ElementalNode::Divider(n)
            | ElementalNode::Group(n)
            | ElementalNode::Columns(n)
            | ElementalNode::Column(n)
            | ElementalNode::Comment(n)
            | ElementalNode::ListItem(n) => serde_json::to_value(n)?,
            ElementalNode::Other(value) => return Ok(value.clone()),
        };

        let mut map = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(tag) = self.kind().as_type() {
            map.insert("type".to_string(), Value::String(tag.to_string()));
        }
        Ok(Value::Object(map))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            ElementalNode::Text(_) => NodeKind::Text,
            ElementalNode::String(_) => NodeKind::String,
            ElementalNode::Link(_) => NodeKind::Link,
            ElementalNode::Img(_) => NodeKind::Img,
            ElementalNode::Image(_) => NodeKind::Image,
            ElementalNode::Action(_) => NodeKind::Action,
            ElementalNode::Meta(_) => NodeKind::Meta,
            ElementalNode::Channel(_) => NodeKind::Channel,
            ElementalNode::Divider(_) => NodeKind::Divider,
            ElementalNode::Group(_) => NodeKind::Group,
            ElementalNode::Columns(_) => NodeKind::Columns,
            ElementalNode::Column(_) => NodeKind::Column,
            ElementalNode::Quote(_) => NodeKind::Quote,
            ElementalNode::Html(_) => NodeKind::Html,
            ElementalNode::Comment(_) => NodeKind::Comment,
            ElementalNode::List(_) => NodeKind::List,
            ElementalNode::ListItem(_) => NodeKind::ListItem,
            ElementalNode::Other(_) => NodeKind::Unknown,
        }
    }

    /// Shared properties; `None` for opaque nodes
    pub fn base(&self) -> Option<&NodeBase> {
        match self {
            ElementalNode::Text(n)
            | ElementalNode::String(n)
            | ElementalNode::Quote(n)
            | ElementalNode::Html(n) => Some(&n.base),
            ElementalNode::Link(n) => Some(&n.base),
            ElementalNode::Img(n) | ElementalNode::Image(n) => Some(&n.base),
            ElementalNode::Action(n) => Some(&n.base),
            ElementalNode::Meta(n) => Some(&n.base),
            ElementalNode::Channel(n) => Some(&n.base),
            ElementalNode::List(n) => Some(&n.base),
            ElementalNode::Divider(n)
            | ElementalNode::Group(n)
            | ElementalNode::Columns(n)
            | ElementalNode::Column(n)
            | ElementalNode::Comment(n)
            | ElementalNode::ListItem(n) => Some(&n.base),
            ElementalNode::Other(_) => None,
        }
    }

    pub fn base_mut(&mut self) -> Option<&mut NodeBase> {
        match self {
            ElementalNode::Text(n)
            | ElementalNode::String(n)
            | ElementalNode::Quote(n)
            | ElementalNode::Html(n) => Some(&mut n.base),
            ElementalNode::Link(n) => Some(&mut n.base),
            ElementalNode::Img(n) | ElementalNode::Image(n) => Some(&mut n.base),
            ElementalNode::Action(n) => Some(&mut n.base),
            ElementalNode::Meta(n) => Some(&mut n.base),
            ElementalNode::Channel(n) => Some(&mut n.base),
            ElementalNode::List(n) => Some(&mut n.base),
            ElementalNode::Divider(n)
            | ElementalNode::Group(n)
            | ElementalNode::Columns(n)
            | ElementalNode::Column(n)
            | ElementalNode::Comment(n)
            | ElementalNode::ListItem(n) => Some(&mut n.base),
            ElementalNode::Other(_) => None,
        }
    }

    /// Child nodes, empty when absent
    pub fn elements(&self) -> &[ElementalNode] {
        self.base()
            .and_then(|base| base.elements.as_deref())
            .unwrap_or(&[])
    }

    /// Value of a variable-bearing field, if this kind has it and it is set
    pub fn field(&self, field: Field) -> Option<&str> {
        let value = match (self, field) {
            (
                ElementalNode::Text(n)
                | ElementalNode::String(n)
                | ElementalNode::Quote(n)
                | ElementalNode::Html(n),
                Field::Content,
            ) => &n.content,
            (ElementalNode::Link(n), Field::Href) => &n.href,
            (ElementalNode::Link(n), Field::Content) => &n.content,
            (ElementalNode::Img(n) | ElementalNode::Image(n), Field::Src) => &n.src,
            (ElementalNode::Img(n) | ElementalNode::Image(n), Field::Href) => &n.href,
            (ElementalNode::Img(n) | ElementalNode::Image(n), Field::AltText) => &n.alt_text,
            (ElementalNode::Action(n), Field::Href) => &n.href,
            (ElementalNode::Action(n), Field::Content) => &n.content,
            (ElementalNode::Meta(n), Field::Title) => &n.title,
            (ElementalNode::List(n), Field::ImgSrc) => &n.img_src,
            (ElementalNode::List(n), Field::ImgHref) => &n.img_href,
            _ => return None,
        };
        value.as_deref()
    }

    /// Mutable access to a variable-bearing field that is set
    pub fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        let value = match (self, field) {
            (
                ElementalNode::Text(n)
                | ElementalNode::String(n)
                | ElementalNode::Quote(n)
                | ElementalNode::Html(n),
                Field::Content,
            ) => &mut n.content,
            (ElementalNode::Link(n), Field::Href) => &mut n.href,
            (ElementalNode::Link(n), Field::Content) => &mut n.content,
            (ElementalNode::Img(n) | ElementalNode::Image(n), Field::Src) => &mut n.src,
            (ElementalNode::Img(n) | ElementalNode::Image(n), Field::Href) => &mut n.href,
            (ElementalNode::Img(n) | ElementalNode::Image(n), Field::AltText) => &mut n.alt_text,
            (ElementalNode::Action(n), Field::Href) => &mut n.href,
            (ElementalNode::Action(n), Field::Content) => &mut n.content,
            (ElementalNode::Meta(n), Field::Title) => &mut n.title,
            (ElementalNode::List(n), Field::ImgSrc) => &mut n.img_src,
            (ElementalNode::List(n), Field::ImgHref) => &mut n.img_href,
            _ => return None,
        };
        value.as_mut()
    }

    pub fn as_channel(&self) -> Option<&ChannelNode> {
        match self {
            ElementalNode::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn is_meta(&self) -> bool {
        matches!(self, ElementalNode::Meta(_))
    }
}

/// JSON type a modelled property must have to be read
#[derive(Debug, Clone, Copy)]
enum Shape {
    Str,
    Object,
    Array,
}

impl Shape {
    fn fits(self, value: &Value) -> bool {
        match self {
            Shape::Str => value.is_string(),
            Shape::Object => value.is_object(),
            Shape::Array => value.is_array(),
        }
    }
}

const BASE_SHAPES: &[(&str, Shape)] = &[
    ("if", Shape::Str),
    ("loop", Shape::Str),
    ("locales", Shape::Object),
    ("elements", Shape::Array),
];

const OVERLAY_SHAPES: &[(&str, Shape)] = &[
    ("content", Shape::Str),
    ("href", Shape::Str),
    ("src", Shape::Str),
    ("title", Shape::Str),
    ("raw", Shape::Object),
    ("elements", Shape::Array),
];

/// Modelled properties of each kind beyond [`NodeBase`]
fn kind_shapes(kind: NodeKind) -> &'static [(&'static str, Shape)] {
    match kind {
        NodeKind::Text | NodeKind::String | NodeKind::Quote | NodeKind::Html => {
            &[("content", Shape::Str)]
        }
        NodeKind::Link => &[("href", Shape::Str), ("content", Shape::Str)],
        NodeKind::Img | NodeKind::Image => &[
            ("src", Shape::Str),
            ("href", Shape::Str),
            ("alt_text", Shape::Str),
        ],
        NodeKind::Action => &[
            ("content", Shape::Str),
            ("href", Shape::Str),
            ("align", Shape::Str),
        ],
        NodeKind::Meta => &[("title", Shape::Str)],
        NodeKind::Channel => &[("channel", Shape::Str), ("raw", Shape::Object)],
        NodeKind::List => &[("imgSrc", Shape::Str), ("imgHref", Shape::Str)],
        NodeKind::Divider
        | NodeKind::Group
        | NodeKind::Columns
        | NodeKind::Column
        | NodeKind::Comment
        | NodeKind::ListItem
        | NodeKind::Unknown => &[],
    }
}

/// Remove the properties whose JSON type does not fit, returning them
fn take_misshapen(map: &mut Map<String, Value>, shapes: &[(&str, Shape)]) -> Map<String, Value> {
    let mut misshapen = Map::new();
    for (key, shape) in shapes {
        if map.get(*key).is_some_and(|value| !shape.fits(value)) {
            if let Some(value) = map.remove(*key) {
                misshapen.insert(key.to_string(), value);
            }
        }
    }
    misshapen
}

/// Same as [`take_misshapen`] for every object overlay in `locales`
fn take_misshapen_overlays(map: &mut Map<String, Value>) -> BTreeMap<String, Map<String, Value>> {
    let Some(Value::Object(locales)) = map.get_mut("locales") else {
        return BTreeMap::new();
    };

    locales
        .iter_mut()
        .filter_map(|(locale, entry)| {
            let Value::Object(overlay) = entry else {
                return None;
            };
            let misshapen = take_misshapen(overlay, OVERLAY_SHAPES);
            (!misshapen.is_empty()).then(|| (locale.clone(), misshapen))
        })
        .collect()
}

impl Serialize for ElementalNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ElementalNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ElementalNode::from_value)
    }
}

impl ChannelNode {
    /// Channel name, empty when unset
    pub fn name(&self) -> &str {
        self.channel.as_deref().unwrap_or_default()
    }

    /// A `raw` string property, if set and non-empty
    pub fn raw_str(&self, key: &str) -> Option<&str> {
        self.raw
            .as_ref()
            .and_then(|raw| raw.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// First `meta` child, if any
    pub fn meta(&self) -> Option<&MetaNode> {
        self.base.elements.iter().flatten().find_map(|node| match node {
            ElementalNode::Meta(meta) => Some(meta),
            _ => None,
        })
    }
}
