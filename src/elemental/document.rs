//! Elemental document and update request types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::node::{ChannelNode, ElementalNode};

/// Version literal written on freshly created documents
pub const ELEMENTAL_VERSION: &str = "2022-01-01";

/// Channel used when an update names none and the document has none
pub const DEFAULT_CHANNEL: &str = "email";

/// Read an optional property, treating a value of the wrong shape as absent
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring misshapen property");
            Ok(None)
        }
    }
}

/// [`lenient`] for properties with a default
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// A persisted multi-channel template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementalDocument {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "lenient_or_default")]
    pub elements: Vec<ElementalNode>,

    /// Document-level properties other than `version` and `elements`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementalDocument {
    /// First channel node with the given name
    pub fn channel(&self, name: &str) -> Option<&ChannelNode> {
        self.elements
            .iter()
            .filter_map(ElementalNode::as_channel)
            .find(|channel| channel.name() == name)
    }

    /// Names of all channel nodes, in document order
    pub fn channel_names(&self) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(ElementalNode::as_channel)
            .map(ChannelNode::name)
            .collect()
    }
}

/// Which channel an update targets, optionally with properties to set on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelTarget {
    Name(String),
    Patch(ChannelPatch),
}

impl ChannelTarget {
    /// Explicit channel name, if the target carries one
    pub fn name(&self) -> Option<&str> {
        match self {
            ChannelTarget::Name(name) => Some(name),
            ChannelTarget::Patch(patch) => patch.channel.as_deref(),
        }
    }

    /// Properties to copy onto the channel node
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        match self {
            ChannelTarget::Name(_) => None,
            ChannelTarget::Patch(patch) => Some(&patch.properties),
        }
    }
}

impl From<&str> for ChannelTarget {
    fn from(name: &str) -> Self {
        ChannelTarget::Name(name.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// Properties of the `meta` node written at the head of a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl MetaPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            properties: Map::new(),
        }
    }

    /// Build the `meta` node this patch describes
    pub fn to_node(&self) -> ElementalNode {
        let mut map = self.properties.clone();
        if let Some(title) = &self.title {
            map.insert("title".to_string(), Value::String(title.clone()));
        }
        map.insert("type".to_string(), Value::String("meta".to_string()));
        ElementalNode::from_value(Value::Object(map))
    }
}

/// Content replacement for one channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementalUpdate {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub elements: Vec<ElementalNode>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelTarget>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaPatch>,
}
