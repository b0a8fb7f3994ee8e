//! Variable extraction across an elemental content tree

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::codec::placeholder_names;
use super::node::{ElementalNode, Field, LocaleOverlay, NodeKind};

/// Fields scanned on every locale overlay, whatever the node kind
pub const LOCALE_FIELDS: [Field; 4] = [Field::Content, Field::Href, Field::Src, Field::Title];

/// Variable-bearing fields per node kind.
///
/// `html` is deliberately empty: its braces belong to markup, not to the
/// placeholder syntax.
pub fn extractable_fields(kind: NodeKind) -> &'static [Field] {
    match kind {
        NodeKind::Text | NodeKind::String => &[Field::Content],
        NodeKind::Link => &[Field::Href, Field::Content],
        NodeKind::Img | NodeKind::Image => &[Field::Src, Field::Href, Field::AltText],
        NodeKind::Action => &[Field::Href, Field::Content],
        NodeKind::Meta => &[Field::Title],
        NodeKind::List => &[Field::ImgSrc, Field::ImgHref],
        NodeKind::Quote => &[Field::Content],
        NodeKind::Html => &[],
        NodeKind::Channel
        | NodeKind::Divider
        | NodeKind::Group
        | NodeKind::Columns
        | NodeKind::Column
        | NodeKind::Comment
        | NodeKind::ListItem
        | NodeKind::Unknown => &[],
    }
}

/// Collect every valid variable referenced by `elements`, sorted and deduplicated.
pub fn extract_variables_from_content(elements: &[ElementalNode]) -> Vec<String> {
    let mut collector = VariableCollector::default();
    collector.visit_all(elements);
    collector.into_sorted()
}

#[derive(Default)]
struct VariableCollector {
    names: BTreeSet<String>,
}

impl VariableCollector {
    fn into_sorted(self) -> Vec<String> {
        self.names.into_iter().collect()
    }

    fn scan(&mut self, text: &str) {
        for name in placeholder_names(text) {
            self.names.insert(name.to_string());
        }
    }

    fn scan_raw(&mut self, raw: &Map<String, Value>) {
        for value in raw.values() {
            if let Value::String(text) = value {
                self.scan(text);
            }
        }
    }

    fn visit_all(&mut self, elements: &[ElementalNode]) {
        for node in elements {
            self.visit(node);
        }
    }

    fn visit(&mut self, node: &ElementalNode) {
        if let ElementalNode::Other(value) = node {
            self.visit_opaque(value);
            return;
        }

        for field in extractable_fields(node.kind()) {
            if let Some(text) = node.field(*field) {
                self.scan(text);
            }
        }

        if let ElementalNode::Channel(channel) = node {
            if let Some(raw) = &channel.raw {
                self.scan_raw(raw);
            }
        }

        let Some(base) = node.base() else {
            return;
        };

        for directive in [&base.if_expr, &base.loop_expr].into_iter().flatten() {
            self.scan(directive);
        }

        for overlay in base.overlays() {
            self.visit_locale(overlay);
        }

        if let Some(children) = &base.elements {
            self.visit_all(children);
        }
    }

    fn visit_locale(&mut self, overlay: &LocaleOverlay) {
        for field in LOCALE_FIELDS {
            let value = match field {
                Field::Content => &overlay.content,
                Field::Href => &overlay.href,
                Field::Src => &overlay.src,
                Field::Title => &overlay.title,
                _ => continue,
            };
            if let Some(text) = value {
                self.scan(text);
            }
        }

        if let Some(raw) = &overlay.raw {
            self.scan_raw(raw);
        }

        if let Some(children) = &overlay.elements {
            self.visit_all(children);
        }
    }

    /// Unknown nodes still contribute their directives and children
    fn visit_opaque(&mut self, value: &Value) {
        let Value::Object(map) = value else {
            return;
        };

        for key in ["if", "loop"] {
            if let Some(Value::String(directive)) = map.get(key) {
                self.scan(directive);
            }
        }

        if let Some(Value::Array(children)) = map.get("elements") {
            for child in children {
                self.visit(&ElementalNode::from_value(child.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(value: Value) -> Vec<String> {
        let elements: Vec<ElementalNode> = serde_json::from_value(value).unwrap();
        extract_variables_from_content(&elements)
    }

    #[test]
    fn test_dedup_and_sort() {
        let vars = extract(json!([
            { "type": "text", "content": "{{zebra}} {{apple}}" },
            { "type": "text", "content": "{{apple}}" }
        ]));
        assert_eq!(vars, vec!["apple", "zebra"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_variables_from_content(&[]).is_empty());
    }

    #[test]
    fn test_invalid_names_dropped() {
        let vars = extract(json!([
            { "type": "text", "content": "Hello {{123bad}}! {{ }} {{a..b}} {{ ok }}" }
        ]));
        assert_eq!(vars, vec!["ok"]);
    }

    #[test]
    fn test_html_excluded() {
        let vars = extract(json!([{ "type": "html", "content": "<a>{{x}}</a>" }]));
        assert!(vars.is_empty());
    }

    #[test]
    fn test_html_directives_still_scanned() {
        let vars = extract(json!([
            { "type": "html", "content": "{{x}}", "if": "{{showHtml}}" }
        ]));
        assert_eq!(vars, vec!["showHtml"]);
    }

    #[test]
    fn test_field_table_per_kind() {
        let vars = extract(json!([
            { "type": "link", "href": "{{link.href}}", "content": "{{link.content}}" },
            { "type": "img", "src": "{{img.src}}", "href": "{{img.href}}", "alt_text": "{{img.alt}}" },
            { "type": "image", "src": "{{image.src}}" },
            { "type": "action", "href": "{{action.href}}", "content": "{{action.content}}" },
            { "type": "meta", "title": "{{meta.title}}" },
            { "type": "list", "imgSrc": "{{list.src}}", "imgHref": "{{list.href}}" },
            { "type": "quote", "content": "{{quote}}" },
            { "type": "string", "content": "{{string}}" }
        ]));

        assert_eq!(
            vars,
            vec![
                "action.content",
                "action.href",
                "image.src",
                "img.alt",
                "img.href",
                "img.src",
                "link.content",
                "link.href",
                "list.href",
                "list.src",
                "meta.title",
                "quote",
                "string",
            ]
        );
    }

    #[test]
    fn test_fields_outside_table_ignored() {
        let vars = extract(json!([
            { "type": "text", "content": "a", "href": "{{notScanned}}" },
            { "type": "divider", "content": "{{alsoNot}}" },
            { "type": "meta", "content": "{{nope}}" }
        ]));
        assert!(vars.is_empty());
    }

    #[test]
    fn test_extractable_fields_table() {
        assert_eq!(extractable_fields(NodeKind::Html), &[] as &[Field]);
        assert_eq!(extractable_fields(NodeKind::Meta), &[Field::Title]);
        assert_eq!(
            extractable_fields(NodeKind::Img),
            extractable_fields(NodeKind::Image)
        );
        assert_eq!(extractable_fields(NodeKind::Channel), &[] as &[Field]);
    }

    #[test]
    fn test_directives() {
        let vars = extract(json!([
            { "type": "group", "if": "{{isVisible}}", "loop": "data.items", "elements": [] },
            { "type": "text", "content": "", "loop": "{{ orders }}" }
        ]));
        assert_eq!(vars, vec!["isVisible", "orders"]);
    }

    #[test]
    fn test_channel_raw_all_strings() {
        let vars = extract(json!([{
            "type": "channel",
            "channel": "push",
            "raw": {
                "title": "{{title}}",
                "text": "{{body}}",
                "futureKey": "{{future}}",
                "count": 3
            }
        }]));
        assert_eq!(vars, vec!["body", "future", "title"]);
    }

    #[test]
    fn test_locales() {
        let vars = extract(json!([{
            "type": "channel",
            "channel": "email",
            "locales": {
                "fr": {
                    "raw": { "subject": "{{fr.subject}}" },
                    "elements": [ { "type": "text", "content": "{{fr.body}}" } ]
                }
            },
            "elements": [{
                "type": "action",
                "content": "Go",
                "locales": {
                    "es": { "content": "{{es.content}}", "href": "{{es.href}}" },
                    "de": { "src": "{{de.src}}", "title": "{{de.title}}", "alt_text": "{{de.alt}}" }
                }
            }]
        }]));

        assert_eq!(
            vars,
            vec!["de.src", "de.title", "es.content", "es.href", "fr.body", "fr.subject"]
        );
    }

    #[test]
    fn test_deep_nesting() {
        let vars = extract(json!([{
            "type": "channel",
            "channel": "email",
            "elements": [{
                "type": "columns",
                "elements": [{
                    "type": "column",
                    "elements": [{
                        "type": "list",
                        "elements": [{
                            "type": "list-item",
                            "elements": [ { "type": "string", "content": "{{deep.value}}" } ]
                        }]
                    }]
                }]
            }]
        }]));
        assert_eq!(vars, vec!["deep.value"]);
    }

    #[test]
    fn test_opaque_nodes_contribute_directives_and_children() {
        let vars = extract(json!([
            { "type": "carousel", "if": "{{hasSlides}}", "elements": [ { "type": "text", "content": "{{slide}}" } ] },
            { "type": "text", "content": 12, "loop": "{{malformed}}" }
        ]));
        assert_eq!(vars, vec!["hasSlides", "malformed", "slide"]);
    }

    #[test]
    fn test_misshapen_directive_skips_only_that_property() {
        let vars = extract(json!([
            { "type": "text", "content": "Hi {{user.name}}", "if": true },
            { "type": "link", "href": "{{url}}", "locales": { "fr": "Bonjour" } }
        ]));
        assert_eq!(vars, vec!["url", "user.name"]);
    }

    #[test]
    fn test_misshapen_locale_overlay_fields() {
        let vars = extract(json!([{
            "type": "action",
            "content": "{{cta}}",
            "href": ["not", "a", "string"],
            "locales": {
                "fr": { "content": "{{fr.cta}}", "href": 3 },
                "de": 12
            }
        }]));
        assert_eq!(vars, vec!["cta", "fr.cta"]);
    }

    #[test]
    fn test_channel_with_misshapen_raw_keeps_children() {
        let vars = extract(json!([{
            "type": "channel",
            "channel": "sms",
            "raw": "legacy {{ignored}}",
            "if": "{{smsEnabled}}",
            "elements": [ { "type": "text", "content": "Code {{code}}" } ]
        }]));
        assert_eq!(vars, vec!["code", "smsEnabled"]);
    }
}
