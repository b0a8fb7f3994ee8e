//! Variable substitution for content previews

use serde_json::{Map, Value};

use super::codec::PLACEHOLDER_RE;
use super::error::{ContentError, ContentResult};
use super::extractor::{extractable_fields, LOCALE_FIELDS};
use super::node::{ElementalNode, Field, LocaleOverlay};
use super::validator::is_valid_variable_name;

/// Render a copy of `elements` with placeholders replaced by sample values.
///
/// Values are looked up by dot path in `variables`, which must be an object.
/// Placeholders that are invalid or have no value are left as written.
/// `html` content and `if`/`loop` directives are never rewritten.
pub fn render_preview(elements: &[ElementalNode], variables: &Value) -> ContentResult<Vec<ElementalNode>> {
    let Value::Object(vars) = variables else {
        return Err(ContentError::InvalidVariables);
    };

    let mut rendered = elements.to_vec();
    for node in &mut rendered {
        render_node(node, vars);
    }
    Ok(rendered)
}

fn render_node(node: &mut ElementalNode, vars: &Map<String, Value>) {
    for field in extractable_fields(node.kind()) {
        if let Some(text) = node.field_mut(*field) {
            *text = substitute_string(text, vars);
        }
    }

    if let ElementalNode::Channel(channel) = node {
        if let Some(raw) = &mut channel.raw {
            render_raw(raw, vars);
        }
    }

    let Some(base) = node.base_mut() else {
        return;
    };

    for overlay in base.overlays_mut() {
        render_locale(overlay, vars);
    }

    for child in base.elements.iter_mut().flatten() {
        render_node(child, vars);
    }
}

fn render_locale(overlay: &mut LocaleOverlay, vars: &Map<String, Value>) {
    for field in LOCALE_FIELDS {
        let value = match field {
            Field::Content => &mut overlay.content,
            Field::Href => &mut overlay.href,
            Field::Src => &mut overlay.src,
            Field::Title => &mut overlay.title,
            _ => continue,
        };
        if let Some(text) = value {
            *text = substitute_string(text, vars);
        }
    }

    if let Some(raw) = &mut overlay.raw {
        render_raw(raw, vars);
    }

    for child in overlay.elements.iter_mut().flatten() {
        render_node(child, vars);
    }
}

fn render_raw(raw: &mut Map<String, Value>, vars: &Map<String, Value>) {
    for value in raw.values_mut() {
        if let Value::String(text) = value {
            *text = substitute_string(text, vars);
        }
    }
}

fn substitute_string(template: &str, vars: &Map<String, Value>) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &regex::Captures| {
            let name = caps[1].trim();
            let resolved = is_valid_variable_name(name)
                .then(|| lookup(vars, name))
                .flatten();

            match resolved {
                Some(value) => format_value(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Resolve a dot path such as `user.profile.name`
fn lookup<'a>(vars: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = vars.get(segments.next()?)?;
    segments.try_fold(first, |value, segment| value.get(segment))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Arrays and objects render as JSON
        _ => value.to_string(),
    }
}
