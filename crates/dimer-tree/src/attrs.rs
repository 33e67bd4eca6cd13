//! Mapping of node props to element attributes.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::node::{CLASS_NAME_KEY, Props};

/// Element attributes, keyed by attribute name.
pub type Attrs = BTreeMap<String, Value>;

/// Prefix of props that map to `data-*` attributes.
const DATA_PREFIX: &str = "data";

/// Convert node props to element attributes.
///
/// - `className` is joined with single spaces into `class`
/// - `dataFooBar` becomes `data-foo-bar` (only when `data` is followed by an
///   uppercase letter)
/// - every other key passes through unchanged
///
/// # Examples
///
/// ```
/// use dimer_tree::{ContentNode, props_to_attrs};
/// use serde_json::json;
///
/// let node = ContentNode::element("div")
///     .with_class("a")
///     .with_class("b")
///     .with_prop("dataFoo", "x");
/// let attrs = props_to_attrs(&node.props);
/// assert_eq!(attrs["class"], json!("a b"));
/// assert_eq!(attrs["data-foo"], json!("x"));
/// ```
pub fn props_to_attrs(props: &Props) -> Attrs {
    props
        .iter()
        .map(|(key, value)| {
            if key == CLASS_NAME_KEY {
                ("class".to_owned(), Value::String(class_string(value)))
            } else if let Some(name) = data_attribute_name(key) {
                (name, value.clone())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

fn class_string(value: &Value) -> String {
    match value {
        Value::Array(classes) => classes
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(class) => class.clone(),
        _ => String::new(),
    }
}

/// Kebab-case `data-*` name for a camel-case `dataFoo` prop.
fn data_attribute_name(key: &str) -> Option<String> {
    let rest = key.strip_prefix(DATA_PREFIX)?;
    if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }

    let mut name = String::with_capacity(key.len() + 4);
    name.push_str(DATA_PREFIX);
    for c in rest.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    Some(name)
}
