// src/utils/xml.rs

//! Native XML to JSON conversion.
//!
//! Produces the same shape as `yq -p=xml -o=json`, which the stored entry
//! files already use: attributes become `+@name` keys, text inside an
//! element that also has attributes or children becomes `+content`, and
//! repeated sibling elements collapse into arrays. All scalar values stay
//! strings.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::{AppError, Result};

/// Partially-built element, kept on a stack while its subtree is read.
#[derive(Default)]
struct Node {
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<(String, Value)>,
}

/// Convert an XML document into a JSON value.
///
/// The result is a single-key object `{root_name: ...}`.
pub fn xml_to_json(input: &str) -> Result<Value> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<(String, Node)> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let named = read_start(&start)?;
                stack.push(named);
            }
            Event::Empty(start) => {
                let (name, node) = read_start(&start)?;
                attach(&mut stack, &mut root, name, node_into_value(node))?;
            }
            Event::Text(text) => {
                if let Some((_, node)) = stack.last_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| AppError::validation(format!("bad XML text: {e}")))?;
                    node.text.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some((_, node)) = stack.last_mut() {
                    node.text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::End(_) => {
                let (name, node) = stack
                    .pop()
                    .ok_or_else(|| AppError::validation("unbalanced XML end tag"))?;
                attach(&mut stack, &mut root, name, node_into_value(node))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let (name, value) = root.ok_or_else(|| AppError::validation("empty XML document"))?;
    let mut map = Map::new();
    map.insert(name, value);
    Ok(Value::Object(map))
}

/// Normalize XML's scalar collapse: a single child deserializes as a bare
/// value instead of a one-element list. Arrays pass through, nulls (empty
/// elements) disappear.
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn read_start(start: &BytesStart<'_>) -> Result<(String, Node)> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = Node::default();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| AppError::validation(format!("bad XML attribute: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| AppError::validation(format!("bad XML attribute value: {e}")))?
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok((name, node))
}

fn node_into_value(node: Node) -> Value {
    let text = node.text.trim().to_string();

    if node.attrs.is_empty() && node.children.is_empty() {
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text)
        };
    }

    let mut map = Map::new();
    for (key, value) in node.attrs {
        map.insert(format!("+@{key}"), Value::String(value));
    }
    for (name, value) in node.children {
        match map.get_mut(&name) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(name, value);
            }
        }
    }
    if !text.is_empty() {
        map.insert("+content".to_string(), Value::String(text));
    }
    Value::Object(map)
}

fn attach(
    stack: &mut [(String, Node)],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> Result<()> {
    if let Some((_, parent)) = stack.last_mut() {
        parent.children.push((name, value));
        return Ok(());
    }
    if root.is_some() {
        return Err(AppError::validation("multiple XML root elements"));
    }
    *root = Some((name, value));
    Ok(())
}
