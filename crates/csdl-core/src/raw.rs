//! Raw metadata tree.
//!
//! The XML parser collaborator hands over metadata in the usual XML-to-JSON
//! convention: the attributes of an element live under the `"$"` key, text
//! content under `"_"`, and every other key names child elements holding an
//! array of child objects. [`Element`] is an owned, immutable view of that
//! tree with the handful of accessors the schema builder needs.
//!
//! Grouping children by name loses their relative order. Parsers that keep
//! it emit an ordered `"$$"` array instead, each child naming itself under
//! `"#name"`; when present it replaces the grouped keys.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;

/// Key holding an element's attributes.
pub const ATTRIBUTES_KEY: &str = "$";

/// Key holding an element's text content.
pub const TEXT_KEY: &str = "_";

/// Key holding an element's children in document order.
pub const CHILDREN_KEY: &str = "$$";

/// Key holding the element name of an entry of [`CHILDREN_KEY`].
pub const NAME_KEY: &str = "#name";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Attributes by their full (possibly prefixed) name, e.g. `sap:label`.
    attrs: IndexMap<String, String>,

    /// Child elements keyed by local name (`edmx:DataServices` is stored as
    /// `DataServices`).
    children: IndexMap<String, Vec<Element>>,

    /// Document order of the children, as (local name, index within name).
    order: Vec<(String, usize)>,

    text: Option<String>,
}

impl Element {
    pub fn from_json(value: &Value) -> Result<Element> {
        match value {
            Value::Object(map) => {
                let mut element = Element::default();
                let ordered = map.get(CHILDREN_KEY);

                for (key, value) in map {
                    match key.as_str() {
                        ATTRIBUTES_KEY => element.attrs = convert_attrs(value)?,
                        TEXT_KEY => element.text = Some(scalar_to_string(value, key)?),
                        NAME_KEY => {}
                        CHILDREN_KEY => element.push_ordered(value)?,
                        _ if ordered.is_some() => {}
                        _ => {
                            for child in convert_children(value, key)? {
                                element.push_child(key, child);
                            }
                        }
                    }
                }

                Ok(element)
            }
            Value::String(text) => Ok(Element {
                text: Some(text.clone()),
                ..Element::default()
            }),
            other => Err(Error::invalid_metadata(format!(
                "expected an element object, found {}",
                json_kind(other)
            ))),
        }
    }

    /// Parses a JSON document into an element tree.
    pub fn parse_json(src: &str) -> Result<Element> {
        let value: Value = serde_json::from_str(src)?;
        Element::from_json(&value)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Returns the attribute or an `invalid_metadata` error naming `what`.
    pub fn require_attr(&self, name: &str, what: &str) -> Result<&str> {
        self.attr(name).ok_or_else(|| {
            Error::invalid_metadata(format!("{what} is missing required attribute `{name}`"))
        })
    }

    /// Reads a boolean attribute (`true`/`false`).
    pub fn bool_attr(&self, name: &str) -> Result<Option<bool>> {
        match self.attr(name) {
            None => Ok(None),
            Some(value) => parse_bool(value).map(Some).ok_or_else(|| {
                Error::invalid_metadata(format!(
                    "attribute `{name}` must be `true` or `false`, found `{value}`"
                ))
            }),
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attributes in the `prefix:` namespace, keyed by their local name.
    pub fn vendor_attrs(&self, prefix: &str) -> IndexMap<String, String> {
        self.attrs
            .iter()
            .filter_map(|(name, value)| {
                let (ns, local) = name.split_once(':')?;
                (ns == prefix).then(|| (local.to_string(), value.clone()))
            })
            .collect()
    }

    pub fn children<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children(name).next()
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.children.get(name).is_some_and(|c| !c.is_empty())
    }

    /// Every child with its local name, in document order.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &Element)> + '_ {
        self.order
            .iter()
            .map(|(name, index)| (name.as_str(), &self.children[name.as_str()][*index]))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn push_child(&mut self, name: &str, child: Element) {
        let name = local_name(name);
        let siblings = self.children.entry(name.to_string()).or_default();

        self.order.push((name.to_string(), siblings.len()));
        siblings.push(child);
    }

    fn push_ordered(&mut self, value: &Value) -> Result<()> {
        let Value::Array(items) = value else {
            return Err(Error::invalid_metadata(format!(
                "`{CHILDREN_KEY}` must be an array of elements, found {}",
                json_kind(value)
            )));
        };

        for item in items {
            let name = item.get(NAME_KEY).and_then(Value::as_str).ok_or_else(|| {
                Error::invalid_metadata(format!("ordered child is missing `{NAME_KEY}`"))
            })?;

            self.push_child(name, Element::from_json(item)?);
        }

        Ok(())
    }
}

impl<'de> serde::Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Element::from_json(&value).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

fn convert_attrs(value: &Value) -> Result<IndexMap<String, String>> {
    let Value::Object(map) = value else {
        return Err(Error::invalid_metadata(format!(
            "attribute block must be an object, found {}",
            json_kind(value)
        )));
    };

    map.iter()
        .map(|(name, value)| Ok((name.clone(), scalar_to_string(value, name)?)))
        .collect()
}

fn convert_children(value: &Value, key: &str) -> Result<Vec<Element>> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(Element::from_json)
            .collect(),
        Value::Null => Ok(vec![]),
        Value::Object(_) | Value::String(_) => Ok(vec![Element::from_json(value)?]),
        other => Err(Error::invalid_metadata(format!(
            "child `{key}` must be an element or list of elements, found {}",
            json_kind(other)
        ))),
    }
}

fn scalar_to_string(value: &Value, key: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::invalid_metadata(format!(
            "`{key}` must be a scalar, found {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
