use crate::{raw::Element, Result};
use indexmap::IndexMap;

/// A vocabulary annotation as found in the metadata.
///
/// Captured during phase 1 without interpreting the term. The value's shape
/// is only checked by the extension layer, so a malformed annotation never
/// prevents the schema from loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Term as written, e.g. `UI.LineItem` or
    /// `com.sap.vocabularies.UI.v1.LineItem`.
    pub term: String,

    pub qualifier: Option<String>,

    pub value: AnnotationValue,
}

/// An `<Annotations Target="...">` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotations {
    /// Target path, e.g. `NS.Order` or `NS.Order/id`.
    pub target: String,

    pub qualifier: Option<String>,

    pub annotations: Vec<Annotation>,
}

/// Annotation expressions. Scalars keep their source text; consumers parse
/// them on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    Null,
    String(String),
    Bool(String),
    Int(String),
    Decimal(String),
    EnumMember(String),
    Path(String),
    PropertyPath(String),
    NavigationPropertyPath(String),
    AnnotationPath(String),
    Record(Record),
    Collection(Vec<AnnotationValue>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    /// Explicit record type, e.g. `UI.DataField`.
    pub ty: Option<String>,

    pub properties: IndexMap<String, AnnotationValue>,
}

/// Scalar expression kinds, tried in this order for both the attribute and
/// the element notation.
const SCALARS: &[(&str, fn(String) -> AnnotationValue)] = &[
    ("String", AnnotationValue::String),
    ("Bool", AnnotationValue::Bool),
    ("Int", AnnotationValue::Int),
    ("Decimal", AnnotationValue::Decimal),
    ("EnumMember", AnnotationValue::EnumMember),
    ("Path", AnnotationValue::Path),
    ("PropertyPath", AnnotationValue::PropertyPath),
    ("NavigationPropertyPath", AnnotationValue::NavigationPropertyPath),
    ("AnnotationPath", AnnotationValue::AnnotationPath),
];

impl Annotation {
    pub(crate) fn from_raw(raw: &Element) -> Result<Self> {
        Ok(Self {
            term: raw.require_attr("Term", "Annotation")?.to_string(),
            qualifier: raw.attr("Qualifier").map(str::to_string),
            value: AnnotationValue::from_raw(raw),
        })
    }

    /// Reads all `Annotation` children of `raw`.
    pub(crate) fn all_from_raw(raw: &Element) -> Result<Vec<Self>> {
        raw.children("Annotation").map(Self::from_raw).collect()
    }
}

impl Annotations {
    pub(crate) fn from_raw(raw: &Element) -> Result<Self> {
        Ok(Self {
            target: raw.require_attr("Target", "Annotations")?.to_string(),
            qualifier: raw.attr("Qualifier").map(str::to_string),
            annotations: Annotation::all_from_raw(raw)?,
        })
    }
}

impl AnnotationValue {
    /// Reads the expression carried by an `Annotation` or `PropertyValue`
    /// element. Elements without an expression yield `Null`; a bare
    /// annotation such as `<Annotation Term="Core.Computed"/>` means `true`
    /// and is interpreted by [`AnnotationValue::as_bool`].
    fn from_raw(raw: &Element) -> Self {
        for (name, ctor) in SCALARS {
            if let Some(value) = raw.attr(name) {
                return ctor(value.to_string());
            }
        }

        if let Some(record) = raw.child("Record") {
            return Self::Record(Record::from_raw(record));
        }

        if let Some(collection) = raw.child("Collection") {
            return Self::Collection(Self::collection_from_raw(collection));
        }

        for (name, ctor) in SCALARS {
            if let Some(value) = raw.child(name) {
                return ctor(value.text().unwrap_or_default().to_string());
            }
        }

        Self::Null
    }

    /// Items keep their document order; elements that are neither a record
    /// nor a scalar are skipped.
    fn collection_from_raw(raw: &Element) -> Vec<Self> {
        raw.elements()
            .filter_map(|(name, item)| match name {
                "Record" => Some(Self::Record(Record::from_raw(item))),
                _ => SCALARS
                    .iter()
                    .find(|(scalar, _)| *scalar == name)
                    .map(|(_, ctor)| ctor(item.text().unwrap_or_default().to_string())),
            })
            .collect()
    }

    /// Reads the value as a boolean. `Null` (a bare tagging annotation)
    /// counts as `true`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Null => Some(true),
            Self::Bool(value) => crate::raw::parse_bool(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => value.parse().ok(),
            _ => None,
        }
    }

    /// The text of a string-like scalar (string, enum member or any path).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value)
            | Self::EnumMember(value)
            | Self::Path(value)
            | Self::PropertyPath(value)
            | Self::NavigationPropertyPath(value)
            | Self::AnnotationPath(value) => Some(value),
            _ => None,
        }
    }

    /// The text of a path expression of any flavor.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(value)
            | Self::PropertyPath(value)
            | Self::NavigationPropertyPath(value)
            | Self::AnnotationPath(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[AnnotationValue]> {
        match self {
            Self::Collection(items) => Some(items),
            _ => None,
        }
    }

    /// Short description used in annotation shape errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "no value",
            Self::String(_) => "a string",
            Self::Bool(_) => "a boolean",
            Self::Int(_) => "an integer",
            Self::Decimal(_) => "a decimal",
            Self::EnumMember(_) => "an enum member",
            Self::Path(_) => "a path",
            Self::PropertyPath(_) => "a property path",
            Self::NavigationPropertyPath(_) => "a navigation property path",
            Self::AnnotationPath(_) => "an annotation path",
            Self::Record(_) => "a record",
            Self::Collection(_) => "a collection",
        }
    }
}

impl Record {
    fn from_raw(raw: &Element) -> Self {
        let properties = raw
            .children("PropertyValue")
            .filter_map(|value| {
                let name = value.attr("Property")?;
                Some((name.to_string(), AnnotationValue::from_raw(value)))
            })
            .collect();

        Self {
            ty: raw.attr("Type").map(str::to_string),
            properties,
        }
    }

    pub fn get(&self, property: &str) -> Option<&AnnotationValue> {
        self.properties.get(property)
    }

    pub fn has(&self, property: &str) -> bool {
        self.properties.contains_key(property)
    }

    /// The unqualified record type, e.g. `DataFieldWithUrl` for
    /// `com.sap.vocabularies.UI.v1.DataFieldWithUrl`.
    pub fn type_name(&self) -> Option<&str> {
        let ty = self.ty.as_deref()?;
        Some(ty.rsplit_once('.').map(|(_, name)| name).unwrap_or(ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn annotation(value: serde_json::Value) -> Annotation {
        Annotation::from_raw(&Element::from_json(&value).unwrap()).unwrap()
    }

    #[test]
    fn attribute_scalar() {
        let a = annotation(json!({ "$": { "Term": "Common.Label", "String": "Order" } }));
        assert_eq!(a.term, "Common.Label");
        assert_eq!(a.value, AnnotationValue::String("Order".into()));
    }

    #[test]
    fn element_scalar() {
        let a = annotation(json!({ "$": { "Term": "Common.Text" }, "Path": ["description"] }));
        assert_eq!(a.value.as_path(), Some("description"));
    }

    #[test]
    fn tagging_annotation_is_true() {
        let a = annotation(json!({ "$": { "Term": "Core.Computed" } }));
        assert_eq!(a.value, AnnotationValue::Null);
        assert_eq!(a.value.as_bool(), Some(true));
    }

    #[test]
    fn record_and_collection() {
        let a = annotation(json!({
            "$": { "Term": "UI.LineItem", "Qualifier": "Short" },
            "Collection": [{
                "Record": [
                    { "$": { "Type": "UI.DataField" },
                      "PropertyValue": [{ "$": { "Property": "Value", "Path": "id" } }] },
                    { "PropertyValue": [
                        { "$": { "Property": "Value", "Path": "name" } },
                        { "$": { "Property": "Url", "Path": "link" } },
                    ] },
                ],
            }],
        }));

        assert_eq!(a.qualifier.as_deref(), Some("Short"));
        let items = a.value.as_collection().unwrap();
        assert_eq!(items.len(), 2);

        let first = items[0].as_record().unwrap();
        assert_eq!(first.type_name(), Some("DataField"));
        assert_eq!(first.get("Value").and_then(AnnotationValue::as_path), Some("id"));

        let second = items[1].as_record().unwrap();
        assert!(second.ty.is_none());
        assert!(second.has("Url"));
    }

    #[test]
    fn mixed_collection_keeps_document_order() {
        let a = annotation(json!({
            "$": { "Term": "UI.SelectionFields" },
            "Collection": [{
                "$$": [
                    { "#name": "PropertyPath", "_": "status" },
                    { "#name": "Record", "$": { "Type": "UI.DataField" } },
                    { "#name": "String", "_": "note" },
                    { "#name": "Record" },
                ],
            }],
        }));

        let items = a.value.as_collection().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], AnnotationValue::PropertyPath("status".into()));
        assert_eq!(items[1].as_record().unwrap().type_name(), Some("DataField"));
        assert_eq!(items[2], AnnotationValue::String("note".into()));
        assert!(items[3].as_record().unwrap().ty.is_none());
    }

    #[test]
    fn missing_term_is_invalid_metadata() {
        let raw = Element::from_json(&json!({ "$": {} })).unwrap();
        let err = Annotation::from_raw(&raw).unwrap_err();
        assert!(err.is_invalid_metadata());
    }
}
