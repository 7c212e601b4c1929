use super::{
    Cx, EntitySetAnnotations, EntityTypeExtender, Extender, PropertyAnnotations, ValueListKind,
};
use crate::{
    raw::parse_bool,
    schema::{Dialect, Graph, Property, TypeId},
    Error, Result,
};
use indexmap::IndexMap;

/// Extender for SAP flavored OData V2 documents.
///
/// Runs the shared vocabulary pass, then applies the `sap:` attributes
/// found on entity types, properties and entity sets. An attribute wins
/// over a vocabulary annotation carrying the same information.
#[derive(Debug, Default, Clone, Copy)]
pub struct SapExtender;

const PROPERTY_FLAGS: &[&str] = &[
    "creatable",
    "updatable",
    "filterable",
    "sortable",
    "required-in-filter",
];

const ENTITY_SET_FLAGS: &[&str] = &[
    "creatable",
    "updatable",
    "deletable",
    "searchable",
    "pageable",
    "addressable",
    "requires-filter",
];

impl Extender for SapExtender {
    fn dialect(&self) -> Dialect {
        Dialect::Sap
    }

    fn apply(&self, cx: &mut Cx<'_>) -> Result<()> {
        EntityTypeExtender::new(cx)?.apply(cx)?;

        let graph = cx.graph;
        let schema = cx.schema;

        for entity in schema.entity_types() {
            let attrs = &entity.vendor_attrs;
            let bag = cx.extensions.entity_type_mut(entity.id);
            set_string(&mut bag.label, attrs, "label");
            set_string(&mut bag.semantics, attrs, "semantics");
            set_string(&mut bag.content_version, attrs, "content-version");

            // Declared properties, then the ones inherited from base types.
            let prefix = schema.qualified_name(&entity.name);
            for base in graph.base_types(entity.id) {
                for property in &base.properties {
                    let target = format!("{prefix}/{}", property.name);
                    apply_property(cx, entity.id, property, &target)?;
                }
            }
        }

        for container in schema.entity_containers() {
            for set in &container.entity_sets {
                let target = format!("{}/{}", schema.qualified_name(&container.name), set.name);
                let attrs = &set.vendor_attrs;

                set_string(&mut cx.extensions.entity_set_mut(set.id).label, attrs, "label");

                for name in ENTITY_SET_FLAGS {
                    if let Some(value) = flag(cx, attrs, name, &target)? {
                        let bag = cx.extensions.entity_set_mut(set.id);
                        if let Some(slot) = entity_set_flag(bag, name) {
                            *slot = value;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Applies the attributes of `property` to the bag `owner` sees.
fn apply_property(
    cx: &mut Cx<'_>,
    owner: TypeId,
    property: &Property,
    target: &str,
) -> Result<()> {
    let (attrs, id) = (&property.vendor_attrs, property.id);
    let bag = cx.extensions.property_of_mut(owner, id);
    set_string(&mut bag.label, attrs, "label");
    set_string(&mut bag.heading, attrs, "heading");
    set_string(&mut bag.quickinfo, attrs, "quickinfo");
    set_string(&mut bag.text, attrs, "text");
    set_string(&mut bag.unit, attrs, "unit");
    set_string(&mut bag.display_format, attrs, "display-format");
    set_string(&mut bag.semantics, attrs, "semantics");
    set_string(&mut bag.filter_restriction, attrs, "filter-restriction");

    for name in PROPERTY_FLAGS {
        if let Some(value) = flag(cx, attrs, name, target)? {
            if let Some(slot) = property_flag(cx.extensions.property_of_mut(owner, id), name) {
                *slot = value;
            }
        }
    }

    if let Some(value) = attrs.get("value-list") {
        let kind = match value.as_str() {
            "standard" => Some(ValueListKind::Standard),
            "fixed-values" => Some(ValueListKind::FixedValues),
            other => {
                cx.report(
                    target,
                    Error::annotation_shape(
                        "sap:value-list",
                        format!("`{other}` is neither `standard` nor `fixed-values`"),
                    ),
                )?;
                None
            }
        };

        if kind.is_some() {
            cx.extensions.property_of_mut(owner, id).value_list = kind;
        }
    }

    Ok(())
}

fn set_string(slot: &mut Option<String>, attrs: &IndexMap<String, String>, name: &str) {
    if let Some(value) = attrs.get(name) {
        *slot = Some(value.clone());
    }
}

/// Reads a boolean `sap:` attribute. A value that is not a boolean is
/// reported and the default kept.
fn flag(
    cx: &mut Cx<'_>,
    attrs: &IndexMap<String, String>,
    name: &str,
    target: &str,
) -> Result<Option<bool>> {
    let Some(value) = attrs.get(name) else {
        return Ok(None);
    };

    match parse_bool(value) {
        Some(value) => Ok(Some(value)),
        None => {
            cx.report(
                target,
                Error::annotation_shape(
                    format!("sap:{name}"),
                    format!("`{value}` is not a boolean"),
                ),
            )?;
            Ok(None)
        }
    }
}

fn property_flag<'b>(bag: &'b mut PropertyAnnotations, name: &str) -> Option<&'b mut bool> {
    Some(match name {
        "creatable" => &mut bag.creatable,
        "updatable" => &mut bag.updatable,
        "filterable" => &mut bag.filterable,
        "sortable" => &mut bag.sortable,
        "required-in-filter" => &mut bag.required_in_filter,
        _ => return None,
    })
}

fn entity_set_flag<'b>(bag: &'b mut EntitySetAnnotations, name: &str) -> Option<&'b mut bool> {
    Some(match name {
        "creatable" => &mut bag.creatable,
        "updatable" => &mut bag.updatable,
        "deletable" => &mut bag.deletable,
        "searchable" => &mut bag.searchable,
        "pageable" => &mut bag.pageable,
        "addressable" => &mut bag.addressable,
        "requires-filter" => &mut bag.requires_filter,
        _ => return None,
    })
}
