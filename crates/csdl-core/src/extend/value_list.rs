use crate::{
    schema::{
        Annotation, AnnotationValue, EntitySetId, EntityType, Graph, PathTarget, Property,
        PropertyId, Record,
    },
    Error, Result,
};

/// A decoded `Common.ValueList` annotation on a property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueListType {
    pub qualifier: Option<String>,

    /// Entity set (or path) providing the values.
    pub collection_path: String,

    /// Service root of the value list, when it lives in another service.
    pub collection_root: Option<String>,

    /// The entity set `collection_path` names, when it lives in the
    /// document's default container.
    pub entity_set: Option<EntitySetId>,

    pub label: Option<String>,

    pub search_supported: Option<bool>,

    pub parameters: Vec<ValueListParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueListParameter {
    pub kind: ParameterKind,

    /// The local property the parameter binds to. `None` for display-only
    /// and constant parameters without one.
    pub local_data_property: Option<PropertyId>,

    /// Property of the value list entity.
    pub value_list_property: String,

    /// Fixed value of a `Constant` parameter.
    pub constant: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    In,
    Out,
    InOut,
    DisplayOnly,
    Constant,
}

impl ParameterKind {
    fn from_record_type(name: &str) -> Option<Self> {
        Some(match name {
            "ValueListParameterIn" => Self::In,
            "ValueListParameterOut" => Self::Out,
            "ValueListParameterInOut" => Self::InOut,
            "ValueListParameterDisplayOnly" => Self::DisplayOnly,
            "ValueListParameterConstant" => Self::Constant,
            _ => return None,
        })
    }

    /// Whether the parameter has to name a local property.
    pub fn is_bound(self) -> bool {
        matches!(self, Self::In | Self::Out | Self::InOut)
    }
}

impl ValueListType {
    /// Decodes `annotation` found on `property` of `owner`.
    pub fn from_annotation(
        annotation: &Annotation,
        property: &Property,
        owner: &EntityType,
        schema: &(impl Graph + ?Sized),
    ) -> Result<ValueListType> {
        let term = annotation.term.as_str();
        let record = annotation.value.as_record().ok_or_else(|| {
            Error::annotation_shape(
                term,
                format!("expected a record, found {}", annotation.value.kind_name()),
            )
        })?;

        let collection_path = string(record, term, "CollectionPath")?.ok_or_else(|| {
            Error::annotation_shape(term, "missing required property `CollectionPath`")
        })?;
        let collection_root = string(record, term, "CollectionRoot")?;

        // Value lists served by another service are not resolved.
        let entity_set = match &collection_root {
            Some(_) => None,
            None => schema
                .default_entity_container()
                .and_then(|container| container.entity_set(&collection_path))
                .map(|set| set.id),
        };

        let search_supported = match record.get("SearchSupported") {
            None => None,
            Some(value) => Some(value.as_bool().ok_or_else(|| {
                Error::annotation_shape(
                    term,
                    format!("`SearchSupported` must be a boolean, found {}", value.kind_name()),
                )
            })?),
        };

        let parameters = match record.get("Parameters") {
            None => vec![],
            Some(value) => {
                let items = value.as_collection().ok_or_else(|| {
                    Error::annotation_shape(
                        term,
                        format!("`Parameters` must be a collection, found {}", value.kind_name()),
                    )
                })?;

                items
                    .iter()
                    .map(|item| parameter(item, owner, entity_set, schema, term))
                    .collect::<Result<_>>()?
            }
        };

        tracing::trace!(
            property = %property.name,
            collection_path = %collection_path,
            "decoded value list"
        );

        Ok(ValueListType {
            qualifier: annotation.qualifier.clone(),
            collection_path,
            collection_root,
            entity_set,
            label: string(record, term, "Label")?,
            search_supported,
            parameters,
        })
    }

    /// Parameters bound to local properties.
    pub fn bound_parameters(&self) -> impl Iterator<Item = &ValueListParameter> + '_ {
        self.parameters
            .iter()
            .filter(|parameter| parameter.local_data_property.is_some())
    }
}

fn parameter(
    item: &AnnotationValue,
    owner: &EntityType,
    entity_set: Option<EntitySetId>,
    schema: &(impl Graph + ?Sized),
    term: &str,
) -> Result<ValueListParameter> {
    let record = item.as_record().ok_or_else(|| {
        Error::annotation_shape(
            term,
            format!("value list parameters must be records, found {}", item.kind_name()),
        )
    })?;

    let kind = record
        .type_name()
        .and_then(ParameterKind::from_record_type)
        .ok_or_else(|| {
            Error::annotation_shape(
                term,
                format!(
                    "unknown value list parameter type `{}`",
                    record.ty.as_deref().unwrap_or("<none>")
                ),
            )
        })?;

    let value_list_property = string(record, term, "ValueListProperty")?.ok_or_else(|| {
        Error::annotation_shape(term, "parameter is missing `ValueListProperty`")
    })?;

    if let Some(set) = entity_set {
        let list_type = schema.entity_set(set).entity_type;
        if schema.resolve_path(list_type, &value_list_property).is_none() {
            return Err(Error::annotation_shape(
                term,
                format!(
                    "`{value_list_property}` is not a property of `{}`",
                    schema.entity_type(list_type).name
                ),
            ));
        }
    }

    let local_data_property = match string(record, term, "LocalDataProperty")? {
        None if kind.is_bound() => {
            return Err(Error::annotation_shape(
                term,
                "parameter is missing `LocalDataProperty`",
            ))
        }
        None => None,
        Some(path) => match schema.resolve_path(owner.id, &path) {
            Some(PathTarget::Property(id)) => Some(id),
            _ => {
                return Err(Error::annotation_shape(
                    term,
                    format!("`{path}` is not a property of `{}`", owner.name),
                ))
            }
        },
    };

    let constant = string(record, term, "Constant")?;
    if kind == ParameterKind::Constant && constant.is_none() {
        return Err(Error::annotation_shape(
            term,
            "constant parameter is missing `Constant`",
        ));
    }

    Ok(ValueListParameter {
        kind,
        local_data_property,
        value_list_property,
        constant,
    })
}

fn string(record: &Record, term: &str, name: &str) -> Result<Option<String>> {
    match record.get(name) {
        None => Ok(None),
        Some(value) => value.as_str().map(|text| Some(text.to_string())).ok_or_else(|| {
            Error::annotation_shape(
                term,
                format!("`{name}` must be a string or path, found {}", value.kind_name()),
            )
        }),
    }
}
