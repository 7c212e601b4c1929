use super::{
    Cx, DataField, HeaderInfo, SideEffectsType, Term, ValueListKind, ValueListType, Vocabulary,
};
use crate::{
    schema::{
        Annotation, AnnotationValue, EntitySetId, EntityType, Graph, Property, PropertyId,
        QualifiedName, Record, Schema, SchemaId, Type, TypeId,
    },
    Error, Result,
};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Decodes the Common, UI, Core, Capabilities and Measures annotations of
/// every entity type, property and entity set. Both dialects run it before
/// their own additions.
#[derive(Debug)]
pub struct EntityTypeExtender<'a> {
    index: AnnotationIndex<'a>,
}

/// Annotations of a document grouped by the element they apply to, inline
/// and external ones together.
#[derive(Debug, Default)]
struct AnnotationIndex<'a> {
    types: IndexMap<TypeId, Vec<Cow<'a, Annotation>>>,

    /// Keyed by the entity type the property is seen from and the property.
    /// A property targeted through a derived type is keyed by that type.
    properties: IndexMap<(TypeId, PropertyId), Vec<Cow<'a, Annotation>>>,

    entity_sets: IndexMap<EntitySetId, Vec<Cow<'a, Annotation>>>,
}

/// What an `Annotations` target names.
enum Target {
    Type(TypeId),
    Property { owner: TypeId, property: PropertyId },
    EntitySet(EntitySetId),
    /// Resolves, but to an element nothing here decodes.
    Ignored,
    Unresolved,
}

impl<'a> EntityTypeExtender<'a> {
    pub fn new(cx: &mut Cx<'a>) -> Result<Self> {
        Ok(Self {
            index: AnnotationIndex::build(cx)?,
        })
    }

    pub fn apply(&self, cx: &mut Cx<'a>) -> Result<()> {
        let schema = cx.schema;

        for entity in schema.entity_types() {
            let target = schema.qualified_name(&entity.name);
            cx.extensions.entity_type_mut(entity.id);

            for annotation in lookup(&self.index.types, &entity.id) {
                cx.isolate(&target, |cx| entity_annotation(cx, entity, annotation, &target))?;
            }

            for property in &entity.properties {
                let target = format!("{target}/{}", property.name);
                cx.extensions.property_mut(property.id);
                self.property_annotations(cx, entity.id, entity.id, property, &target)?;
            }
        }

        self.apply_inherited(cx)?;

        for container in schema.entity_containers() {
            for set in &container.entity_sets {
                let target = format!("{}/{}", schema.qualified_name(&container.name), set.name);
                cx.extensions.entity_set_mut(set.id);

                for annotation in lookup(&self.index.entity_sets, &set.id) {
                    cx.isolate(&target, |cx| entity_set_annotation(cx, set.id, annotation))?;
                }
            }
        }

        Ok(())
    }

    /// Gives every derived entity type a bag of its own for each property it
    /// inherits. The bag starts as the parent's view of the property, then
    /// takes the annotations targeting the property through the derived
    /// type.
    fn apply_inherited(&self, cx: &mut Cx<'a>) -> Result<()> {
        let graph = cx.graph;
        let schema = cx.schema;

        // Parents first, so their bags are complete once copied.
        let mut derived: Vec<_> = schema
            .entity_types()
            .filter_map(|entity| Some((entity, entity.base_type?)))
            .collect();
        derived.sort_by_key(|(entity, _)| graph.base_types(entity.id).count());

        for (entity, parent) in derived {
            let prefix = schema.qualified_name(&entity.name);

            for base in graph.base_types(parent) {
                for property in &base.properties {
                    let target = format!("{prefix}/{}", property.name);

                    match cx.extensions.property_of(parent, property.id) {
                        Some(bag) => {
                            let bag = bag.clone();
                            cx.extensions.inherited.insert((entity.id, property.id), bag);
                        }
                        None => {
                            // The parent belongs to another schema and its
                            // bags to that schema's table. Rebuild its view.
                            cx.extensions.property_of_mut(entity.id, property.id);

                            let mut chain = vec![];
                            for ty in graph.base_types(parent) {
                                chain.push(ty.id);
                                if ty.id == property.id.ty {
                                    break;
                                }
                            }

                            for through in chain.into_iter().rev() {
                                self.property_annotations(
                                    cx,
                                    entity.id,
                                    through,
                                    property,
                                    &target,
                                )?;
                            }
                        }
                    }

                    self.property_annotations(cx, entity.id, entity.id, property, &target)?;
                }
            }
        }

        Ok(())
    }

    /// Applies the annotations targeting `property` through the entity type
    /// `through` to the bag `owner` sees.
    fn property_annotations(
        &self,
        cx: &mut Cx<'a>,
        owner: TypeId,
        through: TypeId,
        property: &Property,
        target: &str,
    ) -> Result<()> {
        let entity = cx.graph.entity_type(owner);

        for annotation in lookup(&self.index.properties, &(through, property.id)) {
            cx.isolate(target, |cx| property_annotation(cx, entity, property, annotation))?;
        }

        Ok(())
    }
}

fn entity_annotation(
    cx: &mut Cx<'_>,
    entity: &EntityType,
    annotation: &Annotation,
    target: &str,
) -> Result<()> {
    let schema = cx.schema;
    let term = Term::resolve(&annotation.term, schema);

    match (term.vocabulary, term.name) {
        (Vocabulary::Common, "Label") => {
            cx.extensions.entity_type_mut(entity.id).label = Some(string(annotation)?);
        }
        (Vocabulary::Common, "SideEffects") => {
            let side_effects = SideEffectsType::from_annotation(annotation, entity, cx.graph)?;
            cx.extensions
                .entity_type_mut(entity.id)
                .side_effects
                .insert(annotation.qualifier.clone(), side_effects);
        }
        (Vocabulary::UI, "LineItem") => {
            if !cx.settings.line_item {
                return Ok(());
            }

            let items = annotation.value.as_collection().ok_or_else(|| {
                Error::annotation_shape(
                    &annotation.term,
                    format!("expected a collection, found {}", annotation.value.kind_name()),
                )
            })?;

            // A malformed record only drops that record.
            let mut fields = Vec::with_capacity(items.len());
            for item in items {
                match DataField::from_value(item, &annotation.term) {
                    Ok(field) => fields.push(field),
                    Err(err) if cx.settings.strict => return Err(err),
                    Err(err) => cx.report(target, err)?,
                }
            }

            cx.extensions
                .entity_type_mut(entity.id)
                .line_items
                .insert(annotation.qualifier.clone(), fields);
        }
        (Vocabulary::UI, "HeaderInfo") => {
            let header_info = header_info(annotation)?;
            cx.extensions.entity_type_mut(entity.id).header_info = Some(header_info);
        }
        _ => other_term(&mut cx.extensions.entity_type_mut(entity.id).other_terms, annotation),
    }

    Ok(())
}

fn property_annotation(
    cx: &mut Cx<'_>,
    entity: &EntityType,
    property: &Property,
    annotation: &Annotation,
) -> Result<()> {
    let term = Term::resolve(&annotation.term, cx.schema);
    let (owner, id) = (entity.id, property.id);

    match (term.vocabulary, term.name) {
        (Vocabulary::Common, "Label") => {
            cx.extensions.property_of_mut(owner, id).label = Some(string(annotation)?);
        }
        (Vocabulary::Common, "Text") => {
            cx.extensions.property_of_mut(owner, id).text = Some(path(annotation)?);
        }
        (Vocabulary::Common, "ValueList") => {
            let value_list =
                ValueListType::from_annotation(annotation, property, entity, cx.graph)?;
            let bag = cx.extensions.property_of_mut(owner, id);
            bag.value_list.get_or_insert(ValueListKind::Standard);
            bag.value_lists.insert(annotation.qualifier.clone(), value_list);
        }
        (Vocabulary::Common, "ValueListWithFixedValues") => {
            if boolean(annotation)? {
                let bag = cx.extensions.property_of_mut(owner, id);
                bag.value_list = Some(ValueListKind::FixedValues);
            }
        }
        (Vocabulary::Core, "Computed") => {
            cx.extensions.property_of_mut(owner, id).computed = boolean(annotation)?;
        }
        (Vocabulary::Core, "Immutable") => {
            cx.extensions.property_of_mut(owner, id).immutable = boolean(annotation)?;
        }
        (Vocabulary::Measures, "Unit" | "ISOCurrency") => {
            cx.extensions.property_of_mut(owner, id).unit = Some(path(annotation)?);
        }
        _ => other_term(&mut cx.extensions.property_of_mut(owner, id).other_terms, annotation),
    }

    Ok(())
}

fn entity_set_annotation(cx: &mut Cx<'_>, set: EntitySetId, annotation: &Annotation) -> Result<()> {
    let term = Term::resolve(&annotation.term, cx.schema);

    let restriction = |name: &str| -> Result<Option<bool>> {
        let record = record(annotation)?;
        record_bool(record, &annotation.term, name)
    };

    match (term.vocabulary, term.name) {
        (Vocabulary::Common, "Label") => {
            cx.extensions.entity_set_mut(set).label = Some(string(annotation)?);
        }
        (Vocabulary::Capabilities, "InsertRestrictions") => {
            if let Some(value) = restriction("Insertable")? {
                cx.extensions.entity_set_mut(set).creatable = value;
            }
        }
        (Vocabulary::Capabilities, "UpdateRestrictions") => {
            if let Some(value) = restriction("Updatable")? {
                cx.extensions.entity_set_mut(set).updatable = value;
            }
        }
        (Vocabulary::Capabilities, "DeleteRestrictions") => {
            if let Some(value) = restriction("Deletable")? {
                cx.extensions.entity_set_mut(set).deletable = value;
            }
        }
        (Vocabulary::Capabilities, "SearchRestrictions") => {
            if let Some(value) = restriction("Searchable")? {
                cx.extensions.entity_set_mut(set).searchable = value;
            }
        }
        (Vocabulary::Capabilities, "FilterRestrictions") => {
            if let Some(value) = restriction("RequiresFilter")? {
                cx.extensions.entity_set_mut(set).requires_filter = value;
            }
        }
        _ => other_term(&mut cx.extensions.entity_set_mut(set).other_terms, annotation),
    }

    Ok(())
}

fn header_info(annotation: &Annotation) -> Result<HeaderInfo> {
    let term = annotation.term.as_str();
    let record = record(annotation)?;

    let required = |name: &str| -> Result<String> {
        let value = record.get(name).ok_or_else(|| {
            Error::annotation_shape(term, format!("missing required property `{name}`"))
        })?;
        value.as_str().map(str::to_string).ok_or_else(|| {
            Error::annotation_shape(
                term,
                format!("`{name}` must be a string, found {}", value.kind_name()),
            )
        })
    };

    let field = |name: &str| -> Result<Option<DataField>> {
        record
            .get(name)
            .map(|value| DataField::from_value(value, term))
            .transpose()
    };

    Ok(HeaderInfo {
        type_name: required("TypeName")?,
        type_name_plural: required("TypeNamePlural")?,
        title: field("Title")?,
        description: field("Description")?,
    })
}

fn other_term(terms: &mut Vec<String>, annotation: &Annotation) {
    let term = match &annotation.qualifier {
        Some(qualifier) => format!("{}#{qualifier}", annotation.term),
        None => annotation.term.clone(),
    };

    if !terms.contains(&term) {
        terms.push(term);
    }
}

fn string(annotation: &Annotation) -> Result<String> {
    match &annotation.value {
        AnnotationValue::String(value) => Ok(value.clone()),
        other => Err(Error::annotation_shape(
            &annotation.term,
            format!("expected a string, found {}", other.kind_name()),
        )),
    }
}

fn path(annotation: &Annotation) -> Result<String> {
    annotation.value.as_path().map(str::to_string).ok_or_else(|| {
        Error::annotation_shape(
            &annotation.term,
            format!("expected a path, found {}", annotation.value.kind_name()),
        )
    })
}

fn boolean(annotation: &Annotation) -> Result<bool> {
    annotation.value.as_bool().ok_or_else(|| {
        Error::annotation_shape(
            &annotation.term,
            format!("expected a boolean, found {}", annotation.value.kind_name()),
        )
    })
}

fn record(annotation: &Annotation) -> Result<&Record> {
    annotation.value.as_record().ok_or_else(|| {
        Error::annotation_shape(
            &annotation.term,
            format!("expected a record, found {}", annotation.value.kind_name()),
        )
    })
}

fn record_bool(record: &Record, term: &str, name: &str) -> Result<Option<bool>> {
    match record.get(name) {
        None => Ok(None),
        Some(AnnotationValue::Null) => Err(Error::annotation_shape(
            term,
            format!("`{name}` has no value"),
        )),
        Some(value) => value.as_bool().map(Some).ok_or_else(|| {
            Error::annotation_shape(
                term,
                format!("`{name}` must be a boolean, found {}", value.kind_name()),
            )
        }),
    }
}

impl<'a> AnnotationIndex<'a> {
    /// Indexes the annotations of every schema in the document. External
    /// blocks may target elements of another schema, so all of them are
    /// read and the extender picks what belongs to its schema.
    fn build(cx: &mut Cx<'a>) -> Result<Self> {
        let graph = cx.graph;
        let mut index = Self::default();

        for schema in graph {
            index.inline(schema);
        }

        for declaring in graph {
            for group in &declaring.annotations {
                let annotations = group.annotations.iter().map(|annotation| {
                    // The block's qualifier applies to members without their own.
                    match (&annotation.qualifier, &group.qualifier) {
                        (None, Some(qualifier)) => Cow::Owned(Annotation {
                            qualifier: Some(qualifier.clone()),
                            ..annotation.clone()
                        }),
                        _ => Cow::Borrowed(annotation),
                    }
                });

                let Some((home, target)) = resolve_target(graph, declaring, &group.target) else {
                    tracing::debug!(
                        schema = %declaring.namespace,
                        target_path = %group.target,
                        "annotation target names a schema outside the document"
                    );
                    continue;
                };

                match target {
                    Target::Type(id) => index.types.entry(id).or_default().extend(annotations),
                    Target::Property { owner, property } => index
                        .properties
                        .entry((owner, property))
                        .or_default()
                        .extend(annotations),
                    Target::EntitySet(id) => {
                        index.entity_sets.entry(id).or_default().extend(annotations)
                    }
                    Target::Ignored => {
                        tracing::trace!(target_path = %group.target, "ignoring annotation target");
                    }
                    // Reported once, while extending the schema it points into.
                    Target::Unresolved if home == cx.schema.id => {
                        cx.report(
                            &group.target,
                            Error::schema_consistency(format!(
                                "annotation target `{}` does not resolve",
                                group.target
                            )),
                        )?;
                    }
                    Target::Unresolved => {}
                }
            }
        }

        Ok(index)
    }

    fn inline(&mut self, schema: &'a Schema) {
        for entity in schema.entity_types() {
            self.types
                .entry(entity.id)
                .or_default()
                .extend(entity.annotations.iter().map(Cow::Borrowed));

            for property in &entity.properties {
                self.properties
                    .entry((entity.id, property.id))
                    .or_default()
                    .extend(property.annotations.iter().map(Cow::Borrowed));
            }
        }

        for container in schema.entity_containers() {
            for set in &container.entity_sets {
                self.entity_sets
                    .entry(set.id)
                    .or_default()
                    .extend(set.annotations.iter().map(Cow::Borrowed));
            }
        }
    }
}

fn lookup<'s, 'a, K: std::hash::Hash + Eq>(
    map: &'s IndexMap<K, Vec<Cow<'a, Annotation>>>,
    key: &K,
) -> &'s [Cow<'a, Annotation>] {
    map.get(key).map(Vec::as_slice).unwrap_or_default()
}

/// Resolves a target written in `declaring`. Returns the schema the target
/// points into along with the target, or `None` when its qualifier names no
/// schema of the document.
fn resolve_target(
    graph: &[Schema],
    declaring: &Schema,
    target: &str,
) -> Option<(SchemaId, Target)> {
    let (head, rest) = match target.split_once('/') {
        Some((head, rest)) => (head, Some(rest)),
        None => (target, None),
    };

    let schema = match declaring.local_name(head) {
        Some(_) => declaring,
        None => graph.schema_named(QualifiedName::parse(head.trim()).qualifier?)?,
    };
    let local = schema.local_name(head)?;

    if let Some(ty) = schema.types.get(local) {
        let id = ty.id();
        let target = match rest {
            None if matches!(ty, Type::Entity(_)) => Target::Type(id),
            None => Target::Ignored,
            Some(rest) => match graph.find_property(id, rest) {
                Some(property) if matches!(ty, Type::Entity(_)) => Target::Property {
                    owner: id,
                    property: property.id,
                },
                Some(_) => Target::Ignored,
                None if graph.find_navigation_property(id, rest).is_some() => Target::Ignored,
                None => Target::Unresolved,
            },
        };

        return Some((schema.id, target));
    }

    if let Some(container) = schema.containers.get(local) {
        let target = match rest {
            None => Target::Ignored,
            Some(name) => match container.entity_set(name) {
                Some(set) => Target::EntitySet(set.id),
                None if container.function_import(name).is_some()
                    || container.association_set(name).is_some() =>
                {
                    Target::Ignored
                }
                None => Target::Unresolved,
            },
        };

        return Some((schema.id, target));
    }

    Some((schema.id, Target::Unresolved))
}
