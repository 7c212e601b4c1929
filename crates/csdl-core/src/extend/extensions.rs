use super::{DataField, SideEffectsType, ValueListType};
use crate::schema::{Dialect, EntitySetId, PropertyId, TypeId};
use indexmap::IndexMap;

/// Values derived from vendor annotations, kept beside the schema rather
/// than on its nodes.
///
/// Filled by [`Registry::apply`](super::Registry::apply). Once applied,
/// every entity type, property and entity set of the schema has an entry,
/// even when nothing annotates it. Properties an entity type inherits get
/// an entry of their own for that type, see [`property_of`](Self::property_of).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extensions {
    /// Schema the table was built for, and the dialect applied to it.
    pub(super) applied: Option<(String, Dialect)>,

    pub(super) entity_types: IndexMap<TypeId, EntityTypeAnnotations>,

    pub(super) properties: IndexMap<PropertyId, PropertyAnnotations>,

    /// Inherited properties as seen from a derived entity type.
    pub(super) inherited: IndexMap<(TypeId, PropertyId), PropertyAnnotations>,

    pub(super) entity_sets: IndexMap<EntitySetId, EntitySetAnnotations>,

    pub(super) diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityTypeAnnotations {
    /// `Common.Label` or `sap:label`.
    pub label: Option<String>,

    /// `sap:semantics`
    pub semantics: Option<String>,

    /// `sap:content-version`
    pub content_version: Option<String>,

    /// `Common.SideEffects`, keyed by qualifier.
    pub side_effects: IndexMap<Option<String>, SideEffectsType>,

    /// `UI.LineItem`, keyed by qualifier.
    pub line_items: IndexMap<Option<String>, Vec<DataField>>,

    pub header_info: Option<HeaderInfo>,

    /// Terms without a decoder, as written.
    pub other_terms: Vec<String>,
}

/// A decoded `UI.HeaderInfo` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub type_name: String,
    pub type_name_plural: String,
    pub title: Option<DataField>,
    pub description: Option<DataField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAnnotations {
    /// `Common.Label` or `sap:label`.
    pub label: Option<String>,

    /// `sap:heading`
    pub heading: Option<String>,

    /// `sap:quickinfo`
    pub quickinfo: Option<String>,

    /// Path to a descriptive text (`Common.Text` or `sap:text`).
    pub text: Option<String>,

    /// Path to the unit of measure or currency code.
    pub unit: Option<String>,

    pub display_format: Option<String>,

    pub semantics: Option<String>,

    pub computed: bool,

    pub immutable: bool,

    pub creatable: bool,

    pub updatable: bool,

    pub filterable: bool,

    pub sortable: bool,

    pub required_in_filter: bool,

    /// `sap:filter-restriction`
    pub filter_restriction: Option<String>,

    pub value_list: Option<ValueListKind>,

    /// `Common.ValueList`, keyed by qualifier.
    pub value_lists: IndexMap<Option<String>, ValueListType>,

    pub other_terms: Vec<String>,
}

/// How a property offers its value help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueListKind {
    Standard,
    FixedValues,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySetAnnotations {
    pub label: Option<String>,
    pub creatable: bool,
    pub updatable: bool,
    pub deletable: bool,
    pub searchable: bool,
    pub pageable: bool,
    pub addressable: bool,
    pub requires_filter: bool,
    pub other_terms: Vec<String>,
}

/// A malformed annotation that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The annotated element, e.g. `NS.Order/id`.
    pub target: String,

    /// The offending term, when the annotation itself was malformed.
    pub term: Option<String>,

    pub message: String,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `dialect` was applied to the schema named `namespace`.
    pub fn is_applied(&self, namespace: &str, dialect: Dialect) -> bool {
        matches!(&self.applied, Some((ns, d)) if ns == namespace && *d == dialect)
    }

    pub fn entity_type(&self, id: TypeId) -> Option<&EntityTypeAnnotations> {
        self.entity_types.get(&id)
    }

    pub fn property(&self, id: PropertyId) -> Option<&PropertyAnnotations> {
        self.properties.get(&id)
    }

    /// The property `id` as seen from the entity type `ty`, which either
    /// declares it or inherits it.
    pub fn property_of(&self, ty: TypeId, id: PropertyId) -> Option<&PropertyAnnotations> {
        if id.ty == ty {
            self.property(id)
        } else {
            self.inherited.get(&(ty, id))
        }
    }

    pub fn entity_set(&self, id: EntitySetId) -> Option<&EntitySetAnnotations> {
        self.entity_sets.get(&id)
    }

    /// Annotations skipped because they were malformed.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn entity_type_mut(&mut self, id: TypeId) -> &mut EntityTypeAnnotations {
        self.entity_types.entry(id).or_default()
    }

    pub fn property_mut(&mut self, id: PropertyId) -> &mut PropertyAnnotations {
        self.properties.entry(id).or_default()
    }

    pub fn property_of_mut(&mut self, ty: TypeId, id: PropertyId) -> &mut PropertyAnnotations {
        if id.ty == ty {
            self.property_mut(id)
        } else {
            self.inherited.entry((ty, id)).or_default()
        }
    }

    /// Every property entry, declared and inherited.
    pub(super) fn all_properties_mut(&mut self) -> impl Iterator<Item = &mut PropertyAnnotations> {
        self.properties.values_mut().chain(self.inherited.values_mut())
    }

    pub fn entity_set_mut(&mut self, id: EntitySetId) -> &mut EntitySetAnnotations {
        self.entity_sets.entry(id).or_default()
    }
}

impl EntityTypeAnnotations {
    pub fn side_effects(&self, qualifier: Option<&str>) -> Option<&SideEffectsType> {
        self.side_effects.get(&qualifier.map(str::to_string))
    }

    pub fn line_item(&self, qualifier: Option<&str>) -> &[DataField] {
        self.line_items
            .get(&qualifier.map(str::to_string))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl PropertyAnnotations {
    pub fn value_list(&self, qualifier: Option<&str>) -> Option<&ValueListType> {
        self.value_lists.get(&qualifier.map(str::to_string))
    }

    pub fn has_value_list(&self) -> bool {
        self.value_list.is_some() || !self.value_lists.is_empty()
    }
}

impl Default for PropertyAnnotations {
    fn default() -> Self {
        Self {
            label: None,
            heading: None,
            quickinfo: None,
            text: None,
            unit: None,
            display_format: None,
            semantics: None,
            computed: false,
            immutable: false,
            creatable: true,
            updatable: true,
            filterable: true,
            sortable: true,
            required_in_filter: false,
            filter_restriction: None,
            value_list: None,
            value_lists: IndexMap::new(),
            other_terms: vec![],
        }
    }
}

impl Default for EntitySetAnnotations {
    fn default() -> Self {
        Self {
            label: None,
            creatable: true,
            updatable: true,
            deletable: true,
            searchable: false,
            pageable: true,
            addressable: true,
            requires_filter: false,
            other_terms: vec![],
        }
    }
}
