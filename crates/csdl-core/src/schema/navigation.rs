use super::{Annotation, AssociationId, Graph, Multiplicity, TypeId, TypeRef};
use crate::{raw::Element, Result};

#[derive(Debug, Clone)]
pub struct NavigationProperty {
    pub name: String,

    pub target: NavigationTarget,

    pub annotations: Vec<Annotation>,
}

/// The two ways CSDL declares where a navigation property leads.
#[derive(Debug, Clone)]
pub enum NavigationTarget {
    /// OData V2: through an association and its roles.
    Association {
        /// Association name as written.
        relationship: String,
        from_role: String,
        to_role: String,
        /// Resolved association.
        association: AssociationId,
    },

    /// OData V4: directly typed, optionally paired with a partner.
    Typed {
        type_name: String,
        ty: TypeRef,
        partner: Option<String>,
        nullable: bool,
    },
}

impl NavigationProperty {
    pub(crate) fn from_raw(raw: &Element) -> Result<Self> {
        let name = raw.require_attr("Name", "NavigationProperty")?;

        let parse = || -> Result<Self> {
            let target = match raw.attr("Relationship") {
                Some(relationship) => NavigationTarget::Association {
                    relationship: relationship.to_string(),
                    from_role: raw.require_attr("FromRole", "NavigationProperty")?.to_string(),
                    to_role: raw.require_attr("ToRole", "NavigationProperty")?.to_string(),
                    association: AssociationId::placeholder(),
                },
                None => NavigationTarget::Typed {
                    type_name: raw.require_attr("Type", "NavigationProperty")?.to_string(),
                    ty: TypeRef::placeholder(),
                    partner: raw.attr("Partner").map(str::to_string),
                    nullable: raw.bool_attr("Nullable")?.unwrap_or(true),
                },
            };

            Ok(Self {
                name: name.to_string(),
                target,
                annotations: Annotation::all_from_raw(raw)?,
            })
        };

        parse().map_err(|e| e.context(err!("NavigationProperty `{name}`")))
    }

    /// The entity type the navigation leads to.
    pub fn target_type(&self, schema: &(impl Graph + ?Sized)) -> TypeId {
        match &self.target {
            NavigationTarget::Association {
                association,
                to_role,
                ..
            } => schema.association(*association).expect_end_by_role(to_role).ty,
            NavigationTarget::Typed { ty, .. } => ty
                .type_id()
                .expect("typed navigation property resolves to an entity type"),
        }
    }

    /// Whether following the navigation yields many entities.
    pub fn is_collection(&self, schema: &(impl Graph + ?Sized)) -> bool {
        match &self.target {
            NavigationTarget::Association {
                association,
                to_role,
                ..
            } => {
                schema
                    .association(*association)
                    .expect_end_by_role(to_role)
                    .multiplicity
                    == Multiplicity::Many
            }
            NavigationTarget::Typed { ty, .. } => ty.is_collection(),
        }
    }
}
