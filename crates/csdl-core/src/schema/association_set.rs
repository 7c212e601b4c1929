use super::{Association, AssociationEnd, AssociationId, EntitySet, EntitySetId, Graph};
use crate::{raw::Element, Error, Result};

/// Instantiates an association inside a container by binding each role to
/// an entity set.
#[derive(Debug, Clone)]
pub struct AssociationSet {
    pub name: String,

    /// Association name as written.
    pub association_name: String,

    /// Resolved association. Valid once the schema is built.
    pub association: AssociationId,

    pub ends: [AssociationSetEnd; 2],
}

#[derive(Debug, Clone)]
pub struct AssociationSetEnd {
    pub role: String,

    /// Entity set name as written.
    pub entity_set_name: String,

    /// Resolved entity set, in the same container as the association set.
    pub entity_set: EntitySetId,

    /// Index of the matching end in the association.
    pub end: usize,
}

impl AssociationSet {
    pub(crate) fn from_raw(raw: &Element) -> Result<Self> {
        let name = raw.require_attr("Name", "AssociationSet")?;

        let parse = || -> Result<Self> {
            let ends: Vec<_> = raw
                .children("End")
                .map(AssociationSetEnd::from_raw)
                .collect::<Result<_>>()?;

            let Ok([first, second]) = <[AssociationSetEnd; 2]>::try_from(ends) else {
                return Err(Error::construction_invariant(
                    "association set must bind exactly two ends",
                ));
            };

            if first.role == second.role {
                return Err(Error::construction_invariant(format!(
                    "association set ends must have distinct roles, both are `{}`",
                    first.role
                )));
            }

            Ok(Self {
                name: name.to_string(),
                association_name: raw
                    .require_attr("Association", "AssociationSet")?
                    .to_string(),
                association: AssociationId::placeholder(),
                ends: [first, second],
            })
        };

        parse().map_err(|e| e.context(err!("AssociationSet `{name}`")))
    }

    /// Returns the end bound to `role`.
    ///
    /// Asking for a role the association does not declare is a programming
    /// error and fails with a schema consistency error.
    pub fn end_by_role(&self, role: &str) -> Result<&AssociationSetEnd> {
        self.ends.iter().find(|end| end.role == role).ok_or_else(|| {
            Error::schema_consistency(format!(
                "association set `{}` has no end with role `{role}`",
                self.name
            ))
        })
    }

    pub fn association<'a>(&self, schema: &'a (impl Graph + ?Sized)) -> &'a Association {
        schema.association(self.association)
    }
}

impl AssociationSetEnd {
    fn from_raw(raw: &Element) -> Result<Self> {
        Ok(Self {
            role: raw.require_attr("Role", "association set End")?.to_string(),
            entity_set_name: raw
                .require_attr("EntitySet", "association set End")?
                .to_string(),
            entity_set: EntitySetId::placeholder(),
            end: usize::MAX,
        })
    }

    pub fn entity_set<'a>(&self, schema: &'a (impl Graph + ?Sized)) -> &'a EntitySet {
        schema.entity_set(self.entity_set)
    }

    /// The association end this set end instantiates.
    pub fn association_end<'a>(
        &self,
        schema: &'a (impl Graph + ?Sized),
        set: &AssociationSet,
    ) -> &'a AssociationEnd {
        &set.association(schema).ends[self.end]
    }
}
