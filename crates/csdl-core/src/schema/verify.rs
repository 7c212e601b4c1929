use super::{builder::Scope, Graph, NavigationTarget, Result, Schema, Type};
use crate::Error;

struct Verify<'a> {
    /// Every schema of the document, for IDs pointing into other schemas.
    document: &'a [Schema],
    schema: &'a Schema,
}

impl Schema {
    pub(super) fn verify(&self, document: &[Schema]) -> Result<()> {
        Verify {
            document,
            schema: self,
        }
        .verify()
    }
}

impl Verify<'_> {
    fn verify(&self) -> Result<()> {
        debug_assert!(self.verify_ids_populated());

        self.verify_association_ends_resolve()?;
        self.verify_association_set_ends()?;
        self.verify_single_default_container()?;
        Ok(())
    }

    fn verify_ids_populated(&self) -> bool {
        for ty in self.schema.types.values() {
            for property in ty.properties() {
                assert!(!property.ty.is_placeholder(), "{}", property.name);
            }

            if let Type::Entity(entity) = ty {
                assert_eq!(entity.base_type.is_some(), entity.base_type_name.is_some());

                for navigation in &entity.navigation_properties {
                    match &navigation.target {
                        NavigationTarget::Association { association, .. } => {
                            assert!(!association.is_placeholder());
                        }
                        NavigationTarget::Typed { ty, .. } => assert!(!ty.is_placeholder()),
                    }
                }
            }
        }

        for association in self.schema.associations() {
            for end in &association.ends {
                assert!(!end.ty.is_placeholder());
            }
        }

        for container in self.schema.entity_containers() {
            for set in &container.entity_sets {
                assert!(!set.entity_type.is_placeholder());
            }

            for set in &container.association_sets {
                assert!(!set.association.is_placeholder());
                for end in &set.ends {
                    assert_eq!(end.entity_set.container, container.id);
                    assert!(end.end < 2);
                }
            }
        }

        true
    }

    /// Every association end must point at the entity type registered under
    /// the name the end was declared with.
    fn verify_association_ends_resolve(&self) -> Result<()> {
        for association in self.schema.associations() {
            for end in &association.ends {
                let registered = Scope::new(self.document, self.schema)
                    .get_type(&end.type_name)
                    .filter(|ty| ty.is_entity())
                    .map(Type::id);

                if registered != Some(end.ty) {
                    return Err(Error::schema_consistency(format!(
                        "end `{}` of association `{}` does not resolve to entity type `{}`",
                        end.role, association.name, end.type_name
                    )));
                }
            }
        }

        Ok(())
    }

    fn verify_association_set_ends(&self) -> Result<()> {
        for container in self.schema.entity_containers() {
            for set in &container.association_sets {
                let association = set.association(self.document);

                for end in &set.ends {
                    let association_end = &association.ends[end.end];
                    let entity_set = end.entity_set(self.document);

                    if association_end.role != end.role
                        || !self
                            .document
                            .is_same_or_derived(entity_set.entity_type, association_end.ty)
                    {
                        return Err(Error::schema_consistency(format!(
                            "association set `{}` binds role `{}` to entity set `{}` \
                             of the wrong type",
                            set.name, end.role, entity_set.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn verify_single_default_container(&self) -> Result<()> {
        let defaults = self
            .schema
            .entity_containers()
            .filter(|container| container.is_default)
            .count();

        if defaults > 1 {
            return Err(Error::construction_invariant(format!(
                "schema declares {defaults} default entity containers"
            )));
        }

        Ok(())
    }
}
