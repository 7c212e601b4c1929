use crate::{
    schema::{Annotation, EntityType, Graph, PathTarget},
    Error, Result,
};

/// A decoded `Common.SideEffects` annotation.
///
/// Describes which properties or navigations must be reloaded once one of
/// the sources changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectsType {
    pub qualifier: Option<String>,
    pub source_properties: Vec<PathRef>,
    pub source_entities: Vec<PathRef>,
    pub target_properties: Vec<PathRef>,
    pub target_entities: Vec<PathRef>,

    /// `Common.EffectType` flags, e.g. `ValueChange`.
    pub effect_types: Vec<String>,

    pub trigger_action: Option<String>,
}

/// A path together with what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRef {
    pub path: String,
    pub target: PathTarget,
}

#[derive(Clone, Copy)]
enum Expect {
    Property,
    Entity,
}

impl SideEffectsType {
    /// Decodes `annotation`, resolving every path against `owner`.
    pub fn from_annotation(
        annotation: &Annotation,
        owner: &EntityType,
        schema: &(impl Graph + ?Sized),
    ) -> Result<SideEffectsType> {
        let term = annotation.term.as_str();
        let record = annotation.value.as_record().ok_or_else(|| {
            Error::annotation_shape(
                term,
                format!("expected a record, found {}", annotation.value.kind_name()),
            )
        })?;

        let paths = |name: &str, expect: Expect| -> Result<Vec<PathRef>> {
            let Some(value) = record.get(name) else {
                return Ok(vec![]);
            };

            let items = value.as_collection().ok_or_else(|| {
                Error::annotation_shape(
                    term,
                    format!("`{name}` must be a collection, found {}", value.kind_name()),
                )
            })?;

            items
                .iter()
                .map(|item| {
                    let path = item.as_str().ok_or_else(|| {
                        Error::annotation_shape(
                            term,
                            format!("`{name}` entries must be paths, found {}", item.kind_name()),
                        )
                    })?;
                    resolve(schema, owner, term, name, path, expect)
                })
                .collect()
        };

        let side_effects = SideEffectsType {
            qualifier: annotation.qualifier.clone(),
            source_properties: paths("SourceProperties", Expect::Property)?,
            source_entities: paths("SourceEntities", Expect::Entity)?,
            target_properties: paths("TargetProperties", Expect::Property)?,
            target_entities: paths("TargetEntities", Expect::Entity)?,
            effect_types: match record.get("EffectTypes") {
                None => vec![],
                Some(value) => effect_types(value.as_str().ok_or_else(|| {
                    Error::annotation_shape(
                        term,
                        format!(
                            "`EffectTypes` must be an enum member, found {}",
                            value.kind_name()
                        ),
                    )
                })?),
            },
            trigger_action: match record.get("TriggerAction") {
                None => None,
                Some(value) => Some(
                    value
                        .as_str()
                        .ok_or_else(|| {
                            Error::annotation_shape(
                                term,
                                format!(
                                    "`TriggerAction` must be a string, found {}",
                                    value.kind_name()
                                ),
                            )
                        })?
                        .to_string(),
                ),
            },
        };

        if side_effects.source_properties.is_empty() && side_effects.source_entities.is_empty() {
            return Err(Error::annotation_shape(
                term,
                "side effects need at least one source property or entity",
            ));
        }

        if side_effects.target_properties.is_empty()
            && side_effects.target_entities.is_empty()
            && side_effects.trigger_action.is_none()
        {
            return Err(Error::annotation_shape(
                term,
                "side effects need a target or a trigger action",
            ));
        }

        Ok(side_effects)
    }

    pub fn is_source_property(&self, path: &str) -> bool {
        self.source_properties.iter().any(|source| source.path == path)
    }
}

fn resolve(
    schema: &(impl Graph + ?Sized),
    owner: &EntityType,
    term: &str,
    name: &str,
    path: &str,
    expect: Expect,
) -> Result<PathRef> {
    let target = schema.resolve_path(owner.id, path).ok_or_else(|| {
        Error::annotation_shape(
            term,
            format!("`{name}` path `{path}` does not resolve from `{}`", owner.name),
        )
    })?;

    let ok = match (expect, target) {
        (_, PathTarget::Type(_)) => true,
        (Expect::Property, PathTarget::Property(_)) => true,
        (Expect::Entity, PathTarget::Navigation { .. }) => true,
        _ => false,
    };

    if !ok {
        let wanted = match expect {
            Expect::Property => "a property",
            Expect::Entity => "a navigation property",
        };
        return Err(Error::annotation_shape(
            term,
            format!("`{name}` path `{path}` must lead to {wanted}"),
        ));
    }

    Ok(PathRef {
        path: path.to_string(),
        target,
    })
}

/// Splits a flags enum value such as
/// `Common.EffectType/ValueChange Common.EffectType/FieldControlChange`.
fn effect_types(value: &str) -> Vec<String> {
    value
        .split_whitespace()
        .map(|member| member.rsplit('/').next().unwrap_or(member).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_type_flags() {
        assert_eq!(
            effect_types("Common.EffectType/ValueChange Common.EffectType/FieldControlChange"),
            vec!["ValueChange", "FieldControlChange"]
        );
        assert_eq!(effect_types("ValueChange"), vec!["ValueChange"]);
    }
}
