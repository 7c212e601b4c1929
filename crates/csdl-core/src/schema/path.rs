use super::{Graph, PropertyId, TypeId};

/// What a `/`-separated property or navigation path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathTarget {
    /// The structured type itself: an empty path, or a trailing `*`.
    Type(TypeId),

    /// A structural property.
    Property(PropertyId),

    /// A navigation property; `target` is the entity type it leads to.
    Navigation { target: TypeId },
}

/// Backs [`Graph::resolve_path`].
pub(super) fn resolve(
    graph: &(impl Graph + ?Sized),
    from: TypeId,
    path: &str,
) -> Option<PathTarget> {
    let path = path.trim().trim_matches('/');
    let mut last = PathTarget::Type(from);

    if path.is_empty() {
        return Some(last);
    }

    for segment in path.split('/') {
        let ty = match last {
            PathTarget::Type(ty) => ty,
            PathTarget::Navigation { target } => target,
            PathTarget::Property(id) => {
                let ty = graph.property(id).ty.element().type_id()?;
                graph.ty(ty).as_complex()?;
                ty
            }
        };

        last = if segment == "*" {
            PathTarget::Type(ty)
        } else if let Some(property) = graph.find_property(ty, segment) {
            PathTarget::Property(property.id)
        } else if let Some(navigation) = graph.find_navigation_property(ty, segment) {
            PathTarget::Navigation {
                target: navigation.target_type(graph),
            }
        } else {
            return None;
        };
    }

    Some(last)
}
