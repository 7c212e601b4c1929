use super::{Cx, EntityTypeExtender, Extender};
use crate::{schema::Dialect, Result};

/// Extender for OData V4 documents following the OASIS vocabularies.
///
/// Writability of a property follows `Core.Computed` and `Core.Immutable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OasisExtender;

impl Extender for OasisExtender {
    fn dialect(&self) -> Dialect {
        Dialect::Oasis
    }

    fn apply(&self, cx: &mut Cx<'_>) -> Result<()> {
        EntityTypeExtender::new(cx)?.apply(cx)?;

        for bag in cx.extensions.all_properties_mut() {
            if bag.computed {
                bag.creatable = false;
                bag.updatable = false;
            }

            if bag.immutable {
                bag.updatable = false;
            }
        }

        Ok(())
    }
}
