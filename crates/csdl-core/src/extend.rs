//! Vendor extensions.
//!
//! An [`Extender`] reads the annotations and vendor attributes of a resolved
//! [`Schema`](crate::Schema) and records derived values in an
//! [`Extensions`] table keyed by node ID. The schema itself is never
//! modified, so the same schema can be extended with different settings.

mod data_field;
pub use data_field::{DataField, DataFieldCommon};

mod entity_type;
pub use entity_type::EntityTypeExtender;

mod extender;
pub use extender::{Cx, Extender};

mod extensions;
pub use extensions::{
    Diagnostic, EntitySetAnnotations, EntityTypeAnnotations, Extensions, HeaderInfo,
    PropertyAnnotations, ValueListKind,
};

mod oasis;
pub use oasis::OasisExtender;

mod registry;
pub use registry::Registry;

mod sap;
pub use sap::SapExtender;

mod settings;
pub use settings::{DialectSet, Settings};

mod side_effects;
pub use side_effects::{PathRef, SideEffectsType};

mod term;
pub use term::{Term, Vocabulary};

mod value_list;
pub use value_list::{ParameterKind, ValueListParameter, ValueListType};
