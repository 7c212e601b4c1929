use super::{Annotation, TypeId, TypeRef};
use crate::{raw::Element, Result};
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Property {
    /// Uniquely identifies the property within the schema.
    pub id: PropertyId,

    pub name: String,

    /// The type name as written in the metadata.
    pub type_name: String,

    /// Resolved type. Valid once the schema is built.
    pub ty: TypeRef,

    /// Defaults to `true` when the metadata is silent.
    pub nullable: bool,

    pub max_length: Option<MaxLength>,

    pub precision: Option<u32>,

    /// `None` for the symbolic `variable`/`floating` scales.
    pub scale: Option<u32>,

    pub default_value: Option<String>,

    /// `sap:` attributes keyed by local name.
    pub vendor_attrs: IndexMap<String, String>,

    pub annotations: Vec<Annotation>,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId {
    /// The entity or complex type declaring the property.
    pub ty: TypeId,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxLength {
    Max,
    Length(u64),
}

impl Property {
    pub(crate) fn from_raw(raw: &Element, id: PropertyId) -> Result<Self> {
        let name = raw.require_attr("Name", "Property")?;

        let parse = || -> Result<Self> {
            Ok(Self {
                id,
                name: name.to_string(),
                type_name: raw.require_attr("Type", "Property")?.to_string(),
                ty: TypeRef::placeholder(),
                nullable: raw.bool_attr("Nullable")?.unwrap_or(true),
                max_length: raw.attr("MaxLength").map(MaxLength::parse).transpose()?,
                precision: raw.attr("Precision").map(parse_u32).transpose()?,
                scale: raw.attr("Scale").and_then(|s| s.parse().ok()),
                default_value: raw.attr("DefaultValue").map(str::to_string),
                vendor_attrs: raw.vendor_attrs("sap"),
                annotations: Annotation::all_from_raw(raw)?,
            })
        };

        parse().map_err(|e| e.context(err!("Property `{name}`")))
    }
}

impl MaxLength {
    fn parse(src: &str) -> Result<Self> {
        if src.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }

        src.parse()
            .map(Self::Length)
            .map_err(|_| crate::Error::invalid_metadata(format!("invalid MaxLength `{src}`")))
    }
}

fn parse_u32(src: &str) -> Result<u32> {
    src.parse()
        .map_err(|_| crate::Error::invalid_metadata(format!("expected an integer, found `{src}`")))
}

impl PropertyId {
    pub(crate) const fn placeholder() -> Self {
        Self {
            ty: TypeId::placeholder(),
            index: usize::MAX,
        }
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "PropertyId({}/{}/{})",
            self.ty.schema.0, self.ty.index, self.index
        )
    }
}
