use super::{Builder, Dialect, EntityContainer, Graph, QualifiedName, Schema};
use crate::{raw::Element, Error, Result};

/// A whole metadata document: the `edmx:Edmx` root with its schemas.
#[derive(Debug, Clone)]
pub struct Metadata {
    /// `Version` attribute of the `edmx:Edmx` element.
    pub version: String,

    pub dialect: Dialect,

    pub references: Vec<Reference>,

    pub schemas: Vec<Schema>,
}

/// An `edmx:Reference` to an external vocabulary or service document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub uri: Option<String>,
    pub includes: Vec<Include>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub namespace: String,
    pub alias: Option<String>,
}

impl Metadata {
    /// Builds every schema in the document. The dialect follows the document
    /// version.
    pub fn from_raw(raw: &Element) -> Result<Metadata> {
        let edmx = edmx_root(raw);
        let version = edmx.require_attr("Version", "Edmx")?;

        let dialect = Dialect::from_version(version).ok_or_else(|| {
            Error::invalid_metadata(format!("unsupported metadata version `{version}`"))
        })?;

        Self::build(edmx, version, dialect)
    }

    /// Like [`from_raw`](Self::from_raw) with an explicit dialect, for
    /// services that report a misleading version.
    pub fn from_raw_with_dialect(raw: &Element, dialect: Dialect) -> Result<Metadata> {
        let edmx = edmx_root(raw);
        let version = edmx.attr("Version").unwrap_or_default();
        Self::build(edmx, version, dialect)
    }

    fn build(edmx: &Element, version: &str, dialect: Dialect) -> Result<Metadata> {
        let references = edmx
            .children("Reference")
            .map(Reference::from_raw)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = Builder::new(dialect);
        for include in references.iter().flat_map(|r| &r.includes) {
            if let Some(alias) = &include.alias {
                builder.vocabulary_alias(alias, &include.namespace);
            }
        }

        let data_services = edmx.child("DataServices").ok_or_else(|| {
            Error::invalid_metadata("document has no `DataServices` element")
        })?;

        // Schemas of one document may reference each other, so they are
        // linked together.
        let schemas = builder.build_document(data_services.children("Schema"))?;

        Ok(Metadata {
            version: version.to_string(),
            dialect,
            references,
            schemas,
        })
    }

    /// The schema with the given namespace or alias.
    pub fn schema(&self, namespace: &str) -> Option<&Schema> {
        self.schema_named(namespace)
    }

    /// The schema a qualified name belongs to.
    pub fn schema_for(&self, qualified_name: &str) -> Option<&Schema> {
        self.schema(QualifiedName::parse(qualified_name).qualifier?)
    }

    pub fn entity_containers(&self) -> impl Iterator<Item = (&Schema, &EntityContainer)> + '_ {
        self.schemas
            .iter()
            .flat_map(|schema| schema.entity_containers().map(move |c| (schema, c)))
    }
}

impl Graph for Metadata {
    fn schemas(&self) -> &[Schema] {
        &self.schemas
    }
}

impl Reference {
    fn from_raw(raw: &Element) -> Result<Self> {
        Ok(Self {
            uri: raw.attr("Uri").map(str::to_string),
            includes: raw
                .children("Include")
                .map(|include| {
                    Ok(Include {
                        namespace: include.require_attr("Namespace", "Include")?.to_string(),
                        alias: include.attr("Alias").map(str::to_string),
                    })
                })
                .collect::<Result<_>>()?,
        })
    }
}

/// Accepts either the `edmx:Edmx` element itself or a wrapper holding it.
fn edmx_root(raw: &Element) -> &Element {
    raw.child("Edmx").unwrap_or(raw)
}
