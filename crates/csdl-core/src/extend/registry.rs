use super::{Cx, Extender, Extensions, OasisExtender, SapExtender, Settings};
use crate::{
    schema::{Dialect, Graph, Metadata, Schema},
    Result,
};

/// The extenders available to a client, one per dialect.
#[derive(Debug)]
pub struct Registry {
    extenders: Vec<Box<dyn Extender>>,
}

impl Registry {
    /// An empty registry. Schemas of any dialect pass through it unchanged.
    pub fn new() -> Self {
        Self { extenders: vec![] }
    }

    /// Registers `extender`, replacing any extender already registered for
    /// its dialect.
    pub fn register(&mut self, extender: impl Extender + 'static) -> &mut Self {
        let dialect = extender.dialect();
        self.extenders.retain(|existing| existing.dialect() != dialect);
        self.extenders.push(Box::new(extender));
        self
    }

    pub fn extender(&self, dialect: Dialect) -> Option<&dyn Extender> {
        self.extenders
            .iter()
            .find(|extender| extender.dialect() == dialect)
            .map(|extender| &**extender)
    }

    /// Applies the extender for the schema's dialect, filling `extensions`.
    ///
    /// Applying again to the same schema is a no-op. On error `extensions`
    /// is left as it was. A schema that references other schemas of its
    /// document goes through [`apply_in`](Self::apply_in) instead.
    pub fn apply(
        &self,
        schema: &Schema,
        settings: &Settings,
        extensions: &mut Extensions,
    ) -> Result<()> {
        self.apply_in(schema, schema, settings, extensions)
    }

    /// Like [`apply`](Self::apply) for `schema` as one schema of `graph`.
    /// Cross-schema references resolve through `graph`, and `Annotations`
    /// blocks of any schema in `graph` that target `schema` are applied.
    pub fn apply_in(
        &self,
        graph: &(impl Graph + ?Sized),
        schema: &Schema,
        settings: &Settings,
        extensions: &mut Extensions,
    ) -> Result<()> {
        let dialect = schema.dialect;

        if graph.schema_named(&schema.namespace).map(|s| s.id) != Some(schema.id) {
            bail!("schema `{}` is not part of the given document", schema.namespace);
        }

        if let Some((namespace, applied)) = &extensions.applied {
            if namespace != &schema.namespace {
                bail!(
                    "extensions were built for schema `{namespace}`, not `{}`",
                    schema.namespace
                );
            }

            if *applied == dialect {
                tracing::debug!(
                    schema = %schema.namespace,
                    dialect = dialect.name(),
                    "extensions already applied"
                );
                return Ok(());
            }
        }

        if !settings.dialects.contains(dialect) {
            tracing::debug!(
                schema = %schema.namespace,
                dialect = dialect.name(),
                "dialect disabled"
            );
            return Ok(());
        }

        let Some(extender) = self.extender(dialect) else {
            tracing::debug!(
                schema = %schema.namespace,
                dialect = dialect.name(),
                "no extender registered"
            );
            return Ok(());
        };

        let mut cx = Cx::new(graph.schemas(), schema, settings);
        extender
            .apply(&mut cx)
            .map_err(|err| err.context(err!("extending schema `{}`", schema.namespace)))?;

        let mut built = cx.extensions;
        built.applied = Some((schema.namespace.clone(), dialect));

        tracing::debug!(
            schema = %schema.namespace,
            dialect = dialect.name(),
            entity_types = built.entity_types.len(),
            diagnostics = built.diagnostics.len(),
            "applied extensions"
        );

        *extensions = built;
        Ok(())
    }

    /// Builds the extension table of `schema`.
    pub fn extend(&self, schema: &Schema, settings: &Settings) -> Result<Extensions> {
        let mut extensions = Extensions::new();
        self.apply(schema, settings, &mut extensions)?;
        Ok(extensions)
    }

    /// Builds one extension table per schema of `metadata`, in document
    /// order. Annotations targeting a schema land in that schema's table,
    /// whichever schema declares them.
    pub fn extend_metadata(
        &self,
        metadata: &Metadata,
        settings: &Settings,
    ) -> Result<Vec<Extensions>> {
        metadata
            .schemas
            .iter()
            .map(|schema| {
                let mut extensions = Extensions::new();
                self.apply_in(metadata, schema, settings, &mut extensions)?;
                Ok(extensions)
            })
            .collect()
    }
}

impl Default for Registry {
    /// A registry with the OASIS and SAP extenders.
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(OasisExtender).register(SapExtender);
        registry
    }
}
