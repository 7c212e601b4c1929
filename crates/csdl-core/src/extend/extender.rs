use super::{Diagnostic, Extensions, Settings};
use crate::{
    schema::{Dialect, Schema},
    Error, Result,
};
use std::fmt;

/// Derives dialect specific values from a resolved schema.
///
/// Implementations read the schema and write into the [`Extensions`] held by
/// the [`Cx`]. They must not depend on anything but the schema and the
/// settings, so applying twice yields the same table.
pub trait Extender: fmt::Debug + Send + Sync {
    /// The dialect this extender handles.
    fn dialect(&self) -> Dialect;

    fn apply(&self, cx: &mut Cx<'_>) -> Result<()>;
}

/// State threaded through one extender run.
#[derive(Debug)]
pub struct Cx<'a> {
    /// Every schema of the document `schema` belongs to, `schema` included.
    /// IDs found on `schema` resolve through it.
    pub graph: &'a [Schema],

    /// The schema being extended.
    pub schema: &'a Schema,

    pub settings: &'a Settings,

    pub extensions: Extensions,
}

impl<'a> Cx<'a> {
    pub(super) fn new(graph: &'a [Schema], schema: &'a Schema, settings: &'a Settings) -> Self {
        Self {
            graph,
            schema,
            settings,
            extensions: Extensions::new(),
        }
    }

    /// Reports a malformed annotation on `target`.
    ///
    /// In strict mode the error is returned with `target` as context.
    /// Otherwise it is logged, recorded as a [`Diagnostic`], and the caller
    /// carries on without the annotation.
    pub fn report(&mut self, target: &str, err: Error) -> Result<()> {
        if self.settings.strict {
            return Err(err.context(err!("annotation on `{target}`")));
        }

        tracing::warn!(
            schema = %self.schema.namespace,
            target_path = target,
            error = %err,
            "skipping malformed annotation"
        );

        self.extensions.diagnostics.push(Diagnostic {
            target: target.to_string(),
            term: err.annotation_term().map(str::to_string),
            message: err.to_string(),
        });

        Ok(())
    }

    /// Runs `f`, reporting its error against `target`.
    pub fn isolate<T>(
        &mut self,
        target: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        match f(self) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.report(target, err)?;
                Ok(None)
            }
        }
    }
}
