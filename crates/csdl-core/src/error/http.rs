use super::Error;

/// Error from an HTTP client implementation.
#[derive(Debug)]
pub(super) struct HttpError {
    pub(super) inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for HttpError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.inner, f)?;
        let mut source = self.inner.source();
        while let Some(err) = source {
            write!(f, ": {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

impl Error {
    /// Creates an error from an HTTP client error.
    pub fn http(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::Http(HttpError {
            inner: Box::new(err),
        }))
    }

    /// Returns `true` if this error came from the HTTP client.
    pub fn is_http(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::Http(_)))
    }
}
