use crate::Result;
use serde::Deserialize;
use url::Url;

/// How to reach a service. Deserializes from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSettings {
    /// Service root, e.g. `https://host/sap/opu/odata/sap/API_SALES_ORDER_SRV/`.
    pub url: String,

    /// Restricts negotiation to the strategy with this name (`none`,
    /// `basic`). Any strategy may be used when unset.
    pub auth: Option<String>,

    pub username: Option<String>,

    pub password: Option<String>,
}

impl ConnectionSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Trims the service URL, makes sure it ends in `/` and lower-cases the
    /// auth kind.
    pub fn normalize(mut self) -> Self {
        self.url = self.url.trim().to_string();
        if !self.url.ends_with('/') {
            self.url.push('/');
        }

        self.auth = self
            .auth
            .map(|auth| auth.trim().to_ascii_lowercase())
            .filter(|auth| !auth.is_empty());

        self
    }

    pub fn service_url(&self) -> Result<Url> {
        Url::parse(&self.url)
            .map_err(|err| csdl_core::err!("invalid service url `{}`: {err}", self.url))
    }

    /// The `$metadata` document of the service.
    pub fn metadata_url(&self) -> Result<Url> {
        self.service_url()?
            .join("$metadata")
            .map_err(|err| csdl_core::err!("invalid metadata url: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize() {
        let settings = ConnectionSettings {
            url: "  https://example.com/service  ".into(),
            auth: Some(" Basic".into()),
            ..ConnectionSettings::default()
        }
        .normalize();

        assert_eq!(settings.url, "https://example.com/service/");
        assert_eq!(settings.auth.as_deref(), Some("basic"));
        assert_eq!(
            settings.metadata_url().unwrap().as_str(),
            "https://example.com/service/$metadata"
        );
    }

    #[test]
    fn normalize_keeps_trailing_slash() {
        let settings = ConnectionSettings::new("https://example.com/").normalize();
        assert_eq!(settings.url, "https://example.com/");
        assert_eq!(settings.auth, None);
    }

    #[test]
    fn invalid_url() {
        assert!(ConnectionSettings::new("not a url").normalize().service_url().is_err());
    }
}
