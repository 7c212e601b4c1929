//! Authentication strategies and their negotiation.
//!
//! A strategy probes the service with its credentials. It succeeds when the
//! probe answers `200` with an XML body, and fails with
//! [`Error::unsupported`](crate::Error::unsupported) otherwise so the next
//! strategy can be tried.

use crate::{ConnectionSettings, Error, HttpClient, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use std::fmt::Debug;
use url::Url;

#[async_trait]
pub trait AuthStrategy: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Probes `probe_url` and returns the headers to send with every later
    /// request.
    async fn authenticate(
        &self,
        settings: &ConnectionSettings,
        client: &dyn HttpClient,
        probe_url: &Url,
    ) -> Result<AuthHeaders>;
}

/// Headers that authenticate requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthHeaders(pub Vec<(String, String)>);

/// The outcome of [`negotiate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub strategy: &'static str,
    pub headers: AuthHeaders,
}

/// Sends no credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuth;

/// HTTP basic authentication from the settings' username and password.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicAuth;

impl AuthHeaders {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }
}

/// Issues the probe and checks its answer.
async fn probe(
    strategy: &str,
    client: &dyn HttpClient,
    probe_url: &Url,
    headers: AuthHeaders,
) -> Result<AuthHeaders> {
    let response = client.get(probe_url, headers.as_slice()).await?;

    if response.status != 200 {
        return Err(Error::unsupported(format!(
            "{strategy} authentication: probe answered status {}",
            response.status
        )));
    }

    if !response.is_xml() {
        return Err(Error::unsupported(format!(
            "{strategy} authentication: probe answered content type `{}`",
            response.header("Content-Type").unwrap_or("<none>")
        )));
    }

    Ok(headers)
}

#[async_trait]
impl AuthStrategy for NoAuth {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn authenticate(
        &self,
        _settings: &ConnectionSettings,
        client: &dyn HttpClient,
        probe_url: &Url,
    ) -> Result<AuthHeaders> {
        probe(self.name(), client, probe_url, AuthHeaders::none()).await
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn authenticate(
        &self,
        settings: &ConnectionSettings,
        client: &dyn HttpClient,
        probe_url: &Url,
    ) -> Result<AuthHeaders> {
        let (Some(username), Some(password)) = (&settings.username, &settings.password) else {
            return Err(Error::unsupported(
                "basic authentication needs a username and a password",
            ));
        };

        let credentials = general_purpose::STANDARD.encode(format!("{username}:{password}"));
        let headers = AuthHeaders(vec![(
            "Authorization".to_string(),
            format!("Basic {credentials}"),
        )]);

        probe(self.name(), client, probe_url, headers).await
    }
}

/// Tries `strategies` in order and returns the first that succeeds.
///
/// When the settings name an auth kind only the strategy of that name,
/// compared ignoring ASCII case, is tried. Errors other than `unsupported`
/// end the negotiation.
pub async fn negotiate(
    strategies: &[&dyn AuthStrategy],
    settings: &ConnectionSettings,
    client: &dyn HttpClient,
    probe_url: &Url,
) -> Result<Negotiated> {
    let mut tried = vec![];

    for strategy in strategies {
        if settings
            .auth
            .as_deref()
            .is_some_and(|auth| !auth.eq_ignore_ascii_case(strategy.name()))
        {
            continue;
        }

        tried.push(strategy.name());

        match strategy.authenticate(settings, client, probe_url).await {
            Ok(headers) => {
                tracing::debug!(strategy = strategy.name(), url = %probe_url, "authenticated");
                return Ok(Negotiated {
                    strategy: strategy.name(),
                    headers,
                });
            }
            Err(err) if err.is_unsupported() => {
                tracing::debug!(strategy = strategy.name(), error = %err, "strategy rejected");
            }
            Err(err) => return Err(err),
        }
    }

    if tried.is_empty() {
        return Err(Error::unsupported(format!(
            "no authentication strategy named `{}`",
            settings.auth.as_deref().unwrap_or_default()
        )));
    }

    Err(Error::unsupported(format!(
        "no authentication strategy succeeded (tried {})",
        tried.join(", ")
    )))
}
