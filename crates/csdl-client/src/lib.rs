//! Boundary collaborators for talking to an OData service: authentication
//! negotiation, batch sub-response headers and `$filter` construction.
//!
//! Network I/O stays behind the [`HttpClient`] trait.

pub mod auth;
pub use auth::{negotiate, AuthHeaders, AuthStrategy, BasicAuth, Negotiated, NoAuth};

mod batch;
pub use batch::BatchHeaders;

mod filter;
pub use filter::Filter;

mod http;
pub use http::{HttpClient, HttpResponse};

mod settings;
pub use settings::ConnectionSettings;

pub use async_trait::async_trait;
pub use csdl_core::{Error, Result};
