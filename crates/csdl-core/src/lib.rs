#[macro_use]
mod error;
pub use error::{Error, IntoError};

pub mod extend;
pub use extend::{Extensions, Registry, Settings};

pub mod raw;

pub mod schema;
pub use schema::{Metadata, Schema};

/// A Result type alias that uses the crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
