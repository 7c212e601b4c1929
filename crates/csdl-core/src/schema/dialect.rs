use serde::{Deserialize, Serialize};

/// The metadata dialect a schema was produced by. Carried on every
/// [`Schema`](super::Schema) and used to pick the vendor extender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// OASIS CSDL (OData V4) with vocabulary annotations.
    Oasis,

    /// The NorthWind/SAP flavor (OData V2) with `sap:` attributes.
    Sap,
}

impl Dialect {
    /// Picks the dialect from the `edmx:Edmx` `Version` attribute.
    pub fn from_version(version: &str) -> Option<Dialect> {
        match version.trim() {
            "1.0" | "2.0" | "3.0" => Some(Dialect::Sap),
            "4.0" | "4.01" => Some(Dialect::Oasis),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Oasis => "oasis",
            Dialect::Sap => "sap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_version() {
        assert_eq!(Dialect::from_version("1.0"), Some(Dialect::Sap));
        assert_eq!(Dialect::from_version("4.01"), Some(Dialect::Oasis));
        assert_eq!(Dialect::from_version("5.0"), None);
    }
}
