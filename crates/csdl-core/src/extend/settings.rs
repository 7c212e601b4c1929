use crate::{schema::Dialect, Result};
use serde::{Deserialize, Serialize};

/// Options controlling how vendor extensions are applied.
///
/// Deserializes from a configuration file; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Fail on the first malformed annotation instead of skipping it with a
    /// warning.
    pub strict: bool,

    /// Dialects whose extender may run.
    pub dialects: DialectSet,

    /// Decode `UI.LineItem` collections.
    pub line_item: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DialectSet {
    pub oasis: bool,
    pub sap: bool,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(src: &str) -> Result<Self> {
        Ok(serde_json::from_str(src)?)
    }

    pub fn strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    pub fn dialects(&mut self, dialects: DialectSet) -> &mut Self {
        self.dialects = dialects;
        self
    }

    pub fn line_item(&mut self, line_item: bool) -> &mut Self {
        self.line_item = line_item;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict: false,
            dialects: DialectSet::ALL,
            line_item: true,
        }
    }
}

impl DialectSet {
    pub const ALL: Self = Self {
        oasis: true,
        sap: true,
    };

    pub const NONE: Self = Self {
        oasis: false,
        sap: false,
    };

    pub fn only(dialect: Dialect) -> Self {
        let mut set = Self::NONE;
        match dialect {
            Dialect::Oasis => set.oasis = true,
            Dialect::Sap => set.sap = true,
        }
        set
    }

    pub fn contains(self, dialect: Dialect) -> bool {
        match dialect {
            Dialect::Oasis => self.oasis,
            Dialect::Sap => self.sap,
        }
    }
}

impl Default for DialectSet {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_empty_config() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(!settings.strict);
        assert!(settings.dialects.contains(Dialect::Sap));
    }

    #[test]
    fn partial_config() {
        let settings =
            Settings::from_json(r#"{ "strict": true, "dialects": { "sap": false } }"#).unwrap();
        assert!(settings.strict);
        assert!(settings.dialects.contains(Dialect::Oasis));
        assert!(!settings.dialects.contains(Dialect::Sap));
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(Settings::from_json(r#"{ "stritc": true }"#).is_err());
    }

    #[test]
    fn setters_chain() {
        let mut settings = Settings::new();
        settings.strict(true).dialects(DialectSet::only(Dialect::Oasis));
        assert!(settings.strict);
        assert!(!settings.dialects.contains(Dialect::Sap));
    }
}
