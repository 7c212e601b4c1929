/// `Edm.*` simple types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Binary,
    Boolean,
    Byte,
    Date,
    /// OData V2 only.
    DateTime,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    /// OData V2 only.
    Time,
    TimeOfDay,
    /// Any `Edm.Geography*` type.
    Geography,
    /// Any `Edm.Geometry*` type.
    Geometry,
}

impl PrimitiveType {
    /// Parses a qualified `Edm.*` name. Returns `None` for names outside the
    /// `Edm` namespace or unknown `Edm` types.
    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        use PrimitiveType::*;

        let local = name.strip_prefix("Edm.")?;

        Some(match local {
            "Binary" => Binary,
            "Boolean" => Boolean,
            "Byte" => Byte,
            "Date" => Date,
            "DateTime" => DateTime,
            "DateTimeOffset" => DateTimeOffset,
            "Decimal" => Decimal,
            "Double" => Double,
            "Duration" => Duration,
            "Guid" => Guid,
            "Int16" => Int16,
            "Int32" => Int32,
            "Int64" => Int64,
            "SByte" => SByte,
            "Single" => Single,
            "Stream" => Stream,
            "String" => String,
            "Time" => Time,
            "TimeOfDay" => TimeOfDay,
            _ if local.starts_with("Geography") => Geography,
            _ if local.starts_with("Geometry") => Geometry,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        use PrimitiveType::*;

        match self {
            Binary => "Edm.Binary",
            Boolean => "Edm.Boolean",
            Byte => "Edm.Byte",
            Date => "Edm.Date",
            DateTime => "Edm.DateTime",
            DateTimeOffset => "Edm.DateTimeOffset",
            Decimal => "Edm.Decimal",
            Double => "Edm.Double",
            Duration => "Edm.Duration",
            Guid => "Edm.Guid",
            Int16 => "Edm.Int16",
            Int32 => "Edm.Int32",
            Int64 => "Edm.Int64",
            SByte => "Edm.SByte",
            Single => "Edm.Single",
            Stream => "Edm.Stream",
            String => "Edm.String",
            Time => "Edm.Time",
            TimeOfDay => "Edm.TimeOfDay",
            Geography => "Edm.Geography",
            Geometry => "Edm.Geometry",
        }
    }

    pub fn is_numeric(self) -> bool {
        use PrimitiveType::*;

        matches!(
            self,
            Byte | Decimal | Double | Int16 | Int32 | Int64 | SByte | Single
        )
    }

    /// Types an enum type may declare as its underlying type.
    pub fn is_integral(self) -> bool {
        use PrimitiveType::*;

        matches!(self, Byte | SByte | Int16 | Int32 | Int64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!(PrimitiveType::from_name("Edm.String"), Some(PrimitiveType::String));
        assert_eq!(PrimitiveType::from_name("Edm.DateTime"), Some(PrimitiveType::DateTime));
        assert_eq!(
            PrimitiveType::from_name("Edm.GeographyPoint"),
            Some(PrimitiveType::Geography)
        );
        assert_eq!(PrimitiveType::from_name("Edm.Unknown"), None);
        assert_eq!(PrimitiveType::from_name("NS.String"), None);
    }

    #[test]
    fn name_round_trips_for_plain_types() {
        assert_eq!(PrimitiveType::Int32.name(), "Edm.Int32");
        assert!(PrimitiveType::Int64.is_integral());
        assert!(!PrimitiveType::Double.is_integral());
        assert!(PrimitiveType::Double.is_numeric());
    }
}
