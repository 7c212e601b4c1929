use crate::{
    schema::{AnnotationValue, Record},
    Error, Result,
};

/// A decoded `UI.DataFieldAbstract` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataField {
    /// `UI.DataField`
    Value { common: DataFieldCommon, value: String },

    /// `UI.DataFieldForAnnotation`
    ForAnnotation { common: DataFieldCommon, target: String },

    /// `UI.DataFieldForAction`
    ForAction { common: DataFieldCommon, action: String },

    /// `UI.DataFieldForIntentBasedNavigation`
    ForIntentBasedNavigation {
        common: DataFieldCommon,
        semantic_object: String,
        action: Option<String>,
    },

    /// `UI.DataFieldWithAction`
    WithAction {
        common: DataFieldCommon,
        value: String,
        action: String,
    },

    /// `UI.DataFieldWithIntentBasedNavigation`
    WithIntentBasedNavigation {
        common: DataFieldCommon,
        value: String,
        semantic_object: String,
        action: Option<String>,
    },

    /// `UI.DataFieldWithNavigationPath`
    WithNavigationPath {
        common: DataFieldCommon,
        value: String,
        target: String,
    },

    /// `UI.DataFieldWithUrl`
    WithUrl {
        common: DataFieldCommon,
        value: String,
        url: String,
    },
}

/// Properties shared by every data field variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFieldCommon {
    pub label: Option<String>,
    pub criticality: Option<String>,
    pub icon_url: Option<String>,
}

const DATA_FIELD: &str = "DataField";
const FOR_ANNOTATION: &str = "DataFieldForAnnotation";
const FOR_ACTION: &str = "DataFieldForAction";
const FOR_INTENT_BASED_NAVIGATION: &str = "DataFieldForIntentBasedNavigation";
const WITH_ACTION: &str = "DataFieldWithAction";
const WITH_INTENT_BASED_NAVIGATION: &str = "DataFieldWithIntentBasedNavigation";
const WITH_NAVIGATION_PATH: &str = "DataFieldWithNavigationPath";
const WITH_URL: &str = "DataFieldWithUrl";

impl DataField {
    /// Decodes a data field record. `term` names the enclosing annotation
    /// and is only used for error reporting.
    ///
    /// The variant is chosen by the record's shape. A `SemanticObject`
    /// selects intent based navigation. Otherwise `Action`, `Target` and
    /// `Url` each select a variant, paired with whether a `Value` is
    /// present. A record carrying more than one of those is only accepted
    /// when its `Type` names one of the candidates.
    pub fn from_record(record: &Record, term: &str) -> Result<DataField> {
        let candidates = Self::candidates(record);

        let chosen = match (candidates.as_slice(), record.type_name()) {
            ([], _) => {
                return Err(Error::annotation_shape(
                    term,
                    "record matches no data field variant",
                ))
            }
            ([only], None) => *only,
            ([only], Some(ty)) if ty == *only => *only,
            ([only], Some(ty)) => {
                return Err(Error::annotation_shape(
                    term,
                    format!(
                        "record type `{ty}` contradicts its properties, \
                         which describe a `{only}`"
                    ),
                ))
            }
            (many, Some(ty)) if many.iter().any(|candidate| *candidate == ty) => ty,
            (many, _) => {
                return Err(Error::ambiguous_annotation(
                    term,
                    format!("record could be any of {}", many.join(", ")),
                ))
            }
        };

        Self::build(chosen, record, term)
    }

    /// Decodes an arbitrary annotation value, which must be a record.
    pub fn from_value(value: &AnnotationValue, term: &str) -> Result<DataField> {
        match value.as_record() {
            Some(record) => Self::from_record(record, term),
            None => Err(Error::annotation_shape(
                term,
                format!("expected a data field record, found {}", value.kind_name()),
            )),
        }
    }

    fn candidates(record: &Record) -> Vec<&'static str> {
        let has_value = record.has("Value");

        if record.has("SemanticObject") {
            return vec![if has_value {
                WITH_INTENT_BASED_NAVIGATION
            } else {
                FOR_INTENT_BASED_NAVIGATION
            }];
        }

        let mut candidates = vec![];

        if record.has("Action") {
            candidates.push(if has_value { WITH_ACTION } else { FOR_ACTION });
        }

        if record.has("Target") {
            candidates.push(if has_value {
                WITH_NAVIGATION_PATH
            } else {
                FOR_ANNOTATION
            });
        }

        if record.has("Url") {
            candidates.push(WITH_URL);
        }

        if candidates.is_empty() {
            candidates.push(DATA_FIELD);
        }

        candidates
    }

    fn build(variant: &str, record: &Record, term: &str) -> Result<DataField> {
        let fields = Fields { record, term };
        let common = DataFieldCommon {
            label: fields.optional("Label")?,
            criticality: fields.optional("Criticality")?,
            icon_url: fields.optional("IconUrl")?,
        };

        Ok(match variant {
            DATA_FIELD => Self::Value {
                common,
                value: fields.required("Value")?,
            },
            FOR_ANNOTATION => Self::ForAnnotation {
                common,
                target: fields.required_path("Target")?,
            },
            FOR_ACTION => Self::ForAction {
                common,
                action: fields.required("Action")?,
            },
            FOR_INTENT_BASED_NAVIGATION => Self::ForIntentBasedNavigation {
                common,
                semantic_object: fields.required("SemanticObject")?,
                action: fields.optional("Action")?,
            },
            WITH_ACTION => Self::WithAction {
                common,
                value: fields.required("Value")?,
                action: fields.required("Action")?,
            },
            WITH_INTENT_BASED_NAVIGATION => Self::WithIntentBasedNavigation {
                common,
                value: fields.required("Value")?,
                semantic_object: fields.required("SemanticObject")?,
                action: fields.optional("Action")?,
            },
            WITH_NAVIGATION_PATH => Self::WithNavigationPath {
                common,
                value: fields.required("Value")?,
                target: fields.required_path("Target")?,
            },
            WITH_URL => Self::WithUrl {
                common,
                value: fields.required("Value")?,
                url: fields.required("Url")?,
            },
            other => {
                return Err(Error::annotation_shape(
                    term,
                    format!("`{other}` is not a data field type"),
                ))
            }
        })
    }

    /// The vocabulary record type this variant corresponds to.
    pub fn record_type(&self) -> &'static str {
        match self {
            Self::Value { .. } => DATA_FIELD,
            Self::ForAnnotation { .. } => FOR_ANNOTATION,
            Self::ForAction { .. } => FOR_ACTION,
            Self::ForIntentBasedNavigation { .. } => FOR_INTENT_BASED_NAVIGATION,
            Self::WithAction { .. } => WITH_ACTION,
            Self::WithIntentBasedNavigation { .. } => WITH_INTENT_BASED_NAVIGATION,
            Self::WithNavigationPath { .. } => WITH_NAVIGATION_PATH,
            Self::WithUrl { .. } => WITH_URL,
        }
    }

    pub fn common(&self) -> &DataFieldCommon {
        match self {
            Self::Value { common, .. }
            | Self::ForAnnotation { common, .. }
            | Self::ForAction { common, .. }
            | Self::ForIntentBasedNavigation { common, .. }
            | Self::WithAction { common, .. }
            | Self::WithIntentBasedNavigation { common, .. }
            | Self::WithNavigationPath { common, .. }
            | Self::WithUrl { common, .. } => common,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.common().label.as_deref()
    }

    /// The displayed value, for the variants that carry one.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value { value, .. }
            | Self::WithAction { value, .. }
            | Self::WithIntentBasedNavigation { value, .. }
            | Self::WithNavigationPath { value, .. }
            | Self::WithUrl { value, .. } => Some(value),
            _ => None,
        }
    }
}

struct Fields<'a> {
    record: &'a Record,
    term: &'a str,
}

impl Fields<'_> {
    fn optional(&self, name: &str) -> Result<Option<String>> {
        match self.record.get(name) {
            None => Ok(None),
            Some(value) => match value.as_str() {
                Some(text) => Ok(Some(text.to_string())),
                None => Err(Error::annotation_shape(
                    self.term,
                    format!("`{name}` must be a string or path, found {}", value.kind_name()),
                )),
            },
        }
    }

    fn required(&self, name: &str) -> Result<String> {
        self.optional(name)?.ok_or_else(|| {
            Error::annotation_shape(self.term, format!("missing required property `{name}`"))
        })
    }

    fn required_path(&self, name: &str) -> Result<String> {
        let value = self.record.get(name).ok_or_else(|| {
            Error::annotation_shape(self.term, format!("missing required property `{name}`"))
        })?;

        value.as_path().map(str::to_string).ok_or_else(|| {
            Error::annotation_shape(
                self.term,
                format!("`{name}` must be a path, found {}", value.kind_name()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(ty: Option<&str>, properties: &[(&str, AnnotationValue)]) -> Record {
        Record {
            ty: ty.map(str::to_string),
            properties: properties
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }

    fn path(value: &str) -> AnnotationValue {
        AnnotationValue::Path(value.to_string())
    }

    fn string(value: &str) -> AnnotationValue {
        AnnotationValue::String(value.to_string())
    }

    #[test]
    fn plain_value() {
        let field = DataField::from_record(
            &record(None, &[("Value", path("name")), ("Label", string("Name"))]),
            "UI.LineItem",
        )
        .unwrap();

        assert_eq!(field.record_type(), "DataField");
        assert_eq!(field.value(), Some("name"));
        assert_eq!(field.label(), Some("Name"));
    }

    #[test]
    fn semantic_object_wins() {
        let with = DataField::from_record(
            &record(
                None,
                &[
                    ("SemanticObject", string("Customer")),
                    ("Action", string("display")),
                    ("Value", path("customer")),
                ],
            ),
            "UI.LineItem",
        )
        .unwrap();
        assert_eq!(with.record_type(), "DataFieldWithIntentBasedNavigation");

        let for_ = DataField::from_record(
            &record(None, &[("SemanticObject", string("Customer"))]),
            "UI.LineItem",
        )
        .unwrap();
        assert_eq!(
            for_,
            DataField::ForIntentBasedNavigation {
                common: DataFieldCommon::default(),
                semantic_object: "Customer".into(),
                action: None,
            }
        );
    }

    #[test]
    fn single_marker_selects_variant() {
        let cases = [
            (vec![("Action", string("approve"))], "DataFieldForAction"),
            (
                vec![("Action", string("approve")), ("Value", path("id"))],
                "DataFieldWithAction",
            ),
            (
                vec![("Target", AnnotationValue::AnnotationPath("@UI.Chart".into()))],
                "DataFieldForAnnotation",
            ),
            (
                vec![
                    ("Target", AnnotationValue::NavigationPropertyPath("items".into())),
                    ("Value", path("id")),
                ],
                "DataFieldWithNavigationPath",
            ),
            (
                vec![("Url", string("https://example.com")), ("Value", path("id"))],
                "DataFieldWithUrl",
            ),
        ];

        for (properties, expected) in cases {
            let field = DataField::from_record(&record(None, &properties), "UI.LineItem").unwrap();
            assert_eq!(field.record_type(), expected);
        }
    }

    #[test]
    fn action_and_url_without_type_is_ambiguous() {
        let err = DataField::from_record(
            &record(
                None,
                &[("Action", string("approve")), ("Url", string("https://example.com"))],
            ),
            "UI.LineItem",
        )
        .unwrap_err();

        assert!(err.is_ambiguous_annotation());
        assert!(err.is_annotation_shape());
    }

    #[test]
    fn type_disambiguates() {
        let field = DataField::from_record(
            &record(
                Some("UI.DataFieldForAction"),
                &[("Action", string("approve")), ("Url", string("https://example.com"))],
            ),
            "UI.LineItem",
        )
        .unwrap();

        assert_eq!(
            field,
            DataField::ForAction {
                common: DataFieldCommon::default(),
                action: "approve".into(),
            }
        );
    }

    #[test]
    fn contradicting_type_is_rejected() {
        let err = DataField::from_record(
            &record(Some("UI.DataFieldWithUrl"), &[("Value", path("id"))]),
            "UI.LineItem",
        )
        .unwrap_err();

        assert!(err.is_annotation_shape());
        assert!(!err.is_ambiguous_annotation());
    }

    #[test]
    fn missing_value() {
        let err = DataField::from_record(&record(None, &[("Label", string("x"))]), "UI.LineItem")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed annotation `UI.LineItem`: missing required property `Value`"
        );

        let err = DataField::from_record(&record(None, &[("Url", string("x"))]), "UI.LineItem")
            .unwrap_err();
        assert!(err.is_annotation_shape());
    }

    #[test]
    fn non_record() {
        let err = DataField::from_value(&string("x"), "UI.LineItem").unwrap_err();
        assert!(err.is_annotation_shape());
    }
}
