use crate::schema::{QualifiedName, Schema};
use std::fmt;

/// Annotation vocabularies the extension layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    Common,
    UI,
    Core,
    Capabilities,
    Measures,
    Other,
}

/// An annotation term with its vocabulary resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term<'a> {
    pub vocabulary: Vocabulary,
    pub name: &'a str,
}

const VOCABULARIES: &[(Vocabulary, &str, &str)] = &[
    (Vocabulary::Common, "com.sap.vocabularies.Common.v1", "Common"),
    (Vocabulary::UI, "com.sap.vocabularies.UI.v1", "UI"),
    (Vocabulary::Core, "Org.OData.Core.V1", "Core"),
    (Vocabulary::Capabilities, "Org.OData.Capabilities.V1", "Capabilities"),
    (Vocabulary::Measures, "Org.OData.Measures.V1", "Measures"),
];

impl Vocabulary {
    pub fn namespace(self) -> Option<&'static str> {
        VOCABULARIES
            .iter()
            .find(|(vocabulary, ..)| *vocabulary == self)
            .map(|(_, namespace, _)| *namespace)
    }

    /// Conventional alias, used when displaying terms.
    pub fn alias(self) -> Option<&'static str> {
        VOCABULARIES
            .iter()
            .find(|(vocabulary, ..)| *vocabulary == self)
            .map(|(.., alias)| *alias)
    }

    fn from_namespace(namespace: &str) -> Option<Self> {
        VOCABULARIES
            .iter()
            .find(|(_, ns, _)| *ns == namespace)
            .map(|(vocabulary, ..)| *vocabulary)
    }

    fn from_conventional_alias(alias: &str) -> Option<Self> {
        VOCABULARIES
            .iter()
            .find(|(.., a)| *a == alias)
            .map(|(vocabulary, ..)| *vocabulary)
    }
}

impl<'a> Term<'a> {
    /// Resolves the vocabulary of `term`. The qualifier may be a vocabulary
    /// namespace, an alias declared by the document, or one of the
    /// conventional aliases (`Common`, `UI`, ...).
    pub fn resolve(term: &'a str, schema: &Schema) -> Self {
        let qualified = QualifiedName::parse(term);

        let vocabulary = qualified
            .qualifier
            .and_then(|qualifier| {
                Vocabulary::from_namespace(qualifier)
                    .or_else(|| {
                        schema
                            .vocabulary_aliases
                            .get(qualifier)
                            .and_then(|namespace| Vocabulary::from_namespace(namespace))
                    })
                    .or_else(|| Vocabulary::from_conventional_alias(qualifier))
            })
            .unwrap_or(Vocabulary::Other);

        Self {
            vocabulary,
            name: qualified.name,
        }
    }

    pub fn is(&self, vocabulary: Vocabulary, name: &str) -> bool {
        self.vocabulary == vocabulary && self.name == name
    }
}

impl fmt::Display for Term<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vocabulary.alias() {
            Some(alias) => write!(f, "{alias}.{}", self.name),
            None => f.write_str(self.name),
        }
    }
}
