/// A possibly namespace-qualified name, split at the last `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedName<'a> {
    /// Namespace or alias, if the name was qualified.
    pub qualifier: Option<&'a str>,
    pub name: &'a str,
}

impl<'a> QualifiedName<'a> {
    pub fn parse(src: &'a str) -> Self {
        match src.rsplit_once('.') {
            Some((qualifier, name)) => Self {
                qualifier: Some(qualifier),
                name,
            },
            None => Self {
                qualifier: None,
                name: src,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let name = QualifiedName::parse("com.example.Order");
        assert_eq!(name.qualifier, Some("com.example"));
        assert_eq!(name.name, "Order");

        let name = QualifiedName::parse("Order");
        assert_eq!(name.qualifier, None);
        assert_eq!(name.name, "Order");
    }
}
