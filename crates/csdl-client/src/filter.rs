use crate::{Error, Result};
use std::fmt;

/// A validated `$filter` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    expr: String,
}

impl Filter {
    /// Validates `expr`: it must not be blank, parentheses must balance
    /// outside string literals, and every string literal must be closed.
    /// Inside a literal `''` is an escaped quote.
    pub fn new(expr: impl Into<String>) -> Result<Filter> {
        let expr: String = expr.into();
        let expr = expr.trim().to_string();

        if expr.is_empty() {
            return Err(Error::invalid_filter("filter expression is empty"));
        }

        let mut depth = 0usize;
        let mut in_string = false;
        let mut chars = expr.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '\'' if in_string => {
                    if chars.peek().map(|(_, next)| *next) == Some('\'') {
                        chars.next();
                    } else {
                        in_string = false;
                    }
                }
                '\'' => in_string = true,
                '(' if !in_string => depth += 1,
                ')' if !in_string => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        Error::invalid_filter(format!("unbalanced `)` at offset {pos}"))
                    })?;
                }
                _ => {}
            }
        }

        if in_string {
            return Err(Error::invalid_filter("unterminated string literal"));
        }

        if depth > 0 {
            return Err(Error::invalid_filter(format!("{depth} unclosed `(`")));
        }

        Ok(Filter { expr })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// The expression encoded as a URI component.
    pub fn encoded(&self) -> String {
        urlencoding::encode(&self.expr).into_owned()
    }

    /// `$filter=<encoded>`, ready to append to a query string.
    pub fn query_option(&self) -> String {
        format!("$filter={}", self.encoded())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encodes() {
        let filter = Filter::new(" Name eq 'O''Neil' and (Price gt 10) ").unwrap();
        assert_eq!(filter.as_str(), "Name eq 'O''Neil' and (Price gt 10)");
        assert_eq!(
            filter.encoded(),
            "Name%20eq%20%27O%27%27Neil%27%20and%20%28Price%20gt%2010%29"
        );
        assert!(filter.query_option().starts_with("$filter=Name%20eq"));
    }

    #[test]
    fn parentheses_inside_literals_are_ignored() {
        assert!(Filter::new("Name eq ':-)'").is_ok());
    }

    #[test]
    fn rejects() {
        for expr in ["", "   ", "(a eq 1", "a eq 1)", "Name eq 'x", "Name eq 'it''s"] {
            let err = Filter::new(expr).unwrap_err();
            assert!(err.is_invalid_filter(), "{expr}: {err}");
        }
    }
}
