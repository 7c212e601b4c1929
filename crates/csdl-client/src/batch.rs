/// Headers of one sub-response of a multipart `$batch` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchHeaders {
    headers: Vec<(String, String)>,
}

impl BatchHeaders {
    /// Parses `Name: value` lines. Lines without a colon, such as the status
    /// line, are skipped.
    pub fn parse<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let headers = lines
            .into_iter()
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                let name = name.trim();
                (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
            })
            .collect();

        Self { headers }
    }

    /// The first value of `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Headers in the order they appeared.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_and_lookup() {
        let headers = BatchHeaders::parse([
            "HTTP/1.1 200 OK",
            "Content-Type: application/json",
            "DataServiceVersion: 2.0",
            "content-type: text/plain",
            "Location: https://host/Orders('1')",
        ]);

        assert_eq!(headers.len(), 4);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(headers.get("location"), Some("https://host/Orders('1')"));
        assert_eq!(headers.get("ETag"), None);

        let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            ["Content-Type", "DataServiceVersion", "content-type", "Location"]
        );
    }

    #[test]
    fn empty() {
        let headers = BatchHeaders::parse(std::iter::empty());
        assert!(headers.is_empty());
    }
}
