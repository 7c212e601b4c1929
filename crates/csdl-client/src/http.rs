use crate::Result;
use async_trait::async_trait;
use std::fmt::Debug;
use url::Url;

/// The transport used to reach a service. Implementations map their own
/// failures to [`Error::http`](crate::Error::http).
#[async_trait]
pub trait HttpClient: Debug + Send + Sync {
    /// Issues a `GET` request with the given extra headers.
    async fn get(&self, url: &Url, headers: &[(String, String)]) -> Result<HttpResponse>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: vec![],
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the `Content-Type` is `application/xml` or `text/xml`,
    /// ignoring case and parameters such as `charset`.
    pub fn is_xml(&self) -> bool {
        let Some(content_type) = self.header("Content-Type") else {
            return false;
        };

        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        essence.eq_ignore_ascii_case("application/xml") || essence.eq_ignore_ascii_case("text/xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_content_types() {
        let xml = |value: &str| HttpResponse::new(200).with_header("content-type", value).is_xml();

        assert!(xml("application/xml"));
        assert!(xml("Application/XML; charset=utf-8"));
        assert!(xml("text/xml"));
        assert!(!xml("application/json"));
        assert!(!xml("application/xml+atom"));
        assert!(!HttpResponse::new(200).is_xml());
    }
}
