//! Multi-valued HTTP headers.
//!
//! Events deliver headers either as `{name: value}` or as
//! `{name: [value, ...]}`; responses hand back an ordered list that may repeat
//! a name. [`MultiValuedHeaders`] holds both losslessly, and the [`casing`]
//! submodule folds it back into whichever shape the outbound envelope needs.

pub mod casing;

pub use casing::{casing_slots, group_headers, split_headers, CasePermutations};

/// An HTTP header as a name-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered collection of HTTP headers.
///
/// Preserves insertion order and supports duplicate header names
/// (e.g., multiple `Set-Cookie` headers). Lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiValuedHeaders {
    entries: Vec<Header>,
}

impl MultiValuedHeaders {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build from a `{name: [values]}` map, keeping every value per name.
    pub fn from_multi<I, V>(map: I) -> Self
    where
        I: IntoIterator<Item = (String, V)>,
        V: IntoIterator<Item = String>,
    {
        let mut headers = Self::new();
        for (name, values) in map {
            for value in values {
                headers.append(name.clone(), value);
            }
        }
        headers
    }

    /// Build from a `{name: value}` map, each entry a one-element sequence.
    pub fn from_single<I>(map: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        map.into_iter().collect()
    }

    /// Add a value without touching existing entries of the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Header::new(name, value));
    }

    /// Get the first header value matching `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Get all header values matching `name` (case-insensitive).
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|h| h.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group values by case-insensitive name.
    ///
    /// One entry per distinct name, in order of first appearance, keyed by the
    /// casing that appeared first. Values keep their original order.
    pub fn grouped(&self) -> Vec<(String, Vec<String>)> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for header in &self.entries {
            match groups
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(&header.name))
            {
                Some((_, values)) => values.push(header.value.clone()),
                None => groups.push((header.name.clone(), vec![header.value.clone()])),
            }
        }
        groups
    }

    pub fn into_vec(self) -> Vec<Header> {
        self.entries
    }
}

impl FromIterator<Header> for MultiValuedHeaders {
    fn from_iter<I: IntoIterator<Item = Header>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, String)> for MultiValuedHeaders {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| Header::new(n, v))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_case_insensitive() {
        let mut headers = MultiValuedHeaders::new();
        headers.append("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert!(headers.contains("content-TYPE"));
        assert_eq!(headers.get("X-Missing"), None);
    }

    #[test]
    fn test_from_multi_keeps_every_value() {
        let headers = MultiValuedHeaders::from_multi(vec![
            (
                "Accept".to_string(),
                vec!["text/html".to_string(), "application/json".to_string()],
            ),
            ("Host".to_string(), vec!["example.com".to_string()]),
        ]);

        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("accept"), Some("text/html"));
        assert_eq!(headers.get_all("ACCEPT"), vec!["text/html", "application/json"]);
    }

    #[test]
    fn test_from_single_wraps_each_entry() {
        let headers = MultiValuedHeaders::from_single(vec![
            ("Host".to_string(), "example.com".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ]);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get_all("host"), vec!["example.com"]);
    }

    #[test]
    fn test_grouped_merges_differently_cased_names() {
        let mut headers = MultiValuedHeaders::new();
        headers.append("Set-Cookie", "a=1");
        headers.append("Content-Type", "text/plain");
        headers.append("set-cookie", "b=2");

        let grouped = headers.grouped();
        assert_eq!(
            grouped,
            vec![
                (
                    "Set-Cookie".to_string(),
                    vec!["a=1".to_string(), "b=2".to_string()]
                ),
                ("Content-Type".to_string(), vec!["text/plain".to_string()]),
            ]
        );
    }

    #[test]
    fn test_empty() {
        let headers = MultiValuedHeaders::new();
        assert!(headers.is_empty());
        assert!(headers.grouped().is_empty());
    }
}
