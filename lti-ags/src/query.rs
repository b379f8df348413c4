//! Query-string building for filtered AGS requests.

use url::form_urlencoded;

/// Ordered query builder: parameters appear in insertion order, values are
/// URL-encoded, `None` values are omitted entirely.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    pairs: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter when its value is present.
    pub fn param<T: ToString>(mut self, name: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.pairs.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Whether any parameter was appended.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The encoded query string, without a leading `?`. Empty when no
    /// parameter was appended.
    pub fn build(self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.pairs {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_parameters_are_omitted() {
        let query = QueryBuilder::new()
            .param("limit", Some(10))
            .param("page", None::<u32>)
            .param("userId", Some("u1"))
            .build();
        assert_eq!(query, "limit=10&userId=u1");
    }

    #[test]
    fn test_values_are_url_encoded() {
        let query = QueryBuilder::new()
            .param("tag", Some("week 1 & 2"))
            .build();
        assert_eq!(query, "tag=week+1+%26+2");
    }

    #[test]
    fn test_all_none_builds_empty() {
        let builder = QueryBuilder::new()
            .param("limit", None::<u32>)
            .param("tag", None::<String>);
        assert!(builder.is_empty());
        assert_eq!(builder.build(), "");
    }

    #[test]
    fn test_insertion_order_is_stable() {
        let query = QueryBuilder::new()
            .param("resourceLinkId", Some("rl"))
            .param("limit", Some(5))
            .param("tag", Some("quiz"))
            .build();
        assert_eq!(query, "resourceLinkId=rl&limit=5&tag=quiz");
    }
}
