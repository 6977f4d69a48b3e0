use serde::Serialize;

use super::types::ComparisonRecord;

/// Active facet-value filters, kept in the order they were (last) added.
///
/// An empty set matches every record. Otherwise a record matches when any one of its
/// derived facet keys is in the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct FilterSet {
    values: Vec<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for value in values {
            set.add(value);
        }
        set
    }

    /// Parses a comma-separated query value such as `linux.chrome,1920x1080.full`.
    pub fn parse_query(raw: &str) -> Self {
        Self::from_values(
            raw.split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty()),
        )
    }

    /// Moves `value` to the end of the set, inserting it if needed.
    pub fn add(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.values.retain(|existing| existing != &value);
        self.values.push(value);
    }

    pub fn remove(&mut self, value: &str) {
        self.values.retain(|existing| existing != value);
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|existing| existing == value)
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn matches(&self, record: &ComparisonRecord) -> bool {
        if self.is_empty() {
            return true;
        }
        let keys = record.facet_keys();
        let matched = keys.iter().any(|key| self.contains(key));
        matched
    }
}
