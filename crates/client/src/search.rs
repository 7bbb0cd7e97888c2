//! Search parameters.

use crate::rest_url::{RestUrl, params};

/// Criteria, sort key, includes and page size of a search.
///
/// Parameters are written in the order `_count`, `_sort`, criteria,
/// `_include`; criteria keep the order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    criteria: Vec<(String, String)>,
    sort: Option<String>,
    includes: Vec<String>,
    count: Option<u32>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `name=value` criterion. Names may repeat.
    pub fn criterion(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.criteria.push((name.into(), value.into()));
        self
    }

    pub fn sort(mut self, key: impl Into<String>) -> Self {
        self.sort = Some(key.into());
        self
    }

    pub fn include(mut self, path: impl Into<String>) -> Self {
        self.includes.push(path.into());
        self
    }

    pub fn includes<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Page size.
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty() && self.sort.is_none() && self.includes.is_empty() && self.count.is_none()
    }

    pub(crate) fn apply(&self, mut url: RestUrl) -> RestUrl {
        if let Some(count) = self.count {
            url.push_param(params::COUNT, count.to_string());
        }
        if let Some(sort) = &self.sort {
            url.push_param(params::SORT, sort.as_str());
        }
        for (name, value) in &self.criteria {
            url.push_param(name.as_str(), value.as_str());
        }
        for include in &self.includes {
            url.push_param(params::INCLUDE, include.as_str());
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Endpoint;

    #[test]
    fn test_parameter_order() {
        let endpoint = Endpoint::parse("http://example.org/fhir/").unwrap();
        let search = SearchParams::new()
            .include("Patient.managingOrganization")
            .criterion("family", "Chalmers")
            .criterion("gender", "male")
            .sort("birthdate")
            .count(20);

        let url = search.apply(RestUrl::search(&endpoint, "Patient")).into_url();
        assert_eq!(
            url.query(),
            Some("_count=20&_sort=birthdate&family=Chalmers&gender=male&_include=Patient.managingOrganization")
        );
    }

    #[test]
    fn test_empty_search() {
        let search = SearchParams::new();
        assert!(search.is_empty());
        assert!(!search.count(5).is_empty());
    }
}
