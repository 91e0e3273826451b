//! Route definitions and the ordered route table

use serde::Serialize;
use tracing::debug;

use super::{DEFAULT_ROUTE, RouterError};

/// A named category the classifier can pick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDefinition {
    name: String,
    description: String,
    keywords: Vec<String>,
}

impl RouteDefinition {
    pub fn new<I, S>(name: impl Into<String>, description: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shown to the classifier to steer its choice
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Documentation only; never used for matching
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl std::fmt::Display for RouteDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "- {}: {}", self.name, self.description)
    }
}

/// Routes in configuration order
///
/// Names are unique, lowercase and trimmed, and exactly one is `default`.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDefinition>) -> Result<Self, RouterError> {
        debug!(route_count = routes.len(), "RouteTable::new: called");
        for (i, route) in routes.iter().enumerate() {
            let name = route.name();
            if name.is_empty() || name != name.trim() || name != name.to_lowercase() {
                return Err(RouterError::InvalidRouteName(name.to_string()));
            }
            if routes[..i].iter().any(|r| r.name() == name) {
                return Err(RouterError::DuplicateRoute(name.to_string()));
            }
        }
        if !routes.iter().any(|r| r.name() == DEFAULT_ROUTE) {
            return Err(RouterError::MissingDefaultRoute);
        }
        Ok(Self { routes })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.iter().any(|r| r.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// One `- {name}: {description}` line per route, in order
    pub fn describe(&self) -> String {
        self.routes.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str) -> RouteDefinition {
        RouteDefinition::new(name, format!("{} desc", name), ["kw"])
    }

    #[test]
    fn test_table_keeps_order() {
        let table = RouteTable::new(vec![route("b"), route("default"), route("a")]).unwrap();
        assert_eq!(table.names(), vec!["b", "default", "a"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_describe() {
        let table = RouteTable::new(vec![route("psicologia"), route("default")]).unwrap();
        assert_eq!(table.describe(), "- psicologia: psicologia desc\n- default: default desc");
    }

    #[test]
    fn test_missing_default() {
        let err = RouteTable::new(vec![route("psicologia")]).unwrap_err();
        assert!(matches!(err, RouterError::MissingDefaultRoute));
    }

    #[test]
    fn test_duplicate_default() {
        let err = RouteTable::new(vec![route("default"), route("default")]).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute(ref n) if n == "default"));
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["", "Psicologia", " psicologia", "psicologia\n"] {
            let err = RouteTable::new(vec![route(bad), route("default")]).unwrap_err();
            assert!(matches!(err, RouterError::InvalidRouteName(_)), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_keywords_are_kept() {
        let def = RouteDefinition::new("pediatria", "crianças", ["filho", "bebê"]);
        assert_eq!(def.keywords(), &["filho".to_string(), "bebê".to_string()]);
        assert_eq!(def.to_string(), "- pediatria: crianças");
    }
}
