use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::pattern::{split, PathPattern};
use super::routes::{portal_routes, Page, RouteRecord};
use crate::error::RouteError;

#[derive(Debug, Clone)]
struct Route {
    name: Option<&'static str>,
    page: Page,
    pattern: PathPattern,
}

/// The outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub page: Page,
    pub name: Option<&'static str>,
    /// Pattern the path matched, e.g. `/gat/:courseName`.
    pub pattern: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn is_not_found(&self) -> bool {
        self.page == Page::NotFound
    }
}

/// Flattened route tree, most specific pattern first.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::portal()
    }
}

impl RouteTable {
    pub fn portal() -> Self {
        Self::from_records(&portal_routes())
    }

    pub fn from_records(records: &[RouteRecord]) -> Self {
        let mut routes = Vec::new();
        flatten("", records, &mut routes);
        // Stable, so equally specific routes keep declaration order.
        routes.sort_by(|a, b| a.pattern.specificity_cmp(&b.pattern));
        RouteTable { routes }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the page for `path`. Query string and fragment are ignored.
    /// Paths nothing matches resolve to [`Page::NotFound`].
    pub fn resolve(&self, path: &str) -> RouteMatch {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = split(path).collect();

        for route in &self.routes {
            if let Some(params) = route.pattern.matches(&segments) {
                debug!(path, pattern = route.pattern.as_str(), "route matched");
                return RouteMatch {
                    page: route.page,
                    name: route.name,
                    pattern: route.pattern.as_str().to_string(),
                    params: params.into_iter().collect(),
                };
            }
        }

        debug!(path, "no route matched");
        RouteMatch {
            page: Page::NotFound,
            name: None,
            pattern: String::new(),
            params: BTreeMap::new(),
        }
    }

    /// Build the path of the route called `name`, percent-encoding the
    /// parameter values.
    pub fn path_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouteError> {
        let route = self
            .routes
            .iter()
            .find(|route| route.name == Some(name))
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

        let lookup = |param: &str| {
            params
                .iter()
                .find(|(key, _)| *key == param)
                .map(|(_, value)| *value)
        };
        route
            .pattern
            .build(lookup)
            .map_err(|param| RouteError::MissingParam {
                route: name.to_string(),
                param,
            })
    }

    /// `(pattern, name, page)` for every route, in matching order.
    pub fn entries(&self) -> impl Iterator<Item = (&PathPattern, Option<&'static str>, Page)> {
        self.routes
            .iter()
            .map(|route| (&route.pattern, route.name, route.page))
    }
}

fn join(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child)
    }
}

fn flatten(parent: &str, records: &[RouteRecord], out: &mut Vec<Route>) {
    for record in records {
        let path = join(parent, record.path);
        if let Some(page) = record.page {
            out.push(Route {
                name: record.name,
                page,
                pattern: PathPattern::parse(&path),
            });
        }
        flatten(&path, &record.children, out);
    }
}
