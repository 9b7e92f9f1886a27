//! Route table: `(method, path template)` registrations compiled into a matcher.
//!
//! Templates use `{name}` segments (and `{*name}` for a trailing catch-all). Methods are stored as
//! plain strings; any normalization is applied by the caller before insert and lookup.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context as _;
use matchit::Router;

use crate::handler::PathParams;

struct RouteSlot<H> {
    template: Arc<str>,
    by_method: HashMap<String, H>,
}

/// Compiled matcher over registered routes.
pub struct RouteTable<H> {
    router: Router<usize>,
    slots: Vec<RouteSlot<H>>,
    by_template: HashMap<String, usize>,
}

#[derive(Debug)]
/// Outcome of matching an incoming request against the table.
pub enum RouteMatch<'a, H> {
    /// No registered template matched the path.
    NotFound,
    /// A template matched but no handler is registered for the method.
    MethodNotAllowed { allowed: Vec<&'a str> },
    /// Path and method matched.
    Matched {
        handler: &'a H,
        params: PathParams,
        route: &'a Arc<str>,
    },
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            router: Router::new(),
            slots: Vec::new(),
            by_template: HashMap::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` on `template`.
    pub fn insert(&mut self, method: String, template: &str, handler: H) -> anyhow::Result<()> {
        validate_template(template)?;

        let idx = match self.by_template.get(template) {
            Some(idx) => *idx,
            None => {
                let idx = self.slots.len();
                self.router
                    .insert(template, idx)
                    .with_context(|| format!("cannot register route template {template}"))?;
                self.slots.push(RouteSlot {
                    template: Arc::from(template),
                    by_method: HashMap::new(),
                });
                self.by_template.insert(template.to_string(), idx);
                idx
            }
        };

        let slot = &mut self.slots[idx];
        if slot.by_method.contains_key(&method) {
            anyhow::bail!("duplicate route: {method} {template}");
        }
        slot.by_method.insert(method, handler);
        Ok(())
    }

    /// Match a `(method, path)` pair.
    pub fn match_request(&self, method: &str, path: &str) -> RouteMatch<'_, H> {
        let Ok(matched) = self.router.at(path) else {
            return RouteMatch::NotFound;
        };
        let Some(slot) = self.slots.get(*matched.value) else {
            return RouteMatch::NotFound;
        };

        match slot.by_method.get(method) {
            Some(handler) => RouteMatch::Matched {
                handler,
                params: matched.params.iter().collect(),
                route: &slot.template,
            },
            None => RouteMatch::MethodNotAllowed {
                allowed: {
                    let mut methods: Vec<&str> =
                        slot.by_method.keys().map(String::as_str).collect();
                    methods.sort_unstable();
                    methods
                },
            },
        }
    }

    /// Number of registered `(method, template)` pairs.
    pub fn len(&self) -> usize {
        self.slots.iter().map(|s| s.by_method.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parameters (`{name}`, or `{*name}` for a catch-all) must fill their whole segment.
fn validate_template(template: &str) -> anyhow::Result<()> {
    let Some(segments) = template.strip_prefix('/') else {
        anyhow::bail!("route template {template:?} must start with '/'");
    };

    for segment in segments.split('/') {
        let Some(param) = segment.strip_prefix('{') else {
            if segment.contains(['{', '}']) {
                anyhow::bail!("route template {template:?} has a stray brace in {segment:?}");
            }
            continue;
        };
        let Some(name) = param.strip_suffix('}') else {
            anyhow::bail!("route template {template:?} has an unclosed parameter {segment:?}");
        };
        let name = name.strip_prefix('*').unwrap_or(name);
        if name.is_empty() || name.contains(['{', '}', '*']) {
            anyhow::bail!("route template {template:?} has an invalid parameter {segment:?}");
        }
    }

    Ok(())
}
