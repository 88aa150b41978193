use crate::error::HarvError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Criteria an entry has to satisfy to be printed.
///
/// `None` and `false` mean "not configured"; an unconfigured criterion lets
/// every entry through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub domain_equals: Option<String>,
    pub domain_contains: Option<String>,
    pub path_equals: Option<String>,
    pub path_contains: Option<String>,
    pub request_has_body: Option<bool>,
    pub response_has_body: Option<bool>,
    pub method_in: Option<Vec<String>>,
    pub response_code: Option<i32>,
    pub response_informational: bool,
    pub response_successful: bool,
    pub response_failed: bool,
    pub url_matches: Option<String>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain_equals(mut self, domain: impl Into<String>) -> Self {
        self.domain_equals = Some(domain.into());
        self
    }

    pub fn with_domain_contains(mut self, domain: impl Into<String>) -> Self {
        self.domain_contains = Some(domain.into());
        self
    }

    pub fn with_path_equals(mut self, path: impl Into<String>) -> Self {
        self.path_equals = Some(path.into());
        self
    }

    pub fn with_path_contains(mut self, path: impl Into<String>) -> Self {
        self.path_contains = Some(path.into());
        self
    }

    pub fn with_request_has_body(mut self, has_body: bool) -> Self {
        self.request_has_body = Some(has_body);
        self
    }

    pub fn with_response_has_body(mut self, has_body: bool) -> Self {
        self.response_has_body = Some(has_body);
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method_in = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_response_code(mut self, code: i32) -> Self {
        self.response_code = Some(code);
        self
    }

    pub fn informational(mut self) -> Self {
        self.response_informational = true;
        self
    }

    pub fn successful(mut self) -> Self {
        self.response_successful = true;
        self
    }

    pub fn failed(mut self) -> Self {
        self.response_failed = true;
        self
    }

    pub fn with_url_matches(mut self, pattern: impl Into<String>) -> Self {
        self.url_matches = Some(pattern.into());
        self
    }

    /// Layer `overrides` on top of `self`: configured values in `overrides`
    /// replace ours, status-class flags accumulate.
    pub fn merge(self, overrides: FilterConfig) -> FilterConfig {
        FilterConfig {
            domain_equals: overrides.domain_equals.or(self.domain_equals),
            domain_contains: overrides.domain_contains.or(self.domain_contains),
            path_equals: overrides.path_equals.or(self.path_equals),
            path_contains: overrides.path_contains.or(self.path_contains),
            request_has_body: overrides.request_has_body.or(self.request_has_body),
            response_has_body: overrides.response_has_body.or(self.response_has_body),
            method_in: overrides.method_in.or(self.method_in),
            response_code: overrides.response_code.or(self.response_code),
            response_informational: overrides.response_informational
                || self.response_informational,
            response_successful: overrides.response_successful || self.response_successful,
            response_failed: overrides.response_failed || self.response_failed,
            url_matches: overrides.url_matches.or(self.url_matches),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterConfig::default()
    }
}

/// Optional sections of a rendered entry. The title line is always printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub headers: bool,
    pub cookies: bool,
    pub request_body: bool,
    pub response_body: bool,
    pub timings: bool,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            headers: true,
            cookies: true,
            request_body: true,
            response_body: true,
            timings: true,
        }
    }

    pub fn with_headers(mut self, enabled: bool) -> Self {
        self.headers = enabled;
        self
    }

    pub fn with_cookies(mut self, enabled: bool) -> Self {
        self.cookies = enabled;
        self
    }

    pub fn with_request_body(mut self, enabled: bool) -> Self {
        self.request_body = enabled;
        self
    }

    pub fn with_response_body(mut self, enabled: bool) -> Self {
        self.response_body = enabled;
        self
    }

    pub fn with_timings(mut self, enabled: bool) -> Self {
        self.timings = enabled;
        self
    }

    pub fn merge(self, overrides: RenderConfig) -> RenderConfig {
        RenderConfig {
            headers: self.headers || overrides.headers,
            cookies: self.cookies || overrides.cookies,
            request_body: self.request_body || overrides.request_body,
            response_body: self.response_body || overrides.response_body,
            timings: self.timings || overrides.timings,
        }
    }
}

/// Everything one run needs to know about what to select and how to print it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub filter: FilterConfig,
    pub render: RenderConfig,
}

impl ViewConfig {
    pub fn new(filter: FilterConfig, render: RenderConfig) -> Self {
        Self { filter, render }
    }

    pub fn from_yaml_str(content: &str, path: PathBuf) -> Result<Self, HarvError> {
        serde_yaml::from_str(content).map_err(|source| HarvError::Profile { path, source })
    }

    /// Read a YAML profile holding optional `filter:` and `render:` maps.
    pub fn load_profile<P: Into<PathBuf>>(path: P) -> Result<Self, HarvError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|source| HarvError::Io {
            path: path.clone(),
            source,
        })?;

        let profile = Self::from_yaml_str(&content, path.clone())?;
        log::debug!("Loaded profile {path:?}: {profile:?}");
        Ok(profile)
    }

    pub fn merge(self, overrides: ViewConfig) -> ViewConfig {
        ViewConfig {
            filter: self.filter.merge(overrides.filter),
            render: self.render.merge(overrides.render),
        }
    }
}
