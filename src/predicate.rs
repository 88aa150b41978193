use crate::config::FilterConfig;
use crate::error::HarvError;
use crate::har::Entry;
use regex::Regex;
use std::fmt::Debug;
use std::ops::RangeInclusive;
use url::Url;

/// An entry together with the URL parts the predicates look at.
///
/// Host and path are normalized once here so each predicate only compares.
/// Hosts are kept in their Unicode form, as written in the archive.
#[derive(Debug)]
pub struct Candidate<'a> {
    pub entry: &'a Entry,
    pub host: String,
    pub path: String,
}

impl<'a> Candidate<'a> {
    pub fn parse(entry: &'a Entry) -> Result<Self, url::ParseError> {
        let url = Url::parse(&entry.request.url)?;

        let mut host = normalize_domain(url.host_str().unwrap_or_default());
        if let Some(port) = url.port() {
            host = format!("{host}:{port}");
        }

        let path = urlencoding::decode(url.path())
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| url.path().to_string())
            .to_lowercase();

        Ok(Self { entry, host, path })
    }
}

/// Lowercase a domain and turn any punycode labels back into Unicode.
/// Text that is not a valid domain is only lowercased.
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.to_lowercase();
    match idna::domain_to_unicode(&lowered) {
        (unicode, Ok(())) => unicode,
        (_, Err(_)) => lowered,
    }
}

pub trait EntryPredicate: Debug {
    fn matches(&self, candidate: &Candidate) -> bool;
}

/// All configured criteria, evaluated in order with AND semantics.
#[derive(Debug)]
pub struct PredicateChain {
    predicates: Vec<Box<dyn EntryPredicate>>,
}

impl PredicateChain {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    pub fn add_predicate(mut self, predicate: Box<dyn EntryPredicate>) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Build the chain for `config`. Unconfigured criteria contribute nothing.
    pub fn from_config(config: &FilterConfig) -> Result<Self, HarvError> {
        let mut chain = Self::new();

        if let Some(domain) = &config.domain_equals {
            chain = chain.add_predicate(Box::new(DomainEquals::new(domain)));
        }
        if let Some(domain) = &config.domain_contains {
            chain = chain.add_predicate(Box::new(DomainContains::new(domain)));
        }
        if let Some(path) = &config.path_equals {
            chain = chain.add_predicate(Box::new(PathEquals::new(path)));
        }
        if let Some(path) = &config.path_contains {
            chain = chain.add_predicate(Box::new(PathContains::new(path)));
        }
        if let Some(has_body) = config.request_has_body {
            chain = chain.add_predicate(Box::new(RequestHasBody(has_body)));
        }
        if let Some(has_body) = config.response_has_body {
            chain = chain.add_predicate(Box::new(ResponseHasBody(has_body)));
        }
        if let Some(methods) = &config.method_in {
            chain = chain.add_predicate(Box::new(MethodIn::new(methods)));
        }
        if let Some(code) = config.response_code {
            chain = chain.add_predicate(Box::new(ResponseCode(code)));
        }
        if config.response_informational {
            chain = chain.add_predicate(Box::new(StatusClass::informational()));
        }
        if config.response_successful {
            chain = chain.add_predicate(Box::new(StatusClass::successful()));
        }
        if config.response_failed {
            chain = chain.add_predicate(Box::new(StatusClass::failed()));
        }
        if let Some(pattern) = &config.url_matches {
            chain = chain.add_predicate(Box::new(UrlMatches::new(pattern)?));
        }

        log::debug!("Built predicate chain: {chain:?}");
        Ok(chain)
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(candidate))
    }

    /// Parse the entry's URL and test it. Entries with unparseable URLs never
    /// match.
    pub fn matches_entry(&self, entry: &Entry) -> bool {
        match Candidate::parse(entry) {
            Ok(candidate) => self.matches(&candidate),
            Err(e) => {
                log::error!(
                    "Failed to process url {:?}, ignoring entry: {e}",
                    entry.request.url
                );
                false
            }
        }
    }

    /// Keep the matching entries, in archive order.
    pub fn filter<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        entries
            .iter()
            .filter(|entry| self.matches_entry(entry))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Default for PredicateChain {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot form of [`PredicateChain::from_config`] followed by
/// [`PredicateChain::filter`].
pub fn filter_entries<'a>(
    entries: &'a [Entry],
    config: &FilterConfig,
) -> Result<Vec<&'a Entry>, HarvError> {
    Ok(PredicateChain::from_config(config)?.filter(entries))
}

#[derive(Debug)]
pub struct DomainEquals(String);

impl DomainEquals {
    pub fn new(domain: &str) -> Self {
        Self(normalize_domain(domain))
    }
}

impl EntryPredicate for DomainEquals {
    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.host == self.0
    }
}

#[derive(Debug)]
pub struct DomainContains(String);

impl DomainContains {
    pub fn new(domain: &str) -> Self {
        Self(domain.to_lowercase())
    }
}

impl EntryPredicate for DomainContains {
    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.host.contains(&self.0)
    }
}

#[derive(Debug)]
pub struct PathEquals(String);

impl PathEquals {
    pub fn new(path: &str) -> Self {
        Self(path.to_lowercase())
    }
}

impl EntryPredicate for PathEquals {
    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.path == self.0
    }
}

#[derive(Debug)]
pub struct PathContains(String);

impl PathContains {
    pub fn new(path: &str) -> Self {
        Self(path.to_lowercase())
    }
}

impl EntryPredicate for PathContains {
    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.path.contains(&self.0)
    }
}

/// `true` wants a positive body size, `false` wants exactly zero. An unknown
/// size (`-1`) satisfies neither.
fn body_presence_matches(wanted: bool, body_size: i64) -> bool {
    if wanted {
        body_size > 0
    } else {
        body_size == 0
    }
}

#[derive(Debug)]
pub struct RequestHasBody(pub bool);

impl EntryPredicate for RequestHasBody {
    fn matches(&self, candidate: &Candidate) -> bool {
        body_presence_matches(self.0, candidate.entry.request.body_size)
    }
}

#[derive(Debug)]
pub struct ResponseHasBody(pub bool);

impl EntryPredicate for ResponseHasBody {
    fn matches(&self, candidate: &Candidate) -> bool {
        body_presence_matches(self.0, candidate.entry.response.body_size)
    }
}

#[derive(Debug)]
pub struct MethodIn(Vec<String>);

impl MethodIn {
    pub fn new(methods: &[String]) -> Self {
        Self(methods.iter().map(|method| method.to_lowercase()).collect())
    }
}

impl EntryPredicate for MethodIn {
    fn matches(&self, candidate: &Candidate) -> bool {
        let method = candidate.entry.request.method.to_lowercase();
        self.0.iter().any(|allowed| *allowed == method)
    }
}

#[derive(Debug)]
pub struct ResponseCode(pub i32);

impl EntryPredicate for ResponseCode {
    fn matches(&self, candidate: &Candidate) -> bool {
        candidate.entry.response.status == self.0
    }
}

#[derive(Debug)]
pub struct StatusClass(RangeInclusive<i32>);

impl StatusClass {
    pub fn informational() -> Self {
        Self(100..=199)
    }

    /// Redirects count as successful.
    pub fn successful() -> Self {
        Self(200..=399)
    }

    pub fn failed() -> Self {
        Self(400..=599)
    }

    pub fn contains(&self, status: i32) -> bool {
        self.0.contains(&status)
    }
}

impl EntryPredicate for StatusClass {
    fn matches(&self, candidate: &Candidate) -> bool {
        self.contains(candidate.entry.response.status)
    }
}

/// Regular expression tested against the full request URL as recorded.
#[derive(Debug)]
pub struct UrlMatches(Regex);

impl UrlMatches {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self(Regex::new(pattern)?))
    }
}

impl EntryPredicate for UrlMatches {
    fn matches(&self, candidate: &Candidate) -> bool {
        self.0.is_match(&candidate.entry.request.url)
    }
}

/// The host seen in `entries` that is closest to `wanted`, by edit distance.
///
/// `None` when no entry has a host, or when some entry's host is exactly
/// `wanted`.
pub fn closest_host(entries: &[Entry], wanted: &str) -> Option<String> {
    let wanted = normalize_domain(wanted);
    let (distance, host) = entries
        .iter()
        .filter_map(|entry| Candidate::parse(entry).ok().map(|candidate| candidate.host))
        .filter(|host| !host.is_empty())
        .map(|host| (levenshtein::levenshtein(&host, &wanted), host))
        .min_by_key(|(distance, _)| *distance)?;

    (distance > 0).then_some(host)
}
