mod classify;
mod config;
mod decorate;
mod error;
mod format;
mod har;
mod predicate;
mod render;

pub use classify::{classify, declares_json, is_json, is_valid_json, BodyKind};
pub use config::{FilterConfig, RenderConfig, ViewConfig};
pub use decorate::{value_role, AnsiDecorator, ColorChoice, Decorator, PlainDecorator, Role};
pub use error::HarvError;
pub use format::{format_content, format_post_body, indent, pretty_json};
pub use har::{
    Cache, CacheState, Content, Cookie, Creator, Entry, Har, Header, Log, Page, PageTimings,
    PostData, PostParameter, QueryParameter, Request, Response, Timings, UNKNOWN_SIZE,
};
pub use predicate::{
    closest_host, filter_entries, normalize_domain, Candidate, DomainContains, DomainEquals,
    EntryPredicate, MethodIn, PathContains, PathEquals, PredicateChain, RequestHasBody,
    ResponseCode, ResponseHasBody, StatusClass, UrlMatches,
};
pub use render::Renderer;

/// Selects entries from an archive and renders them, for one frozen
/// [`ViewConfig`].
#[derive(Debug)]
pub struct HarViewer {
    config: ViewConfig,
    chain: PredicateChain,
    renderer: Renderer,
}

impl HarViewer {
    pub fn new(config: ViewConfig, decorator: Box<dyn Decorator>) -> Result<Self, HarvError> {
        let chain = PredicateChain::from_config(&config.filter)?;
        let renderer = Renderer::new(config.render, decorator);

        Ok(Self {
            config,
            chain,
            renderer,
        })
    }

    pub fn plain(config: ViewConfig) -> Result<Self, HarvError> {
        Self::new(config, Box::new(PlainDecorator))
    }

    /// The entries passing every configured criterion, in archive order.
    pub fn filter<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        let matched = self.chain.filter(entries);

        log::info!("{} of {} entries matched", matched.len(), entries.len());
        if matched.is_empty() {
            if let Some(domain) = &self.config.filter.domain_equals {
                if let Some(host) = closest_host(entries, domain) {
                    log::warn!("No entries for domain {domain:?}; closest host seen is {host:?}");
                }
            }
        }

        matched
    }

    pub fn render(&self, entry: &Entry) -> String {
        self.renderer.render(entry)
    }

    /// Filter then render everything at once.
    pub fn view(&self, entries: &[Entry]) -> Vec<String> {
        self.filter(entries)
            .into_iter()
            .map(|entry| self.render(entry))
            .collect()
    }

    /// Rendered blocks produced on demand. Each call starts a fresh pass.
    pub fn blocks<'a>(&'a self, entries: &'a [Entry]) -> impl Iterator<Item = String> + 'a {
        entries
            .iter()
            .filter(move |entry| self.chain.matches_entry(entry))
            .map(move |entry| self.render(entry))
    }
}
