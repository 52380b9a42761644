//! Per-platform profile extractors.
//!
//! Each extractor claims a set of hosts and fills in whatever fields its
//! platform's markup exposes. New platforms are added by registering
//! another [`ProfileExtractor`]; the recon pass itself never changes.

use std::fmt;
use std::sync::Arc;

use scraper::{Html, Selector};
use usrlinks_model::ContactInfo;

pub trait ProfileExtractor: Send + Sync {
    /// Hosts this extractor handles. Subdomains match too.
    fn hosts(&self) -> &[&'static str];

    fn extract(&self, document: &Html, contact: &mut ContactInfo);

    fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.hosts().iter().any(|pattern| {
            host == *pattern
                || host
                    .strip_suffix(pattern)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// The extractors consulted for a profile page, in registration order.
#[derive(Clone)]
pub struct ExtractorSet {
    extractors: Vec<Arc<dyn ProfileExtractor>>,
}

impl ExtractorSet {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn with(mut self, extractor: impl ProfileExtractor + 'static) -> Self {
        self.extractors.push(Arc::new(extractor));
        self
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Runs every extractor claiming `host`, then the generic description
    /// fallback when no bio was found.
    pub fn apply(
        &self,
        host: &str,
        document: &Html,
        contact: &mut ContactInfo,
    ) {
        for extractor in &self.extractors {
            if extractor.matches_host(host) {
                extractor.extract(document, contact);
            }
        }

        if contact.bio.is_none() {
            contact.bio =
                select_attr(document, r#"meta[name="description"]"#, "content");
        }
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::empty()
            .with(GitHubProfile)
            .with(TwitterProfile)
            .with(InstagramProfile)
            .with(LinkedInProfile)
    }
}

impl fmt::Debug for ExtractorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractorSet")
            .field("extractors", &self.extractors.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubProfile;

impl ProfileExtractor for GitHubProfile {
    fn hosts(&self) -> &[&'static str] {
        &["github.com"]
    }

    fn extract(&self, document: &Html, contact: &mut ContactInfo) {
        if let Some(location) =
            select_text(document, r#"li[itemprop="homeLocation"]"#)
        {
            contact.location = Some(location);
        }
        if let Some(bio) = select_text(document, "div.user-profile-bio") {
            contact.bio = Some(bio);
        }
        if let Some(name) = select_text(document, r#"span[itemprop="name"]"#) {
            contact.name = Some(name);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterProfile;

impl ProfileExtractor for TwitterProfile {
    fn hosts(&self) -> &[&'static str] {
        &["twitter.com", "x.com"]
    }

    fn extract(&self, document: &Html, contact: &mut ContactInfo) {
        if let Some(bio) =
            select_text(document, r#"div[data-testid="UserDescription"]"#)
        {
            contact.bio = Some(bio);
        }
        if let Some(location) =
            select_text(document, r#"span[data-testid="UserLocation"]"#)
        {
            contact.location = Some(location);
        }
        if exists(document, r#"svg[data-testid="verificationBadge"]"#) {
            contact.verified = true;
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstagramProfile;

impl ProfileExtractor for InstagramProfile {
    fn hosts(&self) -> &[&'static str] {
        &["instagram.com"]
    }

    fn extract(&self, document: &Html, contact: &mut ContactInfo) {
        let og_description = r#"meta[property="og:description"]"#;
        if let Some(bio) = select_attr(document, og_description, "content") {
            contact.bio = Some(bio);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedInProfile;

impl ProfileExtractor for LinkedInProfile {
    fn hosts(&self) -> &[&'static str] {
        &["linkedin.com"]
    }

    fn extract(&self, document: &Html, contact: &mut ContactInfo) {
        let Some(selector) = selector("span.text-body-small") else {
            return;
        };
        let location = document
            .select(&selector)
            .map(|element| collapse(element.text()))
            .find(|text| text.to_lowercase().contains("location"));
        if let Some(location) = location {
            contact.location = Some(location);
        }
    }
}

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Trimmed text of the first element matching `css`, if non-empty.
pub(crate) fn select_text(document: &Html, css: &str) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .map(|element| collapse(element.text()))
        .find(|text| !text.is_empty())
}

pub(crate) fn select_attr(
    document: &Html,
    css: &str,
    attr: &str,
) -> Option<String> {
    let selector = selector(css)?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn exists(document: &Html, css: &str) -> bool {
    selector(css)
        .is_some_and(|selector| document.select(&selector).next().is_some())
}

fn collapse<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
