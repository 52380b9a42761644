//! Profile reconnaissance for pages where a handle is taken.
//!
//! The page is parsed and mined synchronously; the parsed document is
//! gone before the avatar download is awaited.

mod avatar;
mod patterns;
mod platforms;

use std::time::Duration;

use scraper::Html;
use tracing::debug;
use url::Url;
use usrlinks_model::{ContactInfo, ReconPayload};

pub use avatar::{fetch_avatar, locate_avatar};
pub use patterns::{ContactMatches, extract_contacts, visible_text};
pub use platforms::{
    ExtractorSet, GitHubProfile, InstagramProfile, LinkedInProfile,
    ProfileExtractor, TwitterProfile,
};

use crate::transport::Transport;

/// What a single page yields before any further network access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFindings {
    pub contact_info: ContactInfo,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReconEngine {
    extractors: ExtractorSet,
    avatar_timeout: Duration,
}

impl ReconEngine {
    pub fn new(extractors: ExtractorSet, avatar_timeout: Duration) -> Self {
        Self {
            extractors,
            avatar_timeout,
        }
    }

    pub fn analyze_page(&self, page_url: &str, body: &[u8]) -> PageFindings {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);

        let matches = extract_contacts(&visible_text(&document));
        let mut contact_info = ContactInfo {
            emails: matches.emails,
            phones: matches.phones,
            urls: matches.urls,
            ..ContactInfo::default()
        };

        let host = Url::parse(page_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();
        self.extractors.apply(&host, &document, &mut contact_info);

        PageFindings {
            contact_info,
            avatar_url: locate_avatar(&document, page_url),
        }
    }

    /// Full recon for one taken profile page.
    pub async fn inspect(
        &self,
        transport: &dyn Transport,
        page_url: &str,
        body: &[u8],
    ) -> ReconPayload {
        let findings = self.analyze_page(page_url, body);

        let avatar = match findings.avatar_url {
            Some(url) => {
                Some(fetch_avatar(transport, url, self.avatar_timeout).await)
            }
            None => None,
        };

        debug!(
            url = %page_url,
            emails = findings.contact_info.emails.len(),
            avatar = avatar.is_some(),
            "recon finished"
        );

        ReconPayload {
            contact_info: findings.contact_info,
            avatar,
        }
    }
}

impl Default for ReconEngine {
    fn default() -> Self {
        Self::new(ExtractorSet::default(), Duration::from_secs(10))
    }
}
