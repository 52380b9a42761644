use std::time::Duration;

use scraper::Html;
use tracing::debug;
use url::Url;
use usrlinks_model::AvatarRef;

use super::platforms::selector;
use crate::transport::{Transport, random_user_agent};

/// Tried in order; the first element carrying an image source wins.
const AVATAR_SELECTORS: [&str; 5] = [
    r#"img[data-testid="userAvatarImage"]"#,
    ".avatar img",
    r#"img[alt*="profile"]"#,
    r#"img[class*="avatar"]"#,
    r#"img[class*="profile"]"#,
];

/// Absolute URL of the profile picture on `document`, if any.
pub fn locate_avatar(document: &Html, page_url: &str) -> Option<String> {
    let source = AVATAR_SELECTORS.iter().find_map(|css| {
        let selector = selector(css)?;
        document.select(&selector).find_map(|element| {
            let value = element.value();
            [value.attr("src"), value.attr("data-src")]
                .into_iter()
                .flatten()
                .map(str::trim)
                .find(|src| !src.is_empty())
        })
    })?;

    match Url::parse(page_url) {
        Ok(base) => base.join(source).ok().map(String::from),
        Err(_) => Url::parse(source).ok().map(String::from),
    }
}

/// Downloads the avatar and fingerprints its bytes. Any failure or
/// non-200 status leaves the reference unfetched.
pub async fn fetch_avatar(
    transport: &dyn Transport,
    url: String,
    timeout: Duration,
) -> AvatarRef {
    let outcome =
        tokio::time::timeout(timeout, transport.get(&url, random_user_agent()))
            .await;

    match outcome {
        Ok(Ok(response)) if response.status == 200 => {
            let fingerprint = blake3::hash(&response.body).to_hex().to_string();
            AvatarRef::fetched(url, fingerprint)
        }
        Ok(Ok(response)) => {
            debug!(url = %url, status = response.status, "avatar not downloaded");
            AvatarRef::not_fetched(url)
        }
        Ok(Err(err)) => {
            debug!(url = %url, "avatar fetch failed: {err}");
            AvatarRef::not_fetched(url)
        }
        Err(_) => {
            debug!(url = %url, "avatar fetch timed out");
            AvatarRef::not_fetched(url)
        }
    }
}
