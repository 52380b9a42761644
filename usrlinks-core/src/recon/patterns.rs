//! Contact patterns matched against a page's visible text.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("email regex should compile")
});

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?1?[-.\s]?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}")
        .expect("phone regex should compile")
});

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s"'<>]+"#)
        .expect("url regex should compile")
});

/// Elements whose text is never rendered.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMatches {
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub urls: BTreeSet<String>,
}

pub fn extract_contacts(text: &str) -> ContactMatches {
    ContactMatches {
        emails: EMAIL_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
        phones: PHONE_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|phone| !phone.is_empty())
            .collect(),
        urls: URL_PATTERN
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect(),
    }
}

/// Text a browser would render, one space between text nodes.
pub fn visible_text(document: &Html) -> String {
    let mut pieces = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    pieces.join(" ")
}
