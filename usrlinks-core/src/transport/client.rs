use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::debug;

use super::{
    FetchedResponse, Transport, TransportError, TransportFactory,
    TransportOptions,
};
use crate::config::TransportSettings;

/// `reqwest` backed transport. One client per scan; cloning shares the
/// connection pool.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(
        options: &TransportOptions,
        settings: &TransportSettings,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .default_headers(default_headers());

        if let Some(proxy_url) =
            resolve_proxy(options, &settings.relay_address)?
        {
            debug!(proxy = %proxy_url, "routing scan through proxy");
            let proxy = reqwest::Proxy::all(&proxy_url).map_err(|err| {
                TransportError::InvalidProxy {
                    address: proxy_url.clone(),
                    reason: err.to_string(),
                }
            })?;
            builder = builder.proxy(proxy);
        }

        let http_client = builder
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        user_agent: &str,
    ) -> Result<FetchedResponse, TransportError> {
        fetch(self.http_client.get(url), user_agent).await
    }
}

async fn fetch(
    request: reqwest::RequestBuilder,
    user_agent: &str,
) -> Result<FetchedResponse, TransportError> {
    let response =
        request.header(header::USER_AGENT, user_agent).send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?;
    Ok(FetchedResponse::new(status, body.to_vec()))
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        header::REFERER,
        HeaderValue::from_static("https://www.google.com/"),
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers
}

/// Proxy URL for `options`, or `None` for a direct connection.
///
/// A value with a scheme is used as given. A bare `host:port` is taken to
/// be a SOCKS5 endpoint with remote DNS.
pub(crate) fn resolve_proxy(
    options: &TransportOptions,
    relay_address: &str,
) -> Result<Option<String>, TransportError> {
    let raw = match options.proxy.as_deref().map(str::trim) {
        Some(proxy) if !proxy.is_empty() => proxy,
        _ if options.use_relay => relay_address.trim(),
        _ => return Ok(None),
    };

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("socks5h://{raw}")
    };

    let parsed = url::Url::parse(&candidate).map_err(|err| {
        TransportError::InvalidProxy {
            address: raw.to_string(),
            reason: err.to_string(),
        }
    })?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(TransportError::InvalidProxy {
            address: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(Some(candidate))
}

/// Builds a [`ReqwestTransport`] per scan from shared settings.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportFactory {
    settings: TransportSettings,
}

impl ReqwestTransportFactory {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }
}

impl TransportFactory for ReqwestTransportFactory {
    fn build(
        &self,
        options: &TransportOptions,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        Ok(Arc::new(ReqwestTransport::new(options, &self.settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELAY: &str = "127.0.0.1:9050";

    #[test]
    fn direct_when_nothing_requested() {
        let resolved = resolve_proxy(&TransportOptions::direct(), RELAY).unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn bare_proxy_becomes_socks() {
        let resolved =
            resolve_proxy(&TransportOptions::with_proxy("10.0.0.5:1080"), RELAY)
                .unwrap();
        assert_eq!(resolved.as_deref(), Some("socks5h://10.0.0.5:1080"));
    }

    #[test]
    fn scheme_is_kept() {
        let resolved = resolve_proxy(
            &TransportOptions::with_proxy("http://proxy.local:3128"),
            RELAY,
        )
        .unwrap();
        assert_eq!(resolved.as_deref(), Some("http://proxy.local:3128"));
    }

    #[test]
    fn relay_uses_configured_address() {
        let resolved = resolve_proxy(&TransportOptions::via_relay(), RELAY).unwrap();
        assert_eq!(resolved.as_deref(), Some("socks5h://127.0.0.1:9050"));
    }

    #[test]
    fn explicit_proxy_wins_over_relay() {
        let options = TransportOptions {
            proxy: Some("10.0.0.5:1080".into()),
            use_relay: true,
        };
        let resolved = resolve_proxy(&options, RELAY).unwrap();
        assert_eq!(resolved.as_deref(), Some("socks5h://10.0.0.5:1080"));
    }

    #[test]
    fn malformed_proxy_is_rejected() {
        let err = resolve_proxy(&TransportOptions::with_proxy("socks5h://"), RELAY)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidProxy { .. }));
    }

    #[test]
    fn factory_builds_relay_transport() {
        let factory = ReqwestTransportFactory::default();
        assert!(factory.build(&TransportOptions::via_relay()).is_ok());
    }
}
