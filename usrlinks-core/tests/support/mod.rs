#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use usrlinks_core::config::{EngineConfig, RetryConfig};
use usrlinks_core::model::{EndpointDescriptor, PlatformRule, UrlTemplate};
use usrlinks_core::transport::{
    FetchedResponse, Transport, TransportError, TransportFactory,
    TransportOptions,
};

/// One canned outcome for a GET.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond { status: u16, body: Vec<u8> },
    Fail(TransportError),
}

impl Reply {
    pub fn ok(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Reply::Respond {
            status,
            body: body.into(),
        }
    }

    pub fn timeout() -> Self {
        Reply::Fail(TransportError::Timeout("operation timed out".into()))
    }
}

/// Scripted transport. Each URL replays its queue in order and then keeps
/// returning the last reply; unscripted URLs get the fallback.
#[derive(Debug)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Reply,
    calls: AtomicUsize,
    log: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    pub fn new(fallback: Reply) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            fallback,
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn always(status: u16, body: &str) -> Self {
        Self::new(Reply::ok(status, body))
    }

    pub fn unreachable() -> Self {
        Self::new(Reply::timeout())
    }

    pub fn script(self, url: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.scripts
            .lock()
            .insert(url.to_string(), replies.into_iter().collect());
        self
    }

    pub fn route(self, url: &str, status: u16, body: &str) -> Self {
        self.script(url, [Reply::ok(status, body)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.log.lock().iter().filter(|(u, _)| u == url).count()
    }

    pub fn user_agents(&self) -> Vec<String> {
        self.log.lock().iter().map(|(_, ua)| ua.clone()).collect()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut scripts = self.scripts.lock();
        match scripts.get_mut(url) {
            Some(queue) if queue.len() > 1 => {
                queue.pop_front().unwrap_or_else(|| self.fallback.clone())
            }
            Some(queue) => queue.front().cloned().unwrap_or_else(|| self.fallback.clone()),
            None => self.fallback.clone(),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        user_agent: &str,
    ) -> Result<FetchedResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().push((url.to_string(), user_agent.to_string()));
        match self.next_reply(url) {
            Reply::Respond { status, body } => Ok(FetchedResponse::new(status, body)),
            Reply::Fail(err) => Err(err),
        }
    }
}

/// Hands out the same mock for every scan and records the options asked
/// for.
#[derive(Debug)]
pub struct MockFactory {
    pub transport: Arc<MockTransport>,
    pub requested: Mutex<Vec<TransportOptions>>,
}

impl MockFactory {
    pub fn new(transport: MockTransport) -> Arc<Self> {
        Arc::new(Self {
            transport: Arc::new(transport),
            requested: Mutex::new(Vec::new()),
        })
    }
}

impl TransportFactory for MockFactory {
    fn build(
        &self,
        options: &TransportOptions,
    ) -> Result<Arc<dyn Transport>, TransportError> {
        self.requested.lock().push(options.clone());
        if let Some(proxy) = options.proxy.as_deref()
            && proxy.starts_with("bogus")
        {
            return Err(TransportError::InvalidProxy {
                address: proxy.to_string(),
                reason: "rejected by test factory".into(),
            });
        }
        Ok(self.transport.clone())
    }
}

/// Engine config with no backoff so nothing sleeps.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        retry: RetryConfig {
            max_attempts: 3,
            backoff_step_ms: 0,
        },
        ..EngineConfig::default()
    }
}

pub fn status_platform(name: &str, url: &str, codes: &[u16]) -> EndpointDescriptor {
    EndpointDescriptor::new(
        name,
        PlatformRule::status_code(template(url), codes.iter().copied()),
    )
}

pub fn text_platform(name: &str, url: &str, phrases: &[&str]) -> EndpointDescriptor {
    EndpointDescriptor::new(
        name,
        PlatformRule::response_text(template(url), phrases.iter().copied()),
    )
}

fn template(url: &str) -> UrlTemplate {
    UrlTemplate::new(url).expect("test template has one slot")
}
