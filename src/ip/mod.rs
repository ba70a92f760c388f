mod http;

use rand::seq::SliceRandom;
use thiserror::Error;

use crate::config::Config;
use crate::http::Client;

/// Public "what is my IP" services, each answering a GET with the caller's
/// address as plain text.
pub const DEFAULT_SOURCES: [&str; 3] = [
    "https://api.ipify.org/",
    "https://icanhazip.com/",
    "https://ifconfig.me/",
];

#[derive(Debug, Error, Clone)]
pub enum DynamicIpError {
    #[error("no IP source to query")]
    NoSource,

    #[error("unable to obtain IP from {url}: {reason}")]
    HttpFailure { url: Box<str>, reason: Box<str> },

    #[error("unable to obtain IP from {url}: HTTP {code} {body}")]
    HttpStatus {
        url: Box<str>,
        code: u16,
        body: Box<str>,
    },

    #[error("unreadable response from {url}: {reason}")]
    InvalidBody { url: Box<str>, reason: Box<str> },

    #[error("{url} returned an empty response")]
    EmptyBody { url: Box<str> },
}

/// Decides which echo service gets asked this run.
pub trait SourceSelector {
    fn select<'a>(&mut self, sources: &'a [Box<str>]) -> Option<&'a str>;
}

/// Uniform choice over the configured sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelector;

impl SourceSelector for RandomSelector {
    fn select<'a>(&mut self, sources: &'a [Box<str>]) -> Option<&'a str> {
        sources.choose(&mut rand::thread_rng()).map(AsRef::as_ref)
    }
}

pub trait ResolveIp {
    /// Look up the public address once. The returned string is whatever the
    /// source answered, trimmed; it is not parsed as an IP.
    fn resolve(&mut self) -> Result<Box<str>, DynamicIpError>;
}

pub struct HttpResolver<S = RandomSelector> {
    client: Client,
    sources: Vec<Box<str>>,
    selector: S,
}

impl HttpResolver<RandomSelector> {
    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::with_selector(client, config.ip_sources.clone(), RandomSelector)
    }
}

impl<S: SourceSelector> HttpResolver<S> {
    pub fn with_selector(client: Client, sources: Vec<Box<str>>, selector: S) -> Self {
        Self {
            client,
            sources,
            selector,
        }
    }
}

impl<S: SourceSelector> ResolveIp for HttpResolver<S> {
    fn resolve(&mut self) -> Result<Box<str>, DynamicIpError> {
        let url = self
            .selector
            .select(&self.sources)
            .ok_or(DynamicIpError::NoSource)?;

        log::debug!("Querying {} for the public IP address", url);

        http::get_address(&self.client, url)
    }
}
