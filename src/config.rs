use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::time::Duration;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::ip::DEFAULT_SOURCES;
use crate::util::optional_one_or_more_string;

const CONFIG_PATHS: &[&str] = &[
    "./config.toml",
    #[cfg(target_family = "unix")]
    "/etc/dynagent/config.toml",
];

pub const ENV_SHARED_KEY: &str = "SHARED_KEY";
pub const ENV_WORKER_URL: &str = "WORKER_URL";
pub const ENV_CONFIG_PATH: &str = "DYNAGENT_CONFIG";

/// The worker sits behind infrastructure that turns away scripting clients,
/// so requests go out looking like a desktop browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/74.0.3729.169 Safari/537.36";

/// Seconds. Applies to each request as a whole.
pub const DEFAULT_TIMEOUT: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no shared key configured (set SHARED_KEY)")]
    MissingSharedKey,

    #[error("no worker URL configured (set WORKER_URL)")]
    MissingWorkerUrl,

    #[error("worker URL {0} must be a bare host or start with https://")]
    UnsupportedScheme(Box<str>),

    #[error("the list of IP sources is empty")]
    NoIpSources,

    #[error("unable to read config file {path}: {reason}")]
    Unreadable { path: Box<str>, reason: Box<str> },

    #[error("unable to parse config file {path}: {reason}")]
    Invalid { path: Box<str>, reason: Box<str> },
}

/// The `[general]` section of the config file. Everything is optional here;
/// required values may come from the environment instead.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct General {
    #[serde(default)]
    pub shared_key: Option<Box<str>>,
    #[serde(default)]
    pub worker_url: Option<Box<str>>,
    #[serde(default)]
    pub user_agent: Option<Box<str>>,
    #[serde(default)]
    pub timeout: Option<u32>,
    #[serde(default, deserialize_with = "optional_one_or_more_string")]
    pub ip_sources: Option<Vec<Box<str>>>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
struct ConfigFile {
    #[serde(default)]
    general: General,
}

/// Validated settings for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub shared_key: Box<str>,
    /// Full `https://` URL the signed update is posted to.
    pub worker_url: Box<str>,
    pub user_agent: Box<str>,
    pub timeout: Option<Duration>,
    pub ip_sources: Vec<Box<str>>,
}

// Hand-written so the key never shows up in a log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("shared_key", &"<redacted>")
            .field("worker_url", &self.worker_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("ip_sources", &self.ip_sources)
            .finish()
    }
}

impl Config {
    /// Reads the optional config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var(ENV_CONFIG_PATH).ok().filter(|p| !p.is_empty());
        let general = read_config_file(explicit.as_deref())?;
        Self::from_sources(general, |name| env::var(name).ok())
    }

    /// Merges file settings with environment lookups (the environment wins)
    /// and validates the result.
    pub fn from_sources<F>(general: General, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // The key is used byte for byte, surrounding whitespace included.
        let shared_key = non_blank(env(ENV_SHARED_KEY).map(Into::into))
            .or_else(|| non_blank(general.shared_key))
            .ok_or(ConfigError::MissingSharedKey)?;

        let worker_url = non_empty(env(ENV_WORKER_URL).map(Into::into))
            .or_else(|| non_empty(general.worker_url))
            .ok_or(ConfigError::MissingWorkerUrl)?;

        let user_agent =
            non_empty(general.user_agent).unwrap_or_else(|| DEFAULT_USER_AGENT.into());

        let timeout = match general.timeout.unwrap_or(DEFAULT_TIMEOUT) {
            0 => None,
            secs => Some(Duration::from_secs(secs as u64)),
        };

        let ip_sources = match general.ip_sources {
            Some(sources) => sources
                .into_iter()
                .filter_map(|s| non_empty(Some(s)))
                .collect::<Vec<_>>(),
            None => DEFAULT_SOURCES.iter().map(|&s| s.into()).collect(),
        };

        if ip_sources.is_empty() {
            return Err(ConfigError::NoIpSources);
        }

        Ok(Self {
            shared_key,
            worker_url: worker_endpoint(&worker_url)?,
            user_agent,
            timeout,
            ip_sources,
        })
    }
}

/// Trims and drops empty values, so `WORKER_URL=""` counts as unset.
fn non_empty(value: Option<Box<str>>) -> Option<Box<str>> {
    value
        .map(|v| v.trim().into())
        .filter(|v: &Box<str>| !v.is_empty())
}

/// Drops blank values but leaves the rest untouched.
fn non_blank(value: Option<Box<str>>) -> Option<Box<str>> {
    value.filter(|v| !v.trim().is_empty())
}

fn worker_endpoint(raw: &str) -> Result<Box<str>, ConfigError> {
    if raw.starts_with("https://") {
        Ok(raw.into())
    } else if raw.contains("://") {
        Err(ConfigError::UnsupportedScheme(raw.into()))
    } else {
        Ok(format!("https://{}", raw).into())
    }
}

/// An explicitly named file must exist. Otherwise the first readable file
/// from [`CONFIG_PATHS`] is used, and having none at all is fine.
pub fn read_config_file(explicit: Option<&str>) -> Result<General, ConfigError> {
    if let Some(path) = explicit {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.into(),
            reason: e.to_string().into(),
        })?;
        return parse_config(&text, path);
    }

    for &path in CONFIG_PATHS {
        match fs::read_to_string(path) {
            Ok(text) => {
                log::debug!("Using config file {}", path);
                return parse_config(&text, path);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(ConfigError::Unreadable {
                    path: path.into(),
                    reason: e.to_string().into(),
                })
            }
        }
    }

    Ok(General::default())
}

fn parse_config(text: &str, path: &str) -> Result<General, ConfigError> {
    toml::from_str::<ConfigFile>(text)
        .map(|file| file.general)
        .map_err(|e| ConfigError::Invalid {
            path: path.into(),
            reason: e.to_string().into(),
        })
}
