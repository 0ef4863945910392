use std::{collections::HashMap, fmt, net::SocketAddr, str::FromStr, time::Duration};

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::{info, warn};

pub const DISCOVERY_ENDPOINT_ENV: &str = "COPILOT_SERVICE_DISCOVERY_ENDPOINT";
pub const TOPIC_ARNS_ENV: &str = "COPILOT_SNS_TOPIC_ARNS";
pub const PUBLISH_ENDPOINT_ENV: &str = "VOTE_PUBLISH_ENDPOINT";
pub const EVENTS_TOPIC: &str = "events";

const DEFAULT_ADDR: &str = ":8080";
const API_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid listen address {addr:?}: {reason}")]
    InvalidAddr { addr: String, reason: String },
    #[error("malformed COPILOT_SNS_TOPIC_ARNS: {0}")]
    MalformedTopics(String),
    #[error("COPILOT_SNS_TOPIC_ARNS has no \"events\" topic")]
    MissingTopic,
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("build backend client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Read and write through the storage API.
    Api,
    /// Publish writes to the events topic.
    Topic,
}

/// Command-line flags for the vote server.
#[derive(Debug, Parser)]
#[command(name = "vote", about = "Renders the vote page and forwards votes to the backend")]
pub struct Args {
    /// Address to listen on, either `:port` or `host:port`.
    #[arg(long, env = "VOTE_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,

    /// Which backend receives submitted votes.
    #[arg(long, env = "VOTE_BACKEND", value_enum, default_value_t = BackendKind::Api)]
    pub backend: BackendKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub idle: Duration,
    pub publish: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(15),
            idle: Duration::from_secs(60),
            publish: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Api {
        base_url: String,
    },
    Topic {
        topic_arn: String,
        publish_endpoint: String,
        /// Storage API used for the read path, when one is reachable.
        read_url: Option<String>,
    },
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::Api { base_url } => write!(f, "storage API at {base_url}"),
            BackendConfig::Topic { topic_arn, .. } => write!(f, "topic {topic_arn}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub backend: BackendConfig,
    pub timeouts: Timeouts,
}

impl Config {
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        Self::from_lookup(args, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from parsed flags and an environment lookup.
    pub fn from_lookup<F>(args: &Args, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = parse_listen_addr(&args.addr)?;
        let discovery = lookup(DISCOVERY_ENDPOINT_ENV).filter(|v| !v.trim().is_empty());

        let backend = match args.backend {
            BackendKind::Api => {
                let endpoint = discovery.ok_or(ConfigError::Missing(DISCOVERY_ENDPOINT_ENV))?;
                BackendConfig::Api {
                    base_url: api_base_url(&endpoint),
                }
            }
            BackendKind::Topic => {
                let blob = lookup(TOPIC_ARNS_ENV).ok_or(ConfigError::Missing(TOPIC_ARNS_ENV))?;
                let topic_arn = events_topic(&blob)?;
                let publish_endpoint = lookup(PUBLISH_ENDPOINT_ENV)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::Missing(PUBLISH_ENDPOINT_ENV))?;
                if discovery.is_none() {
                    warn!("{DISCOVERY_ENDPOINT_ENV} not set, previous votes will not be shown");
                }
                BackendConfig::Topic {
                    topic_arn,
                    publish_endpoint,
                    read_url: discovery.as_deref().map(api_base_url),
                }
            }
        };

        info!("Vote backend: {}", backend);

        Ok(Self {
            addr,
            backend,
            timeouts: Timeouts::default(),
        })
    }
}

pub fn api_base_url(discovery_endpoint: &str) -> String {
    format!("http://api.{}:{API_PORT}", discovery_endpoint.trim())
}

/// Accepts the Go-style `:8080` form as well as a full `host:port`.
pub fn parse_listen_addr(addr: &str) -> Result<SocketAddr, ConfigError> {
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_string(),
    };

    SocketAddr::from_str(&full).map_err(|e| ConfigError::InvalidAddr {
        addr: addr.to_string(),
        reason: e.to_string(),
    })
}

fn events_topic(blob: &str) -> Result<String, ConfigError> {
    let topics: HashMap<String, String> =
        serde_json::from_str(blob).map_err(|e| ConfigError::MalformedTopics(e.to_string()))?;

    topics
        .get(EVENTS_TOPIC)
        .filter(|arn| !arn.trim().is_empty())
        .cloned()
        .ok_or(ConfigError::MissingTopic)
}
