//! Publishing to the notification topic.
//!
//! The session used here stands in for the cloud SDK: it speaks the SNS query
//! protocol (`Action=Publish`) to a configured endpoint and retries transient
//! failures on its own. Callers only see the final outcome.

use std::{fmt, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Timeouts;

const MAX_RETRIES: u32 = 8;
const BASE_BACKOFF: Duration = Duration::from_millis(100);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PublishError {
    #[error("invalid topic identifier {0:?}")]
    InvalidTopic(String),
    #[error("publish transport: {0}")]
    Transport(String),
    #[error("publish rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl PublishError {
    fn is_retryable(&self) -> bool {
        match self {
            PublishError::InvalidTopic(_) => false,
            PublishError::Transport(_) => true,
            PublishError::Rejected { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// `arn:<partition>:sns:<region>:<account>:<topic>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicArn(String);

impl TopicArn {
    pub fn parse(raw: &str) -> Result<Self, PublishError> {
        let parts: Vec<&str> = raw.splitn(6, ':').collect();
        let well_formed = parts.len() == 6
            && parts[0] == "arn"
            && parts[2] == "sns"
            && parts.iter().all(|part| !part.is_empty());

        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(PublishError::InvalidTopic(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn topic_name(&self) -> &str {
        self.0.rsplit(':').next().unwrap_or_default()
    }
}

impl fmt::Display for TopicArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[rocket::async_trait]
pub trait TopicPublisher: Send + Sync {
    async fn publish(&self, topic: &str, message: String) -> Result<(), PublishError>;
}

pub struct HttpTopicPublisher {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
    base_backoff: Duration,
}

impl HttpTopicPublisher {
    pub fn new(endpoint: impl Into<String>, timeouts: &Timeouts) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .timeout(timeouts.publish)
            .pool_idle_timeout(timeouts.idle)
            .build()
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            max_retries: MAX_RETRIES,
            base_backoff: BASE_BACKOFF,
        })
    }

    pub fn with_retries(mut self, max_retries: u32, base_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_backoff = base_backoff;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF)
    }

    async fn send_once(&self, topic: &TopicArn, message: &str) -> Result<(), PublishError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("Action", "Publish"),
                ("TopicArn", topic.as_str()),
                ("Message", message),
            ])
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PublishError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[rocket::async_trait]
impl TopicPublisher for HttpTopicPublisher {
    async fn publish(&self, topic: &str, message: String) -> Result<(), PublishError> {
        let topic = TopicArn::parse(topic)?;

        let mut attempt = 0;
        loop {
            match self.send_once(&topic, &message).await {
                Ok(()) => {
                    debug!("Published to topic {} after {} retries", topic.topic_name(), attempt);
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!("Publish to {} failed ({}), retrying in {:?}", topic.topic_name(), e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
