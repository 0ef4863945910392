use std::sync::Arc;

use shared::{FetchedVote, VoteRecord, VoterId};
use tracing::{info, instrument};

use crate::{
    api::ApiBackend,
    config::{BackendConfig, Config, ConfigError},
    error::VoteError,
    publisher::HttpTopicPublisher,
    topic::TopicBackend,
};

/// A transport that can read a voter's last vote and carry a new one.
///
/// Implementations are shared by every in-flight request, so they must not
/// need `&mut self`.
#[rocket::async_trait]
pub trait VoteBackend: Send + Sync {
    async fn fetch(&self, voter: &VoterId) -> Result<FetchedVote, VoteError>;

    /// `payload` is the already serialised `VoteRecord`.
    async fn submit(&self, voter: &VoterId, payload: Vec<u8>) -> Result<(), VoteError>;
}

#[derive(Clone)]
pub struct VoteGateway {
    backend: Arc<dyn VoteBackend>,
}

impl VoteGateway {
    pub fn new(backend: Arc<dyn VoteBackend>) -> Self {
        Self { backend }
    }

    #[instrument(skip(self), fields(voter_id = %voter))]
    pub async fn fetch_vote(&self, voter: &VoterId) -> Result<FetchedVote, VoteError> {
        self.backend.fetch(voter).await
    }

    #[instrument(skip(self), fields(voter_id = %voter))]
    pub async fn submit_vote(&self, voter: &VoterId, vote: &str) -> Result<(), VoteError> {
        let payload = encode_vote(voter, vote)?;
        self.backend.submit(voter, payload).await?;

        info!("server: saved vote {} for voter id {}", vote, voter);
        Ok(())
    }
}

pub fn encode_vote(voter: &VoterId, vote: &str) -> Result<Vec<u8>, VoteError> {
    serde_json::to_vec(&VoteRecord::new(voter.clone(), vote))
        .map_err(|e| VoteError::VoteEncode(e.to_string()))
}

/// Wires the transport selected by `config`.
pub fn build_gateway(config: &Config) -> Result<VoteGateway, ConfigError> {
    let backend: Arc<dyn VoteBackend> = match &config.backend {
        BackendConfig::Api { base_url } => Arc::new(ApiBackend::new(base_url, &config.timeouts)?),
        BackendConfig::Topic {
            topic_arn,
            publish_endpoint,
            read_url,
        } => {
            let publisher = HttpTopicPublisher::new(publish_endpoint.as_str(), &config.timeouts)
                .map_err(|e| ConfigError::Client(e.to_string()))?;
            let reader = read_url
                .as_deref()
                .map(|url| ApiBackend::new(url, &config.timeouts))
                .transpose()?;
            Arc::new(TopicBackend::new(Arc::new(publisher), topic_arn.clone(), reader))
        }
    };

    Ok(VoteGateway::new(backend))
}
