//! Fire-and-forget vote submission through the events topic.

use std::sync::Arc;

use shared::{FetchedVote, VoterId};
use tracing::debug;

use crate::{api::ApiBackend, error::VoteError, gateway::VoteBackend, publisher::TopicPublisher};

pub struct TopicBackend {
    publisher: Arc<dyn TopicPublisher>,
    topic: String,
    reader: Option<ApiBackend>,
}

impl TopicBackend {
    pub fn new(publisher: Arc<dyn TopicPublisher>, topic: impl Into<String>, reader: Option<ApiBackend>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            reader,
        }
    }
}

#[rocket::async_trait]
impl VoteBackend for TopicBackend {
    async fn fetch(&self, voter: &VoterId) -> Result<FetchedVote, VoteError> {
        match &self.reader {
            Some(reader) => reader.fetch(voter).await,
            None => {
                debug!("No storage API configured, skipping vote lookup for {}", voter);
                Ok(FetchedVote::Unavailable)
            }
        }
    }

    async fn submit(&self, _voter: &VoterId, payload: Vec<u8>) -> Result<(), VoteError> {
        let message = String::from_utf8(payload)
            .map_err(|e| VoteError::VoteEncode(e.to_string()))?;

        self.publisher.publish(&self.topic, message).await?;
        Ok(())
    }
}
