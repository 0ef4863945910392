use serde::{Serialize, Deserialize};

use crate::voter::VoterId;

/// Write payload sent to the vote backend, whichever transport carries it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteRecord {
    pub voter_id: VoterId,
    pub vote: String,
}

impl VoteRecord {
    pub fn new(voter_id: VoterId, vote: impl Into<String>) -> Self {
        Self {
            voter_id,
            vote: vote.into(),
        }
    }
}

/// Body of a successful `GET /votes/<voter_id>` on the storage API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteResponse {
    pub vote: String,
}

/// What the read path learned about a voter's previous vote.
///
/// Only `Recorded` carries a value. The other two render as an empty vote,
/// but they stay distinct so callers can tell "the backend has nothing" from
/// "the backend could not be asked".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedVote {
    Recorded(String),
    NoRecord,
    Unavailable,
}

impl FetchedVote {
    pub fn is_recorded(&self) -> bool {
        matches!(self, FetchedVote::Recorded(_))
    }

    pub fn value(&self) -> &str {
        match self {
            FetchedVote::Recorded(vote) => vote,
            FetchedVote::NoRecord | FetchedVote::Unavailable => "",
        }
    }
}
