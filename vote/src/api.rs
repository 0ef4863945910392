//! Direct reads and writes against the vote storage API.

use reqwest::{header::CONTENT_TYPE, StatusCode, Url};
use shared::{FetchedVote, VoteResponse, VoterId};
use tracing::{error, info, warn};

use crate::{
    config::{ConfigError, Timeouts},
    error::VoteError,
    gateway::VoteBackend,
};

pub struct ApiBackend {
    client: reqwest::Client,
    votes_url: Url,
}

impl ApiBackend {
    pub fn new(base_url: &str, timeouts: &Timeouts) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let mut votes_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        votes_url
            .path_segments_mut()
            .map_err(|_| invalid("cannot be a base".into()))?
            .pop_if_empty()
            .push("votes");

        let client = reqwest::Client::builder()
            .timeout(timeouts.request)
            .pool_idle_timeout(timeouts.idle)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self { client, votes_url })
    }

    /// `/votes/<voter_id>`, with the id escaped as a single path segment.
    fn voter_url(&self, voter: &VoterId) -> Url {
        let mut url = self.votes_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(voter.as_str());
        }
        url
    }
}

#[rocket::async_trait]
impl VoteBackend for ApiBackend {
    async fn fetch(&self, voter: &VoterId) -> Result<FetchedVote, VoteError> {
        let response = match self.client.get(self.voter_url(voter)).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("server: couldn't get vote for voter id {}: {}", voter, e);
                return Ok(FetchedVote::Unavailable);
            }
        };

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                info!("server: no vote recorded for voter id {}", voter);
                return Ok(FetchedVote::NoRecord);
            }
            status => {
                warn!("server: get vote response status: {}", status);
                return Ok(FetchedVote::Unavailable);
            }
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!("server: read vote body for voter id {}: {}", voter, e);
                return Ok(FetchedVote::Unavailable);
            }
        };

        let data: VoteResponse = serde_json::from_slice(&body).map_err(|e| {
            error!("server: decode vote data: {}", e);
            VoteError::VoteDecode(e.to_string())
        })?;

        info!("server: received vote {} for voter id {}", data.vote, voter);
        Ok(FetchedVote::Recorded(data.vote))
    }

    async fn submit(&self, _voter: &VoterId, payload: Vec<u8>) -> Result<(), VoteError> {
        let response = self
            .client
            .post(self.votes_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| VoteError::VoteSubmit(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VoteError::VoteSubmit(format!("storage API answered {status}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::gateway::encode_vote;
    use crate::test_support::{refused_url, spawn_stub};

    async fn spawn_reader(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/votes/:voter_id",
            get(move |Path(_voter_id): Path<String>| async move { (status, body) }),
        );
        spawn_stub(app).await
    }

    fn backend(url: &str) -> ApiBackend {
        ApiBackend::new(url, &Timeouts::default()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_recorded_vote() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let app = Router::new()
            .route(
                "/votes/:voter_id",
                get(|State(seen): State<Arc<Mutex<Vec<String>>>>, Path(voter_id): Path<String>| async move {
                    seen.lock().unwrap().push(voter_id);
                    Json(json!({"vote": "b"}))
                }),
            )
            .with_state(seen.clone());
        let url = spawn_stub(app).await;

        let fetched = backend(&url).fetch(&VoterId::from("Z")).await.unwrap();
        assert_eq!(fetched, FetchedVote::Recorded("b".into()));

        let fetched = backend(&url).fetch(&VoterId::from("odd/id?x")).await.unwrap();
        assert_eq!(fetched.value(), "b");
        assert_eq!(*seen.lock().unwrap(), vec!["Z".to_string(), "odd/id?x".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_empty_vote_is_still_recorded() {
        let url = spawn_reader(StatusCode::OK, r#"{"vote":""}"#).await;
        let fetched = backend(&url).fetch(&VoterId::from("Z")).await.unwrap();
        assert_eq!(fetched, FetchedVote::Recorded(String::new()));
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_soft() {
        let url = spawn_reader(StatusCode::NOT_FOUND, "").await;
        assert_eq!(backend(&url).fetch(&VoterId::from("Z")).await.unwrap(), FetchedVote::NoRecord);

        let url = spawn_reader(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        assert_eq!(backend(&url).fetch(&VoterId::from("Z")).await.unwrap(), FetchedVote::Unavailable);

        let url = spawn_reader(StatusCode::ACCEPTED, r#"{"vote":"a"}"#).await;
        assert_eq!(backend(&url).fetch(&VoterId::from("Z")).await.unwrap(), FetchedVote::Unavailable);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_soft() {
        let url = refused_url().await;
        let fetched = backend(&url).fetch(&VoterId::from("Z")).await.unwrap();
        assert_eq!(fetched, FetchedVote::Unavailable);
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_soft() {
        let app = Router::new().route(
            "/votes/:voter_id",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"vote": "late"}))
            }),
        );
        let url = spawn_stub(app).await;
        let timeouts = Timeouts {
            request: Duration::from_millis(100),
            ..Timeouts::default()
        };

        let fetched = ApiBackend::new(&url, &timeouts)
            .unwrap()
            .fetch(&VoterId::from("Z"))
            .await
            .unwrap();
        assert_eq!(fetched, FetchedVote::Unavailable);
    }

    #[tokio::test]
    async fn test_fetch_malformed_success_is_an_error() {
        let url = spawn_reader(StatusCode::OK, "{not json").await;
        let err = backend(&url).fetch(&VoterId::from("Z")).await.unwrap_err();
        assert!(matches!(err, VoteError::VoteDecode(_)));

        let url = spawn_reader(StatusCode::OK, r#"{"result":"a"}"#).await;
        let err = backend(&url).fetch(&VoterId::from("Z")).await.unwrap_err();
        assert!(matches!(err, VoteError::VoteDecode(_)));
    }

    #[tokio::test]
    async fn test_submit_posts_json_record() {
        let received: Arc<Mutex<Vec<Value>>> = Arc::default();
        let app = Router::new()
            .route(
                "/votes",
                post(|State(received): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                    received.lock().unwrap().push(body);
                    StatusCode::CREATED
                }),
            )
            .with_state(received.clone());
        let url = spawn_stub(app).await;

        let voter = VoterId::from("voter-123");
        backend(&format!("{url}/"))
            .submit(&voter, encode_vote(&voter, "a").unwrap())
            .await
            .unwrap();

        assert_eq!(*received.lock().unwrap(), vec![json!({"voter_id": "voter-123", "vote": "a"})]);
    }

    #[tokio::test]
    async fn test_submit_failures() {
        let voter = VoterId::from("voter-123");
        let payload = encode_vote(&voter, "a").unwrap();

        let url = refused_url().await;
        let err = backend(&url).submit(&voter, payload.clone()).await.unwrap_err();
        assert!(matches!(err, VoteError::VoteSubmit(_)));

        let app = Router::new().route("/votes", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let url = spawn_stub(app).await;
        let err = backend(&url).submit(&voter, payload).await.unwrap_err();
        assert!(matches!(err, VoteError::VoteSubmit(_)));
    }

    #[tokio::test]
    async fn test_submit_timeout_is_submit_error() {
        let app = Router::new().route(
            "/votes",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                StatusCode::CREATED
            }),
        );
        let url = spawn_stub(app).await;
        let timeouts = Timeouts {
            request: Duration::from_millis(100),
            ..Timeouts::default()
        };

        let voter = VoterId::from("voter-123");
        let err = ApiBackend::new(&url, &timeouts)
            .unwrap()
            .submit(&voter, encode_vote(&voter, "a").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, VoteError::VoteSubmit(_)));
    }
}
