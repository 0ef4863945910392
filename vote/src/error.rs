use rocket::http::Status;
use rocket::response::Responder;
use shared::IdentityError;
use thiserror::Error;
use tracing::error;

use crate::publisher::PublishError;

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("get voter id: {0}")]
    Identity(#[from] IdentityError),
    #[error("decode vote: {0}")]
    VoteDecode(String),
    #[error("encode save vote data: {0}")]
    VoteEncode(String),
    #[error("save vote: {0}")]
    VoteSubmit(String),
    #[error("render template {name:?}: {reason}")]
    Render { name: String, reason: String },
}

impl From<PublishError> for VoteError {
    fn from(err: PublishError) -> Self {
        VoteError::VoteSubmit(err.to_string())
    }
}

impl VoteError {
    /// Short label sent to the client in place of the full error.
    pub fn label(&self) -> &'static str {
        match self {
            VoteError::Identity(_) => "get voter id",
            VoteError::VoteDecode(_) => "get vote",
            VoteError::VoteEncode(_) | VoteError::VoteSubmit(_) => "save vote",
            VoteError::Render { .. } => "render page",
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for VoteError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        error!("server: {} {}: {}", req.method(), req.uri(), self);

        rocket::Response::build_from(self.label().respond_to(req)?)
            .status(Status::InternalServerError)
            .ok()
    }
}
