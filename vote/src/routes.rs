use rocket::{form::Form, get, http::Status, post, response::content::RawHtml, FromForm, State};
use shared::VoterId;
use tracing::{debug, instrument};

use crate::{error::VoteError, gateway::VoteGateway, render::PageRenderer};

pub const INDEX_TEMPLATE: &str = "index";

pub struct AppState {
    pub gateway: VoteGateway,
    pub renderer: PageRenderer,
}

impl AppState {
    pub fn new(gateway: VoteGateway) -> Self {
        Self {
            gateway,
            renderer: PageRenderer::default(),
        }
    }
}

/// Body of `POST /`. Unknown fields are ignored and a missing `vote` stays `None`.
#[derive(Debug, FromForm)]
pub struct VoteForm {
    pub vote: Option<String>,
}

#[get("/_healthcheck")]
pub fn healthcheck() -> Status {
    Status::Ok
}

#[instrument(skip(state, voter), fields(voter_id = %voter))]
#[get("/")]
pub async fn view(state: &State<AppState>, voter: VoterId) -> Result<RawHtml<String>, VoteError> {
    let fetched = state.gateway.fetch_vote(&voter).await?;
    if !fetched.is_recorded() {
        debug!("Showing empty vote ({:?})", fetched);
    }
    state.renderer.render(INDEX_TEMPLATE, fetched.value())
}

/// A body that is absent or not a form never rejects the request. The body
/// field wins over `?vote=`, and with neither the vote is empty.
#[instrument(skip(state, voter, form), fields(voter_id = %voter))]
#[post("/?<vote>", data = "<form>")]
pub async fn save(
    state: &State<AppState>,
    voter: VoterId,
    vote: Option<String>,
    form: Option<Form<VoteForm>>,
) -> Result<RawHtml<String>, VoteError> {
    let vote = form
        .and_then(|form| form.into_inner().vote)
        .or(vote)
        .unwrap_or_default();
    state.gateway.submit_vote(&voter, &vote).await?;
    state.renderer.render(INDEX_TEMPLATE, &vote)
}
