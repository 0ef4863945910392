use std::fmt;

use serde::{Serialize, Deserialize};

use crate::error::IdentityError;

pub const VOTER_COOKIE: &str = "voter_id";

/// Opaque token identifying a browser across requests.
///
/// Values read back from the `voter_id` cookie are taken as-is, so a
/// `VoterId` is not guaranteed to be a UUID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VoterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoter {
    pub id: VoterId,
    /// Set when the id was generated for this request and still has to be
    /// handed to the client as a cookie.
    pub minted: bool,
}

/// Mints 128 random bits from the OS and formats them as a v4 UUID.
pub fn mint_voter_id() -> Result<VoterId, IdentityError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)?;
    let id = uuid::Builder::from_random_bytes(bytes).into_uuid();
    Ok(VoterId(id.hyphenated().to_string()))
}

pub fn resolve_voter_identity(cookie: Option<&str>) -> Result<ResolvedVoter, IdentityError> {
    match cookie {
        Some(value) => Ok(ResolvedVoter {
            id: VoterId::new(value),
            minted: false,
        }),
        None => Ok(ResolvedVoter {
            id: mint_voter_id()?,
            minted: true,
        }),
    }
}

// Backend-specific Rocket implementation
#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::http::{Cookie, Status};
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;
    use tracing::{debug, error};

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for VoterId {
        type Error = IdentityError;

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let cookies = req.cookies();
            let existing = cookies.get(VOTER_COOKIE).map(|c| c.value().to_string());

            match resolve_voter_identity(existing.as_deref()) {
                Ok(ResolvedVoter { id, minted }) => {
                    if minted {
                        debug!("Minted new voter id {}", id);
                        cookies.add(Cookie::new(VOTER_COOKIE, id.to_string()));
                    }
                    Outcome::Success(id)
                }
                Err(e) => {
                    error!("server: get voter ID: {}", e);
                    Outcome::Error((Status::InternalServerError, e))
                }
            }
        }
    }
}
