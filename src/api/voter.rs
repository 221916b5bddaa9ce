//! Voter identity
//!
//! A delete vote carries an opaque voter identifier in the `x-voter-id`
//! header. The identifier is a client-generated token and is deliberately
//! not authenticated; the only guarantee built on it is that one identifier
//! can not vote twice on the same meeting.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::Error;

/// Header carrying the opaque voter identifier
const VOTER_ID_HEADER: &str = "x-voter-id";

/// The opaque voter identifier of the requesting client
#[derive(Debug, Clone)]
pub struct VoterId(pub String);

impl<S> FromRequestParts<S> for VoterId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let voter_id = parts
            .headers
            .get(VOTER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|voter_id| !voter_id.is_empty());

        voter_id.map_or_else(
            || Err(Error::bad_request("Voter identifier is required")),
            |voter_id| Ok(Self(voter_id.to_string())),
        )
    }
}
