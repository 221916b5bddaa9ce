//! API request helpers

use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Json;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::PathRejection;
use axum::http::request::Parts;
use chrono::DateTime;
use chrono::Utc;
use serde::de::DeserializeOwned;
use url::Url;

use super::Error;

/// Parse and validate a meeting title
///
/// The title is trimmed and must not be empty
pub fn parse_title(title: &str) -> Result<String, Error> {
    let title = title.trim();

    if title.is_empty() {
        return Err(Error::bad_request("Title can not be empty"));
    }

    Ok(title.to_string())
}

/// Parse and validate a meeting time
///
/// Accepts RFC 3339 text with an offset; the parsed instant must be strictly
/// in the future at the moment of the call. A meeting is allowed to age into
/// the past afterwards, the listing window takes care of that.
pub fn parse_meeting_time(time: &str) -> Result<DateTime<Utc>, Error> {
    let scheduled_at = DateTime::parse_from_rfc3339(time)
        .map_err(|_| Error::bad_request("Invalid time format"))?
        .with_timezone(&Utc);

    if scheduled_at <= Utc::now() {
        return Err(Error::bad_request("Meeting time can not be in the past"));
    }

    Ok(scheduled_at)
}

/// Parse and validate an optional meeting link
///
/// An absent or empty link means "no link"
pub fn parse_link(link: Option<&str>) -> Result<Option<Url>, Error> {
    match link {
        None => Ok(None),
        Some(link) if link.is_empty() => Ok(None),
        Some(link) => Url::parse(link).map(Some).map_err(Error::bad_request),
    }
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_description(err))
            }
            JsonRejection::JsonSyntaxError(err) => Err(Error::bad_request("JSON syntax error")
                .with_description(std::error::Error::source(&err).expect("A valid source"))),
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in JSON").with_description(err))
            }
            err => Err(Error::bad_request("Unknown JSON error").with_description(err)),
        },
    }
}

/// Wrapper for the JSON extractor
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = Json::<F>::from_request(req, state).await;

        parse_json(json).map(Form)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => {
                Err(Error::bad_request("Invalid path parameter").with_description(err))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_description(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<P>::from_request_parts(parts, state).await;

        parse_path(path).map(PathParameters)
    }
}
