//! Outbound link shortener
//!
//! Meetings can carry a link; when one is supplied on create it is passed
//! through an external shortener service before it is persisted. There is no
//! fallback to the unshortened link: when the service is not configured or
//! does not answer, the whole create fails.

use core::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use url::Url;

use crate::utils::env_var_or_else;

/// Timeout for a single shorten request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Shortener errors
#[derive(Debug)]
pub enum Error {
    /// No shortener service is configured
    NotConfigured,

    /// The shortener service could not be reached, or answered with an error
    Unreachable(String),

    /// The shortener service answered with an unusable body
    MalformedResponse(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotConfigured => write!(f, "URL shortener is not configured"),
            Error::Unreachable(error) => write!(f, "URL shortener is unreachable: {error}"),
            Error::MalformedResponse(error) => {
                write!(f, "URL shortener returned an invalid response: {error}")
            }
        }
    }
}

/// Request body for the shorten endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShortenRequest<'a> {
    /// The link to shorten
    original_url: &'a str,
}

/// Response body of the shorten endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShortenResponse {
    /// The shortened link
    short_url: String,
}

/// Client for the external link shortener service
#[derive(Clone)]
pub struct Shortener {
    /// HTTP client, carries the request timeout
    client: reqwest::Client,

    /// Base URL of the service, `None` when not configured
    base_url: Option<Url>,
}

impl Shortener {
    /// Create a shortener from the environment
    ///
    /// Uses the `URL_SHORTENER_BASE_URL` environment variable; an unset or
    /// empty value leaves the shortener unconfigured
    ///
    /// # Errors
    ///
    /// Will return `Err` when the configured base URL does not parse, or the
    /// HTTP client can not be built
    pub fn from_environment() -> anyhow::Result<Self> {
        let base_url = env_var_or_else("URL_SHORTENER_BASE_URL", String::new);

        let base_url = if base_url.is_empty() {
            None
        } else {
            Some(Url::parse(&base_url)?)
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Shorten a link
    ///
    /// # Errors
    ///
    /// Will return `Err` when no service is configured, the service is
    /// unreachable, or it answers with anything else than a shortened link
    pub async fn shorten(&self, link: &Url) -> Result<String, Error> {
        let Some(base_url) = &self.base_url else {
            return Err(Error::NotConfigured);
        };

        let endpoint = format!("{}/api/shorten", base_url.as_str().trim_end_matches('/'));

        let response = self
            .client
            .post(endpoint)
            .json(&ShortenRequest {
                original_url: link.as_str(),
            })
            .send()
            .await
            .map_err(|err| Error::Unreachable(err.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Unreachable(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body = response
            .json::<ShortenResponse>()
            .await
            .map_err(|err| Error::MalformedResponse(err.to_string()))?;

        Ok(body.short_url)
    }
}
