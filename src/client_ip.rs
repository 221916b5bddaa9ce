//! Optional client IP address extractor.
//!
//! The IP address is only available when the server runs with connect-info;
//! under the test harness there is none, so extraction stays optional.

use std::convert::Infallible;
use std::net::IpAddr;

use axum::extract::FromRequestParts as _;
use axum::extract::OptionalFromRequestParts;
use axum::http::request::Parts;

/// Client IP address extractor.
#[derive(Debug, Clone)]
pub struct ClientIp {
    /// The resolved IP address
    pub ip_address: IpAddr,
}

impl<S> OptionalFromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        let ip_address = axum_client_ip::ClientIp::from_request_parts(parts, state).await;

        Ok(ip_address.ok().map(|ip_address| Self {
            ip_address: ip_address.0,
        }))
    }
}
