//! All API endpoint setup

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;

pub use request::Form;
pub use request::PathParameters;
pub use request::parse_link;
pub use request::parse_meeting_time;
pub use request::parse_title;
pub use response::Error;
pub use response::Success;
pub use voter::VoterId;

mod meetings;
mod request;
mod response;
mod voter;

/// Get the Axum router for all API routes
pub fn router() -> Router {
    let meetings = Router::new()
        .route("/", get(meetings::list))
        .route("/", post(meetings::create))
        .route("/{meeting}", patch(meetings::update))
        .route("/{meeting}", delete(meetings::vote));

    Router::new().nest("/meetings", meetings)
}
