//! Meetings API endpoints
//!
//! Everything related to the meeting board: listing, creating and editing
//! meetings, and casting delete votes

use axum::Extension;
use axum_extra::TypedHeader;
use axum_extra::headers::UserAgent;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::client_ip::ClientIp;
use crate::database::CreateMeetingValues;
use crate::database::Database;
use crate::database::UpdateMeetingValues;
use crate::meetings::LISTING_WINDOW_HOURS;
use crate::meetings::Meeting;
use crate::meetings::MeetingWithVotes;
use crate::shortener::Shortener;
use crate::votes::VoteOutcome;

use super::Error;
use super::Form;
use super::PathParameters;
use super::Success;
use super::VoterId;
use super::parse_link;
use super::parse_meeting_time;
use super::parse_title;

/// Meeting response going to the user
///
/// A meeting with its derived delete-vote tally
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    /// Meeting ID
    pub id: Uuid,

    /// Title of the meeting
    pub title: String,

    /// When the meeting takes place
    pub time: DateTime<Utc>,

    /// Link to the meeting, empty when there is none
    pub link: String,

    /// Number of distinct voters asking for deletion
    pub delete_votes: i64,
}

impl MeetingResponse {
    /// Create a response from a [`Meeting`](Meeting) and a vote tally
    fn from_meeting(meeting: Meeting, delete_votes: i64) -> Self {
        Self {
            id: meeting.id,
            title: meeting.title,
            time: meeting.scheduled_at,
            link: meeting.link.unwrap_or_default(),
            delete_votes,
        }
    }

    /// Create a response from a [`MeetingWithVotes`](MeetingWithVotes)
    fn from_meeting_with_votes(meeting: MeetingWithVotes) -> Self {
        Self {
            id: meeting.id,
            title: meeting.title,
            time: meeting.scheduled_at,
            link: meeting.link.unwrap_or_default(),
            delete_votes: meeting.delete_votes,
        }
    }

    /// Create a response from multiple [`MeetingWithVotes`](MeetingWithVotes)
    fn from_meeting_with_votes_multiple(mut meetings: Vec<MeetingWithVotes>) -> Vec<Self> {
        meetings
            .drain(..)
            .map(Self::from_meeting_with_votes)
            .collect::<Vec<Self>>()
    }
}

/// Delete vote response going to the user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    /// Whether the vote reached the quorum and removed the meeting
    pub deleted: bool,

    /// Votes still needed to reach the quorum, absent once deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes_remaining: Option<i64>,
}

impl VoteResponse {
    /// The vote is recorded, the meeting survives
    fn recorded(votes_remaining: i64) -> Self {
        Self {
            deleted: false,
            votes_remaining: Some(votes_remaining),
        }
    }

    /// The quorum is reached, the meeting is gone
    fn deleted() -> Self {
        Self {
            deleted: true,
            votes_remaining: None,
        }
    }
}

/// List all meetings on the board
///
/// Meetings stay listed for a short while after their scheduled time has
/// passed, older ones are filtered out
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     http://localhost:6000/api/meetings
/// ```
///
/// Response:
/// ```json
/// { "data": [ { "id": "<uuid>", "title": "Standup", "deleteVotes": 0 ... } ] }
/// ```
pub async fn list(
    Extension(database): Extension<Database>,
) -> Result<Success<Vec<MeetingResponse>>, Error> {
    let cutoff = Utc::now() - Duration::hours(LISTING_WINDOW_HOURS);

    let meetings = database
        .find_all_meetings_after(&cutoff)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(
        MeetingResponse::from_meeting_with_votes_multiple(meetings),
    ))
}

/// Create meeting form
///
/// Fields to create a meeting with
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingForm {
    /// Title to create a meeting with
    title: String,

    /// Scheduled time, RFC 3339 text with an offset, strictly in the future
    time: String,

    /// Optional link to the meeting, will be shortened before it is stored
    link: Option<String>,
}

/// Create a meeting based on the [`CreateMeetingForm`](CreateMeetingForm) form
///
/// A supplied link is passed through the external shortener first; when the
/// shortener is not configured or does not answer, the whole create fails
/// and nothing is stored
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "title": "Standup", "time": "2026-08-07T09:00:00+00:00" }' \
///     http://localhost:6000/api/meetings
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "title": "Standup", "deleteVotes": 0 ... } }
/// ```
pub async fn create(
    Extension(database): Extension<Database>,
    Extension(shortener): Extension<Shortener>,
    Form(form): Form<CreateMeetingForm>,
) -> Result<Success<MeetingResponse>, Error> {
    let title = parse_title(&form.title)?;
    let scheduled_at = parse_meeting_time(&form.time)?;
    let link = parse_link(form.link.as_deref())?;

    let link = match &link {
        Some(link) => Some(
            shortener
                .shorten(link)
                .await
                .map_err(Error::internal_server_error)?,
        ),
        None => None,
    };

    let values = CreateMeetingValues {
        title: &title,
        scheduled_at: &scheduled_at,
        link: link.as_deref(),
    };

    let meeting = database
        .create_meeting(&values)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::created(MeetingResponse::from_meeting(meeting, 0)))
}

/// Update meeting form
///
/// Fields to update a meeting with; all fields are overwritten
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetingForm {
    /// New title of the meeting
    title: String,

    /// New scheduled time, RFC 3339 text with an offset, strictly in the future
    time: String,

    /// New link of the meeting, stored as given
    link: Option<String>,
}

/// Update a meeting based on the [`UpdateMeetingForm`](UpdateMeetingForm) form
///
/// The new values get the same validation as a create. Recorded delete votes
/// are kept; the response carries the current tally. Concurrent updates are
/// last-write-wins.
///
/// Request:
/// ```sh
/// curl -v -XPATCH -H 'Content-Type: application/json' \
///     -d '{ "title": "Standup", "time": "2026-08-07T10:00:00+00:00" }' \
///     http://localhost:6000/api/meetings/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "data": { "id": "<uuid>", "title": "Standup", "deleteVotes": 2 ... } }
/// ```
pub async fn update(
    Extension(database): Extension<Database>,
    ip_address: Option<ClientIp>,
    PathParameters(meeting_id): PathParameters<Uuid>,
    Form(form): Form<UpdateMeetingForm>,
) -> Result<Success<MeetingResponse>, Error> {
    let meeting = fetch_meeting(&database, &meeting_id).await?;

    let title = parse_title(&form.title)?;
    let scheduled_at = parse_meeting_time(&form.time)?;
    let link = parse_link(form.link.as_deref())?;

    tracing::info!(
        "Edit of meeting {meeting_id} from {}",
        format_origin(ip_address.as_ref(), None),
    );

    let values = UpdateMeetingValues {
        title: &title,
        scheduled_at: &scheduled_at,
        link: link.as_ref().map(Url::as_str),
    };

    let updated_meeting = database
        .update_meeting(&meeting, &values)
        .await
        .map_err(Error::internal_server_error)?;

    let delete_votes = database
        .count_delete_votes(&updated_meeting.id)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(MeetingResponse::from_meeting(
        updated_meeting,
        delete_votes,
    )))
}

/// Cast a delete vote for a meeting
///
/// The voter is identified by the opaque `x-voter-id` header; a repeated
/// vote from the same voter is a no-op. Once enough distinct voters have
/// voted the meeting is removed together with all its votes.
///
/// Request:
/// ```sh
/// curl -v -XDELETE \
///     -H 'x-voter-id: tokentokentoken' \
///     http://localhost:6000/api/meetings/<uuid>
/// ```
///
/// Response:
/// ```json
/// { "data": { "deleted": false, "votesRemaining": 3 } }
/// ```
pub async fn vote(
    Extension(database): Extension<Database>,
    ip_address: Option<ClientIp>,
    user_agent: Option<TypedHeader<UserAgent>>,
    VoterId(voter_id): VoterId,
    PathParameters(meeting_id): PathParameters<Uuid>,
) -> Result<Success<VoteResponse>, Error> {
    let user_agent = user_agent.map(|user_agent| user_agent.0.to_string());

    tracing::info!(
        "Delete vote for meeting {meeting_id} from {}",
        format_origin(ip_address.as_ref(), user_agent.as_deref()),
    );

    let outcome = database
        .cast_delete_vote(&meeting_id, &voter_id)
        .await
        .map_err(Error::internal_server_error)?;

    match outcome {
        VoteOutcome::MeetingNotFound => Err(Error::not_found("Meeting not found")),
        VoteOutcome::Recorded { votes_remaining } => {
            Ok(Success::ok(VoteResponse::recorded(votes_remaining)))
        }
        VoteOutcome::Deleted => {
            tracing::info!("Meeting {meeting_id} reached the delete quorum and is removed");

            Ok(Success::ok(VoteResponse::deleted()))
        }
    }
}

/// Fetch meeting from the database
async fn fetch_meeting(database: &Database, meeting_id: &Uuid) -> Result<Meeting, Error> {
    database
        .find_single_meeting_by_id(meeting_id)
        .await
        .map_err(Error::internal_server_error)?
        .map_or_else(|| Err(Error::not_found("Meeting not found")), Ok)
}

/// Describe where a request came from, for the action log
fn format_origin(ip_address: Option<&ClientIp>, user_agent: Option<&str>) -> String {
    let address = ip_address.map_or_else(
        || "unknown address".to_string(),
        |client_ip| client_ip.ip_address.to_string(),
    );

    match user_agent {
        Some(user_agent) => format!("{address} ({user_agent})"),
        None => address,
    }
}
