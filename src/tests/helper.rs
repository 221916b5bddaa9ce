use axum::Router;
use axum::body::Body;
use axum::body::Bytes;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use chrono::DateTime;
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Map;
use serde_json::Value;
use tower::Service;
use uuid::Uuid;

use crate::database::DatabaseConfig;
use crate::setup_app;

/// Test helper version of Meeting struct
#[derive(Debug)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub time: String,
    pub link: String,
    pub delete_votes: i64,
}

/// Test helper version of a delete vote result
#[derive(Debug, PartialEq, Eq)]
pub struct VoteResult {
    pub deleted: bool,
    pub votes_remaining: Option<i64>,
}

/// Setup the Huddle app on top of the test database
pub async fn setup_test_app(pool: sqlx::PgPool) -> Router {
    setup_app(DatabaseConfig::ExistingConnection(pool))
        .await
        .unwrap()
}

/// Insert a meeting directly, bypassing the future-only validation
///
/// The listing window can only be observed with meetings in the past, and
/// those can not be created through the API
pub async fn insert_meeting_at(
    pool: &sqlx::PgPool,
    title: &str,
    scheduled_at: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();

    sqlx::query("INSERT INTO meetings (id, title, scheduled_at) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(title)
        .bind(scheduled_at)
        .execute(pool)
        .await
        .unwrap();

    id
}

/// Count the delete vote rows recorded for a meeting
pub async fn count_vote_rows(pool: &sqlx::PgPool, meeting_id: &Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM delete_votes WHERE meeting_id = $1")
        .bind(meeting_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn list_meetings(app: &mut Router) -> (StatusCode, Option<Vec<Meeting>>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/meetings")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_meetings(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_create_meeting(
    app: &mut Router,
    title: &str,
    time: &str,
    link: Option<&str>,
) -> (StatusCode, Option<Meeting>, Option<String>) {
    let payload = meeting_payload(title, time, link);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/meetings")
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::CREATED {
            Some(get_meeting(&body))
        } else {
            None
        },
        if status_code.is_client_error() || status_code.is_server_error() {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_update_meeting(
    app: &mut Router,
    meeting_id: &Uuid,
    title: &str,
    time: &str,
    link: Option<&str>,
) -> (StatusCode, Option<Meeting>, Option<String>) {
    let payload = meeting_payload(title, time, link);

    let request = Request::builder()
        .method(Method::PATCH)
        .uri(format!("/api/meetings/{meeting_id}"))
        .header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_meeting(&body))
        } else {
            None
        },
        if status_code.is_client_error() || status_code.is_server_error() {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn maybe_cast_vote(
    app: &mut Router,
    meeting_id: &Uuid,
    voter_id: Option<&str>,
) -> (StatusCode, Option<VoteResult>, Option<String>) {
    let mut builder = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/api/meetings/{meeting_id}"));

    if let Some(voter_id) = voter_id {
        builder = builder.header("x-voter-id", voter_id);
    }

    let request = builder.body(Body::empty()).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_vote_result(&body))
        } else {
            None
        },
        if status_code.is_client_error() || status_code.is_server_error() {
            Some(get_error_message(&body))
        } else {
            None
        },
    )
}

pub async fn cast_vote(
    app: &mut Router,
    meeting_id: &Uuid,
    voter_id: &str,
) -> (StatusCode, Option<VoteResult>, Option<String>) {
    maybe_cast_vote(app, meeting_id, Some(voter_id)).await
}

fn meeting_payload(title: &str, time: &str, link: Option<&str>) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("title".to_string(), Value::String(title.to_string()));
    payload.insert("time".to_string(), Value::String(time.to_string()));

    if let Some(link) = link {
        payload.insert("link".to_string(), Value::String(link.to_string()));
    }

    payload
}

fn value_to_meeting(meeting: &Map<String, Value>) -> Meeting {
    Meeting {
        id: meeting["id"].as_str().map(Uuid::parse_str).unwrap().unwrap(),
        title: meeting["title"].as_str().map(ToString::to_string).unwrap(),
        time: meeting["time"].as_str().map(ToString::to_string).unwrap(),
        link: meeting["link"].as_str().map(ToString::to_string).unwrap(),
        delete_votes: meeting["deleteVotes"].as_i64().unwrap(),
    }
}

fn get_meeting(body: &Bytes) -> Meeting {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["data"]
        .as_object()
        .map(value_to_meeting)
        .unwrap()
}

fn get_meetings(body: &Bytes) -> Vec<Meeting> {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_object().unwrap())
        .map(value_to_meeting)
        .collect()
}

fn get_vote_result(body: &Bytes) -> VoteResult {
    let data = serde_json::from_slice::<Value>(&body[..]).unwrap()["data"].clone();

    VoteResult {
        deleted: data["deleted"].as_bool().unwrap(),
        votes_remaining: data.get("votesRemaining").and_then(Value::as_i64),
    }
}

fn get_error_message(body: &Bytes) -> String {
    serde_json::from_slice::<Value>(&body[..]).unwrap()["error"]
        .as_str()
        .map(ToString::to_string)
        .unwrap()
}
