use axum::http::StatusCode;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use crate::tests::helper;

#[sqlx::test]
async fn test_meeting_update(pool: sqlx::PgPool) {
    let mut app = helper::setup_test_app(pool).await;

    let time = (Utc::now() + Duration::hours(1)).to_rfc3339();
    let (_, meeting, _) = helper::maybe_create_meeting(&mut app, "Standup", &time, None).await;
    let meeting_id = meeting.unwrap().id;

    // overwrite title, time and link
    let new_time = (Utc::now() + Duration::hours(2)).to_rfc3339();
    let (status_code, updated, _) = helper::maybe_update_meeting(
        &mut app,
        &meeting_id,
        "Retrospective",
        &new_time,
        Some("https://meet.example.com/retro"),
    )
    .await;
    assert_eq!(StatusCode::OK, status_code);

    let updated = updated.unwrap();
    assert_eq!(meeting_id, updated.id);
    assert_eq!("Retrospective", &updated.title);
    // the link is stored as given, only a create passes it through the shortener
    assert_eq!("https://meet.example.com/retro", &updated.link);
    assert_eq!(0, updated.delete_votes);

    // the board reflects the new values
    let (_, meetings) = helper::list_meetings(&mut app).await;
    let meetings = meetings.unwrap();
    assert_eq!(1, meetings.len());
    assert_eq!("Retrospective", &meetings[0].title);
}

#[sqlx::test]
async fn test_meeting_update_preserves_votes(pool: sqlx::PgPool) {
    let mut app = helper::setup_test_app(pool).await;

    let time = (Utc::now() + Duration::hours(1)).to_rfc3339();
    let (_, meeting, _) = helper::maybe_create_meeting(&mut app, "Standup", &time, None).await;
    let meeting_id = meeting.unwrap().id;

    helper::cast_vote(&mut app, &meeting_id, "voter-1").await;
    helper::cast_vote(&mut app, &meeting_id, "voter-2").await;

    // an update does not reset or alter recorded votes
    let (status_code, updated, _) =
        helper::maybe_update_meeting(&mut app, &meeting_id, "Standup", &time, None).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(2, updated.unwrap().delete_votes);

    let (_, meetings) = helper::list_meetings(&mut app).await;
    assert_eq!(2, meetings.unwrap()[0].delete_votes);
}

#[sqlx::test]
async fn test_meeting_update_not_found(pool: sqlx::PgPool) {
    let mut app = helper::setup_test_app(pool).await;

    let time = (Utc::now() + Duration::hours(1)).to_rfc3339();

    let (status_code, _, error) =
        helper::maybe_update_meeting(&mut app, &Uuid::new_v4(), "Standup", &time, None).await;
    assert_eq!(StatusCode::NOT_FOUND, status_code);
    assert_eq!(Some("Meeting not found".to_string()), error);
}

#[sqlx::test]
async fn test_meeting_update_validation(pool: sqlx::PgPool) {
    let mut app = helper::setup_test_app(pool).await;

    let time = (Utc::now() + Duration::hours(1)).to_rfc3339();
    let (_, meeting, _) = helper::maybe_create_meeting(&mut app, "Standup", &time, None).await;
    let meeting_id = meeting.unwrap().id;

    // the new values get the same validation as a create
    let past = (Utc::now() - Duration::seconds(1)).to_rfc3339();
    let (status_code, _, error) =
        helper::maybe_update_meeting(&mut app, &meeting_id, "Standup", &past, None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Meeting time can not be in the past".to_string()), error);

    let (status_code, _, error) =
        helper::maybe_update_meeting(&mut app, &meeting_id, "", &time, None).await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(Some("Title can not be empty".to_string()), error);

    // the meeting is untouched
    let (_, meetings) = helper::list_meetings(&mut app).await;
    assert_eq!("Standup", &meetings.unwrap()[0].title);
}
