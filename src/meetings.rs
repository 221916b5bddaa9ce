use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

/// How long a meeting stays listed after its scheduled time has passed
pub const LISTING_WINDOW_HOURS: i64 = 2;

#[derive(Clone, Debug)]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A meeting together with its current delete-vote tally
///
/// The tally is derived by counting vote rows at read time, it is never
/// stored on the meeting itself
#[derive(Clone, Debug)]
pub struct MeetingWithVotes {
    pub id: Uuid,
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delete_votes: i64,
}
