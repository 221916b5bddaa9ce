//! Form types

use chrono::DateTime;
use chrono::Utc;

/// Values to create a Meeting
pub struct CreateMeetingValues<'a> {
    /// The title of the meeting
    pub title: &'a str,

    /// When the meeting takes place, strictly in the future
    pub scheduled_at: &'a DateTime<Utc>,

    /// Optional link to the meeting, already shortened
    pub link: Option<&'a str>,
}

/// Values to update a Meeting
///
/// All fields are overwritten, recorded delete votes are kept as they are
pub struct UpdateMeetingValues<'a> {
    /// The new title of the meeting
    pub title: &'a str,

    /// The new scheduled time, strictly in the future
    pub scheduled_at: &'a DateTime<Utc>,

    /// The new link, stored as given
    pub link: Option<&'a str>,
}
