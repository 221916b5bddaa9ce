//! Delete-vote consensus
//!
//! A meeting is not owned by anyone, so no single client can remove it. A
//! meeting is removed once enough distinct voters have asked for it.

/// Number of distinct voters needed before a meeting is removed
pub const DELETE_QUORUM: i64 = 5;

/// Outcome of casting a delete vote
#[derive(Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The meeting does not exist, or a concurrent vote already removed it
    MeetingNotFound,

    /// The vote is recorded, the quorum is not reached yet
    Recorded {
        /// Votes still needed to reach the quorum
        votes_remaining: i64,
    },

    /// The quorum is reached, the meeting and its votes are removed
    Deleted,
}
