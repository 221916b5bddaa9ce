//! All things related to the storage of meetings and delete votes

use core::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

pub use Config as DatabaseConfig;
pub use form_types::*;

use crate::meetings::Meeting;
use crate::meetings::MeetingWithVotes;
use crate::votes::DELETE_QUORUM;
use crate::votes::VoteOutcome;

mod form_types;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Database configuration
pub enum Config {
    /// Detect configuration from environment
    DetectConfig,

    /// Use existing connection
    ExistingConnection(PgPool),
}

/// Postgres storage
#[derive(Clone)]
pub struct Database {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Database {
    /// Create a new Postgres storage
    pub async fn from_config(config: Config) -> Self {
        match config {
            Config::DetectConfig => Self::new().await,
            Config::ExistingConnection(pool) => Self::new_with_pool(pool).await,
        }
    }

    /// Create Postgres storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    async fn new() -> Self {
        let database_connection_string = std::env::var("DATABASE_URL").expect("Valid DATABASE_URL");

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await
            .expect("Valid connection");

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    async fn new_with_pool(connection_pool: PgPool) -> Self {
        let migration_result = MIGRATOR.run(&connection_pool).await;

        if let Err(err) = migration_result {
            panic!("Migrations could not run: {err}");
        }

        Self { connection_pool }
    }
}

impl Database {
    /// Find all meetings scheduled after the cutoff, with their vote tallies
    ///
    /// Ordered by scheduled time, insertion order breaks ties
    pub async fn find_all_meetings_after(
        &self,
        cutoff: &DateTime<Utc>,
    ) -> Result<Vec<MeetingWithVotes>> {
        let meetings = sqlx::query_as!(
            MeetingWithVotes,
            r#"
            SELECT
                m.id AS "id!",
                m.title AS "title!",
                m.scheduled_at AS "scheduled_at!",
                m.link,
                m.created_at AS "created_at!",
                m.updated_at AS "updated_at!",
                COUNT(dv.id) AS "delete_votes!"
            FROM meetings m
            LEFT JOIN delete_votes dv ON dv.meeting_id = m.id
            WHERE m.scheduled_at > $1
            GROUP BY m.id
            ORDER BY m.scheduled_at ASC, m.created_at ASC
            "#,
            cutoff,
        )
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(meetings)
    }

    /// Find a single meeting by ID
    pub async fn find_single_meeting_by_id(&self, id: &Uuid) -> Result<Option<Meeting>> {
        let meeting = sqlx::query_as!(
            Meeting,
            r#"
            SELECT *
            FROM meetings
            WHERE id = $1
            LIMIT 1
            "#,
            id,
        )
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(meeting)
    }

    /// Create a meeting
    pub async fn create_meeting(&self, values: &CreateMeetingValues<'_>) -> Result<Meeting> {
        let meeting = sqlx::query_as!(
            Meeting,
            r#"
            INSERT INTO meetings (id, title, scheduled_at, link)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
            Uuid::new_v4(),
            values.title,
            values.scheduled_at,
            values.link,
        )
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(meeting)
    }

    /// Update a single meeting
    ///
    /// Overwrites title, scheduled time and link, and bumps `updated_at`;
    /// last write wins, recorded votes are not touched
    pub async fn update_meeting(
        &self,
        meeting: &Meeting,
        values: &UpdateMeetingValues<'_>,
    ) -> Result<Meeting> {
        let updated_meeting = sqlx::query_as!(
            Meeting,
            r#"
            UPDATE meetings
            SET title = $1, scheduled_at = $2, link = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $4
            RETURNING *
            "#,
            values.title,
            values.scheduled_at,
            values.link,
            &meeting.id,
        )
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(updated_meeting)
    }

    /// Count the delete votes recorded for a meeting
    pub async fn count_delete_votes(&self, meeting_id: &Uuid) -> Result<i64> {
        let tally = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) AS "count!"
            FROM delete_votes
            WHERE meeting_id = $1
            "#,
            meeting_id,
        )
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(tally)
    }

    /// Cast a delete vote for a meeting
    ///
    /// Runs as a single transaction: lock the meeting row, record the vote,
    /// tally, and remove the meeting with all its votes once the tally
    /// reaches [`DELETE_QUORUM`].
    ///
    /// The row lock serializes votes on the same meeting, so exactly one
    /// caller crosses the threshold and performs the removal; a concurrent
    /// final vote finds the row gone and reports
    /// [`VoteOutcome::MeetingNotFound`]. A repeated vote from the same voter
    /// hits the `(meeting_id, voter_id)` constraint and is a silent no-op.
    pub async fn cast_delete_vote(&self, meeting_id: &Uuid, voter_id: &str) -> Result<VoteOutcome> {
        let mut transaction = self
            .connection_pool
            .begin()
            .await
            .map_err(connection_error)?;

        let locked_meeting_id = sqlx::query_scalar!(
            r#"
            SELECT id
            FROM meetings
            WHERE id = $1
            FOR UPDATE
            "#,
            meeting_id,
        )
        .fetch_optional(&mut *transaction)
        .await
        .map_err(connection_error)?;

        if locked_meeting_id.is_none() {
            return Ok(VoteOutcome::MeetingNotFound);
        }

        sqlx::query!(
            r#"
            INSERT INTO delete_votes (id, meeting_id, voter_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (meeting_id, voter_id) DO NOTHING
            "#,
            Uuid::new_v4(),
            meeting_id,
            voter_id,
        )
        .execute(&mut *transaction)
        .await
        .map_err(connection_error)?;

        let tally = sqlx::query_scalar!(
            r#"
            SELECT COUNT(*) AS "count!"
            FROM delete_votes
            WHERE meeting_id = $1
            "#,
            meeting_id,
        )
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        let outcome = if tally >= DELETE_QUORUM {
            sqlx::query!(
                r#"
                DELETE FROM delete_votes
                WHERE meeting_id = $1
                "#,
                meeting_id,
            )
            .execute(&mut *transaction)
            .await
            .map_err(connection_error)?;

            // a no-op when the row is already gone
            sqlx::query!(
                r#"
                DELETE FROM meetings
                WHERE id = $1
                "#,
                meeting_id,
            )
            .execute(&mut *transaction)
            .await
            .map_err(connection_error)?;

            VoteOutcome::Deleted
        } else {
            VoteOutcome::Recorded {
                votes_remaining: DELETE_QUORUM - tally,
            }
        };

        transaction.commit().await.map_err(connection_error)?;

        Ok(outcome)
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
