use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Duration applied when the persisted value is missing or non-positive.
pub const DEFAULT_DURATION_MINUTES: u32 = 90;

/// Display name substituted when a participant's profile row is missing.
pub const PLACEHOLDER_DISPLAY_NAME: &str = "Unknown";

/// Persisted lifecycle status of a game record.
///
/// Advisory only: writes to this column may be silently refused by the store's
/// authorization policy, so readers must recompute the effective status from
/// the participant list instead of trusting this value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Open game waiting for players (or for a time vote to resolve).
    Scheduled,
    /// Enough players committed; the time is locked in.
    Confirmed,
    /// Explicitly cancelled by the host.
    Cancelled,
}

/// Aggregate game record persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Calendar day the game takes place on.
    pub date: Date,
    /// Main proposed start time (e.g. `"18:00"`); becomes the confirmed time
    /// once a vote resolves.
    pub primary_time: String,
    /// Planned duration in minutes.
    pub duration_minutes: u32,
    /// Kind of activity (e.g. `"Padel"`).
    pub activity_type: String,
    /// Where the game takes place.
    pub location: String,
    /// Free-text note from the host.
    pub note: Option<String>,
    /// Alternative start times still open for voting, in proposal order.
    /// Excludes [`Self::primary_time`].
    pub candidate_times: Vec<String>,
    /// Whether a time vote is unresolved. Advisory, recomputed on read.
    pub tentative: bool,
    /// Last successfully persisted status. Advisory, recomputed on read.
    pub status: GameStatus,
    /// Last successfully persisted owner. Advisory, recomputed on read.
    pub host_id: Option<Uuid>,
}

/// Participant row keyed by (game, user), with the display identity resolved
/// from the profile join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantEntity {
    /// Identity of the participant.
    pub user_id: Uuid,
    /// When the participant joined; ordering key for host selection.
    #[serde(with = "time::serde::rfc3339")]
    pub joined_at: OffsetDateTime,
    /// The candidate time this participant voted for, if any.
    pub voted_time: Option<String>,
    /// Free-text status message, independent of scheduling logic.
    pub status_note: Option<String>,
    /// Resolved display name ([`PLACEHOLDER_DISPLAY_NAME`] when the profile
    /// row is missing).
    pub display_name: String,
    /// Resolved avatar URL, if the profile carries one.
    pub avatar_url: Option<String>,
}

/// One game's raw record plus its full participant list, as read from the
/// store in a single pass. Participants are ordered by ascending join time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Raw persisted game record.
    pub game: GameEntity,
    /// Authoritative participant list.
    pub participants: Vec<ParticipantEntity>,
}

/// Fields required to insert a new game record. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameRecord {
    /// Calendar day the game takes place on.
    pub date: Date,
    /// Main proposed start time.
    pub primary_time: String,
    /// Planned duration in minutes.
    pub duration_minutes: u32,
    /// Kind of activity.
    pub activity_type: String,
    /// Where the game takes place.
    pub location: String,
    /// Free-text note from the host.
    pub note: Option<String>,
    /// Alternative start times open for voting.
    pub candidate_times: Vec<String>,
    /// Whether the game starts in a time vote.
    pub tentative: bool,
    /// Creator of the game, recorded as the initial host.
    pub host_id: Uuid,
}

/// Partial update of a game record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecordPatch {
    /// New calendar day.
    pub date: Option<Date>,
    /// New main time.
    pub primary_time: Option<String>,
    /// New duration in minutes.
    pub duration_minutes: Option<u32>,
    /// New activity kind.
    pub activity_type: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New host note.
    pub note: Option<String>,
    /// Replacement alternative-times list.
    pub candidate_times: Option<Vec<String>>,
    /// New tentative flag.
    pub tentative: Option<bool>,
    /// New persisted status.
    pub status: Option<GameStatus>,
    /// New persisted owner.
    pub host_id: Option<Uuid>,
}

impl GameRecordPatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Insert-or-update payload for a participant row.
///
/// On update only the vote changes; the join timestamp set at insert time is
/// preserved so the host-selection order stays stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantUpsert {
    /// Identity of the participant.
    pub user_id: Uuid,
    /// Vote to record, if any.
    pub voted_time: Option<String>,
}
