use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::dao::models::{GameEntity, ParticipantEntity};
use crate::reconcile::{ReconciledStatus, ReconciledView, VoteTally, candidate_order};

/// Presentation shape of a game: the descriptive record fields combined with
/// the authoritative participant list and the reconciled (derived) state.
///
/// The `status`, `canonical_time`, `tentative`, and `owner_id` fields come
/// from the reconciliation pass, never from the persisted columns.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GameView {
    /// Primary key of the game.
    pub id: Uuid,
    /// Calendar day the game takes place on.
    pub date: Date,
    /// Derived authoritative start time.
    pub canonical_time: String,
    /// Planned duration in minutes.
    pub duration_minutes: u32,
    /// Kind of activity.
    pub activity_type: String,
    /// Where the game takes place.
    pub location: String,
    /// Free-text note from the host.
    pub note: Option<String>,
    /// Alternative start times still listed on the record.
    pub candidate_times: Vec<String>,
    /// Derived status.
    pub status: ReconciledStatus,
    /// Whether a time vote is still unresolved.
    pub tentative: bool,
    /// Derived owner (earliest joiner).
    pub owner_id: Option<Uuid>,
    /// Vote counts per candidate time, in voting order.
    pub votes: IndexMap<String, usize>,
    /// Participants in join order.
    pub participants: Vec<ParticipantEntity>,
}

impl GameView {
    /// Assemble a view from a raw record, its participant list, and the
    /// reconciled state derived from them.
    pub fn compose(
        game: GameEntity,
        participants: Vec<ParticipantEntity>,
        view: ReconciledView,
    ) -> Self {
        let votes = VoteTally::count(&candidate_order(&game), &participants)
            .counts()
            .clone();

        Self {
            id: game.id,
            date: game.date,
            canonical_time: view.canonical_time,
            duration_minutes: game.duration_minutes,
            activity_type: game.activity_type,
            location: game.location,
            note: game.note,
            candidate_times: game.candidate_times,
            status: view.status,
            tentative: view.tentative,
            owner_id: view.owner,
            votes,
            participants,
        }
    }
}

/// Input for scheduling a new game.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreateGameRequest {
    /// Calendar day of the game.
    pub date: Date,
    /// Main proposed start time.
    pub primary_time: String,
    /// Planned duration in minutes; 0 falls back to the configured default.
    #[serde(default)]
    pub duration_minutes: u32,
    /// Kind of activity; empty falls back to the configured default.
    #[serde(default)]
    pub activity_type: String,
    /// Where the game takes place.
    pub location: String,
    /// Free-text note shown to joiners.
    #[serde(default)]
    pub note: Option<String>,
    /// Alternative start times to open a vote over. Duplicates and entries
    /// equal to the primary time are dropped.
    #[serde(default)]
    pub alternative_times: Vec<String>,
}

/// Host edit of a game's descriptive fields. `None` fields are untouched.
///
/// Replacing `alternative_times` re-derives the tentative flag.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct GameUpdate {
    /// New calendar day.
    #[serde(default)]
    pub date: Option<Date>,
    /// New main time.
    #[serde(default)]
    pub primary_time: Option<String>,
    /// New duration in minutes.
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// New activity kind.
    #[serde(default)]
    pub activity_type: Option<String>,
    /// New location.
    #[serde(default)]
    pub location: Option<String>,
    /// New host note.
    #[serde(default)]
    pub note: Option<String>,
    /// Replacement alternative-times list.
    #[serde(default)]
    pub alternative_times: Option<Vec<String>>,
}
