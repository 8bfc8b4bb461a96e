//! Pure status reconciliation for game records.
//!
//! The persisted `status`, `tentative`, and `host_id` columns cannot be
//! trusted: the participant-list write and the status write are separate,
//! non-transactional mutations, and the status write may be silently refused
//! by the store's authorization policy. Every read therefore recomputes the
//! effective state from the raw record and the live participant list, and any
//! write-back of the derived fields is a separate best-effort convergence
//! step whose failure never affects the returned view.

mod ownership;
mod status;
mod tally;

pub use self::ownership::resolve_owner;
pub use self::status::{candidate_order, convergence_patch, reconcile};
pub use self::tally::VoteTally;

use serde::Serialize;
use uuid::Uuid;

/// Number of distinct participants required to confirm a game or lock in a
/// voted time. Fixed regardless of activity type.
pub const CONFIRMATION_QUORUM: usize = 4;

/// Effective status of a game as derived from primitives.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReconciledStatus {
    /// Open game, fewer than [`CONFIRMATION_QUORUM`] players, no active vote.
    Scheduled,
    /// A time vote is in progress and no candidate has reached quorum.
    TentativeVoting,
    /// Quorum reached: the canonical time is locked in.
    Confirmed,
}

/// Canonical view of a game recomputed from the raw record and participant
/// list. Ephemeral; never persisted as ground truth.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReconciledView {
    /// Derived status.
    pub status: ReconciledStatus,
    /// Time considered authoritative for display and confirmation.
    pub canonical_time: String,
    /// Whether a time vote is still unresolved.
    pub tentative: bool,
    /// Current responsible owner (earliest joiner); `None` only when the
    /// participant list is empty.
    pub owner: Option<Uuid>,
}
