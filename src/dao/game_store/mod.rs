#[cfg(feature = "memory-store")]
pub mod memory;
#[cfg(feature = "rest-store")]
pub mod postgrest;

use crate::dao::models::{
    GameEntity, GameRecordPatch, GameSnapshot, NewGameRecord, ParticipantUpsert,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for games and their participants.
///
/// Record writes ([`GameStore::update_game`], [`GameStore::delete_game`]) may
/// fail with [`crate::dao::storage::StorageError::Rejected`] when the store's
/// authorization policy refuses them; callers decide whether that is fatal.
pub trait GameStore: Send + Sync {
    /// Fetch one game's raw record plus its full participant list.
    fn fetch_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameSnapshot>>>;
    /// Fetch every game with its participants, ordered by date.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameSnapshot>>>;
    /// Insert a new game record and return it with its assigned id.
    fn create_game(&self, record: NewGameRecord) -> BoxFuture<'static, StorageResult<GameEntity>>;
    /// Apply a partial update to a game record.
    fn update_game(
        &self,
        id: Uuid,
        patch: GameRecordPatch,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a game record.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert a participant row, or update their vote when the row exists.
    fn upsert_participant(
        &self,
        game_id: Uuid,
        participant: ParticipantUpsert,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Update a participant's free-text status note.
    fn update_participant_note(
        &self,
        game_id: Uuid,
        user_id: Uuid,
        note: Option<String>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove a single participant row.
    fn delete_participant(
        &self,
        game_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove every participant row of a game.
    fn clear_participants(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<()>>;
    /// Probe the backend for liveness.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
