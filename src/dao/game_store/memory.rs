//! In-memory [`GameStore`] backend.
//!
//! Used by tests and demos. Backed by concurrent maps; ids and join
//! timestamps are assigned locally. A toggle simulates the authorization
//! policy of a real backend refusing game-record writes, so the best-effort
//! persistence paths can be exercised without a server.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures::future::BoxFuture;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{
        GameEntity, GameRecordPatch, GameSnapshot, GameStatus, NewGameRecord,
        PLACEHOLDER_DISPLAY_NAME, ParticipantEntity, ParticipantUpsert,
    },
    storage::{StorageError, StorageResult},
};

/// Failures specific to the in-memory backend.
#[derive(Debug, Error)]
pub enum MemoryDaoError {
    /// A participant write referenced a game that does not exist.
    #[error("game `{id}` not found")]
    MissingGame {
        /// Identifier the write referenced.
        id: Uuid,
    },
}

impl From<MemoryDaoError> for StorageError {
    fn from(err: MemoryDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

#[derive(Debug, Clone)]
struct StoredGame {
    game: GameEntity,
    participants: Vec<StoredParticipant>,
}

#[derive(Debug, Clone)]
struct StoredParticipant {
    user_id: Uuid,
    joined_at: OffsetDateTime,
    voted_time: Option<String>,
    status_note: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct StoredProfile {
    display_name: String,
    avatar_url: Option<String>,
}

struct Inner {
    games: DashMap<Uuid, StoredGame>,
    profiles: DashMap<Uuid, StoredProfile>,
    reject_record_writes: AtomicBool,
}

/// Concurrent in-memory game store.
#[derive(Clone)]
pub struct MemoryGameStore {
    inner: Arc<Inner>,
}

impl Default for MemoryGameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                games: DashMap::new(),
                profiles: DashMap::new(),
                reject_record_writes: AtomicBool::new(false),
            }),
        }
    }

    /// Register a profile so participant reads resolve a display identity.
    /// Participants without a registered profile resolve to the placeholder.
    pub fn register_profile(
        &self,
        user_id: Uuid,
        display_name: impl Into<String>,
        avatar_url: Option<String>,
    ) {
        self.inner.profiles.insert(
            user_id,
            StoredProfile {
                display_name: display_name.into(),
                avatar_url,
            },
        );
    }

    /// Toggle simulated policy rejection of game-record writes
    /// (`update_game` / `delete_game`).
    pub fn set_reject_record_writes(&self, reject: bool) {
        self.inner
            .reject_record_writes
            .store(reject, Ordering::SeqCst);
    }

    fn record_writes_rejected(&self) -> bool {
        self.inner.reject_record_writes.load(Ordering::SeqCst)
    }

    fn snapshot_of(&self, stored: &StoredGame) -> GameSnapshot {
        let participants = stored
            .participants
            .iter()
            .map(|row| {
                let profile = self
                    .inner
                    .profiles
                    .get(&row.user_id)
                    .map(|entry| entry.value().clone());
                let (display_name, avatar_url) = match profile {
                    Some(profile) => (profile.display_name, profile.avatar_url),
                    None => (PLACEHOLDER_DISPLAY_NAME.to_owned(), None),
                };
                ParticipantEntity {
                    user_id: row.user_id,
                    joined_at: row.joined_at,
                    voted_time: row.voted_time.clone(),
                    status_note: row.status_note.clone(),
                    display_name,
                    avatar_url,
                }
            })
            .collect();

        GameSnapshot {
            game: stored.game.clone(),
            participants,
        }
    }
}

impl GameStore for MemoryGameStore {
    fn fetch_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameSnapshot>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .games
                .get(&id)
                .map(|entry| store.snapshot_of(entry.value())))
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameSnapshot>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut snapshots: Vec<GameSnapshot> = store
                .inner
                .games
                .iter()
                .map(|entry| store.snapshot_of(entry.value()))
                .collect();
            snapshots.sort_by(|a, b| {
                a.game
                    .date
                    .cmp(&b.game.date)
                    .then_with(|| a.game.primary_time.cmp(&b.game.primary_time))
            });
            Ok(snapshots)
        })
    }

    fn create_game(&self, record: NewGameRecord) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let game = GameEntity {
                id: Uuid::new_v4(),
                date: record.date,
                primary_time: record.primary_time,
                duration_minutes: record.duration_minutes,
                activity_type: record.activity_type,
                location: record.location,
                note: record.note,
                candidate_times: record.candidate_times,
                tentative: record.tentative,
                status: GameStatus::Scheduled,
                host_id: Some(record.host_id),
            };

            store.inner.games.insert(
                game.id,
                StoredGame {
                    game: game.clone(),
                    participants: Vec::new(),
                },
            );

            Ok(game)
        })
    }

    fn update_game(
        &self,
        id: Uuid,
        patch: GameRecordPatch,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if store.record_writes_rejected() {
                return Err(StorageError::rejected(format!(
                    "policy refused update of game `{id}`"
                )));
            }

            if let Some(mut entry) = store.inner.games.get_mut(&id) {
                let game = &mut entry.value_mut().game;
                if let Some(date) = patch.date {
                    game.date = date;
                }
                if let Some(primary_time) = patch.primary_time {
                    game.primary_time = primary_time;
                }
                if let Some(duration) = patch.duration_minutes {
                    game.duration_minutes = duration;
                }
                if let Some(activity_type) = patch.activity_type {
                    game.activity_type = activity_type;
                }
                if let Some(location) = patch.location {
                    game.location = location;
                }
                if let Some(note) = patch.note {
                    game.note = Some(note);
                }
                if let Some(candidate_times) = patch.candidate_times {
                    game.candidate_times = candidate_times;
                }
                if let Some(tentative) = patch.tentative {
                    game.tentative = tentative;
                }
                if let Some(status) = patch.status {
                    game.status = status;
                }
                if let Some(host_id) = patch.host_id {
                    game.host_id = Some(host_id);
                }
            }

            Ok(())
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if store.record_writes_rejected() {
                return Err(StorageError::rejected(format!(
                    "policy refused delete of game `{id}`"
                )));
            }

            store.inner.games.remove(&id);
            Ok(())
        })
    }

    fn upsert_participant(
        &self,
        game_id: Uuid,
        participant: ParticipantUpsert,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut entry = store
                .inner
                .games
                .get_mut(&game_id)
                .ok_or(MemoryDaoError::MissingGame { id: game_id })?;
            let rows = &mut entry.value_mut().participants;

            if let Some(existing) = rows
                .iter_mut()
                .find(|row| row.user_id == participant.user_id)
            {
                existing.voted_time = participant.voted_time;
                return Ok(());
            }

            // Keep join timestamps strictly increasing even on coarse clocks
            // so host selection stays deterministic.
            let mut joined_at = OffsetDateTime::now_utc();
            if let Some(last) = rows.last()
                && joined_at <= last.joined_at
            {
                joined_at = last.joined_at + Duration::from_micros(1);
            }

            rows.push(StoredParticipant {
                user_id: participant.user_id,
                joined_at,
                voted_time: participant.voted_time,
                status_note: None,
            });

            Ok(())
        })
    }

    fn update_participant_note(
        &self,
        game_id: Uuid,
        user_id: Uuid,
        note: Option<String>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if let Some(mut entry) = store.inner.games.get_mut(&game_id)
                && let Some(row) = entry
                    .value_mut()
                    .participants
                    .iter_mut()
                    .find(|row| row.user_id == user_id)
            {
                row.status_note = note;
            }
            Ok(())
        })
    }

    fn delete_participant(
        &self,
        game_id: Uuid,
        user_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if let Some(mut entry) = store.inner.games.get_mut(&game_id) {
                entry
                    .value_mut()
                    .participants
                    .retain(|row| row.user_id != user_id);
            }
            Ok(())
        })
    }

    fn clear_participants(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if let Some(mut entry) = store.inner.games.get_mut(&game_id) {
                entry.value_mut().participants.clear();
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
