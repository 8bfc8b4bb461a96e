use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::{GameRecordPatch, GameSnapshot, GameStatus, NewGameRecord, ParticipantUpsert},
    },
    dto::game::{CreateGameRequest, GameUpdate, GameView},
    error::ServiceError,
    reconcile::{self, CONFIRMATION_QUORUM},
    session::SessionContext,
    state::SharedState,
};

/// Schedule a new game with the session user as host and sole participant.
///
/// Alternative times are deduplicated and entries equal to the primary time
/// dropped; the game starts tentative exactly when alternates remain. The
/// creator is inserted voting for the primary time; if that insert is refused
/// the game is left behind with zero participants, which every listing
/// already excludes.
pub async fn create_game(
    state: &SharedState,
    session: &SessionContext,
    request: CreateGameRequest,
) -> Result<GameView, ServiceError> {
    let store = require_store(state).await?;

    if request.primary_time.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "primary time must not be empty".into(),
        ));
    }
    if request.location.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "location must not be empty".into(),
        ));
    }

    let activity_type = if request.activity_type.trim().is_empty() {
        state.config().default_activity().to_owned()
    } else {
        request.activity_type
    };
    let duration_minutes = if request.duration_minutes == 0 {
        state.config().default_duration_minutes()
    } else {
        request.duration_minutes
    };

    let candidate_times = normalize_alternates(&request.primary_time, request.alternative_times);
    let tentative = !candidate_times.is_empty();

    let game = store
        .create_game(NewGameRecord {
            date: request.date,
            primary_time: request.primary_time.clone(),
            duration_minutes,
            activity_type,
            location: request.location,
            note: request.note,
            candidate_times,
            tentative,
            host_id: session.user_id(),
        })
        .await?;

    let creator = ParticipantUpsert {
        user_id: session.user_id(),
        voted_time: Some(request.primary_time),
    };
    if let Err(err) = store.upsert_participant(game.id, creator).await {
        warn!(game_id = %game.id, error = %err, "failed to add creator as participant");
    }

    finish_mutation(&store, game.id).await
}

/// Join a game, optionally voting for one of its proposed times.
///
/// Idempotent: a repeat join updates the existing vote instead of erroring,
/// and the original join timestamp is preserved.
pub async fn join_game(
    state: &SharedState,
    session: &SessionContext,
    game_id: Uuid,
    voted_time: Option<String>,
) -> Result<GameView, ServiceError> {
    let store = require_store(state).await?;
    fetch_snapshot(&store, game_id).await?;

    debug!(
        game_id = %game_id,
        user = %session.display_name(),
        "joining game"
    );
    store
        .upsert_participant(
            game_id,
            ParticipantUpsert {
                user_id: session.user_id(),
                voted_time,
            },
        )
        .await?;

    finish_mutation(&store, game_id).await
}

/// Change the session user's vote to another of the game's proposed times.
///
/// The new time is validated against the candidate set fetched in this call;
/// a concurrent candidate edit between fetch and write is tolerated and the
/// resulting stale vote is simply excluded by the next tally.
pub async fn change_vote(
    state: &SharedState,
    session: &SessionContext,
    game_id: Uuid,
    new_voted_time: String,
) -> Result<GameView, ServiceError> {
    let store = require_store(state).await?;
    let snapshot = fetch_snapshot(&store, game_id).await?;

    if !reconcile::candidate_order(&snapshot.game).contains(&new_voted_time) {
        return Err(ServiceError::InvalidInput(format!(
            "`{new_voted_time}` is not one of the proposed times"
        )));
    }

    store
        .upsert_participant(
            game_id,
            ParticipantUpsert {
                user_id: session.user_id(),
                voted_time: Some(new_voted_time),
            },
        )
        .await?;

    finish_mutation(&store, game_id).await
}

/// Apply a host edit to a game's descriptive fields.
///
/// Replacing the alternative times re-derives the tentative flag. Ownership
/// is enforced by caller policy (and ultimately by the store's own rules),
/// not here.
pub async fn update_game(
    state: &SharedState,
    session: &SessionContext,
    game_id: Uuid,
    update: GameUpdate,
) -> Result<GameView, ServiceError> {
    let store = require_store(state).await?;
    let snapshot = fetch_snapshot(&store, game_id).await?;

    let mut patch = GameRecordPatch {
        date: update.date,
        primary_time: update.primary_time,
        duration_minutes: update.duration_minutes,
        activity_type: update.activity_type,
        location: update.location,
        note: update.note,
        ..GameRecordPatch::default()
    };

    if let Some(alternates) = update.alternative_times {
        let primary = patch
            .primary_time
            .clone()
            .unwrap_or_else(|| snapshot.game.primary_time.clone());
        let alternates = normalize_alternates(&primary, alternates);
        patch.tentative = Some(!alternates.is_empty());
        patch.candidate_times = Some(alternates);
    }

    if patch.is_empty() {
        return Err(ServiceError::InvalidInput("no fields to update".into()));
    }

    debug!(game_id = %game_id, editor = %session.user_id(), "applying host edit");
    store.update_game(game_id, patch).await?;

    finish_mutation(&store, game_id).await
}

/// Update the session user's free-text status note on a game.
pub async fn update_status_note(
    state: &SharedState,
    session: &SessionContext,
    game_id: Uuid,
    note: Option<String>,
) -> Result<GameView, ServiceError> {
    let store = require_store(state).await?;
    fetch_snapshot(&store, game_id).await?;

    store
        .update_participant_note(game_id, session.user_id(), note)
        .await?;

    finish_mutation(&store, game_id).await
}

/// Leave a game.
///
/// When the departing user is the current owner, ownership transfers to the
/// earliest remaining joiner (best-effort persisted); when they are the last
/// participant the game cascades away entirely and `None` is returned. A
/// departure that invalidates a persisted Confirmed status issues the
/// downgrade write before the row delete to shrink the window of incorrect
/// persisted state.
pub async fn leave_game(
    state: &SharedState,
    session: &SessionContext,
    game_id: Uuid,
) -> Result<Option<GameView>, ServiceError> {
    let store = require_store(state).await?;
    let snapshot = fetch_snapshot(&store, game_id).await?;
    let user_id = session.user_id();

    if !snapshot
        .participants
        .iter()
        .any(|participant| participant.user_id == user_id)
    {
        return Err(ServiceError::InvalidState(
            "user is not a participant of this game".into(),
        ));
    }

    let remaining: Vec<_> = snapshot
        .participants
        .iter()
        .filter(|participant| participant.user_id != user_id)
        .cloned()
        .collect();

    if remaining.is_empty() {
        cascade_delete(&store, game_id).await;
        return Ok(None);
    }

    if snapshot.game.status == GameStatus::Confirmed && remaining.len() < CONFIRMATION_QUORUM {
        let patch = GameRecordPatch {
            status: Some(GameStatus::Scheduled),
            ..GameRecordPatch::default()
        };
        if let Err(err) = store.update_game(game_id, patch).await {
            warn!(game_id = %game_id, error = %err, "confirmed downgrade write skipped");
        }
    }

    let owner = reconcile::resolve_owner(&snapshot.participants);
    if owner.map(|participant| participant.user_id) == Some(user_id)
        && let Some(new_owner) = reconcile::resolve_owner(&remaining)
    {
        let patch = GameRecordPatch {
            host_id: Some(new_owner.user_id),
            ..GameRecordPatch::default()
        };
        // Soft transfer: ownership is recomputed from join order on every
        // read, the stored pointer is advisory.
        if let Err(err) = store.update_game(game_id, patch).await {
            warn!(
                game_id = %game_id,
                new_owner = %new_owner.user_id,
                error = %err,
                "ownership transfer write skipped"
            );
        }
    }

    store.delete_participant(game_id, user_id).await?;

    finish_mutation(&store, game_id).await.map(Some)
}

/// Cancel a game: remove its participants, then the record itself.
///
/// Meaningful only when invoked by the current owner; that policy is enforced
/// by the caller and by the store's own rules. Partial failure is tolerated:
/// a record surviving with zero participants is excluded from every listing.
pub async fn cancel_game(
    state: &SharedState,
    session: &SessionContext,
    game_id: Uuid,
) -> Result<(), ServiceError> {
    let store = require_store(state).await?;

    debug!(game_id = %game_id, requester = %session.user_id(), "cancelling game");
    cascade_delete(&store, game_id).await;
    Ok(())
}

/// Fetch a single game as a reconciled view.
///
/// Read paths never write: the view is derived purely, and a record that has
/// lost all participants is reported as not found.
pub async fn load_game(state: &SharedState, game_id: Uuid) -> Result<GameView, ServiceError> {
    let store = require_store(state).await?;
    let snapshot = fetch_snapshot(&store, game_id).await?;

    if snapshot.participants.is_empty() {
        return Err(not_found(game_id));
    }

    let view = reconcile::reconcile(&snapshot.game, &snapshot.participants);
    Ok(GameView::compose(snapshot.game, snapshot.participants, view))
}

/// List every active game as a reconciled view, ordered by date.
///
/// Games with zero participants are abandoned records kept only because their
/// deletion was refused; they are excluded here rather than surfaced.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameView>, ServiceError> {
    let store = require_store(state).await?;

    let views = store
        .list_games()
        .await?
        .into_iter()
        .filter(|snapshot| !snapshot.participants.is_empty())
        .map(|snapshot| {
            let view = reconcile::reconcile(&snapshot.game, &snapshot.participants);
            GameView::compose(snapshot.game, snapshot.participants, view)
        })
        .collect();

    Ok(views)
}

async fn require_store(state: &SharedState) -> Result<Arc<dyn GameStore>, ServiceError> {
    state.game_store().await.ok_or(ServiceError::Degraded)
}

fn not_found(game_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("game `{game_id}` not found"))
}

async fn fetch_snapshot(
    store: &Arc<dyn GameStore>,
    game_id: Uuid,
) -> Result<GameSnapshot, ServiceError> {
    store
        .fetch_game(game_id)
        .await?
        .ok_or_else(|| not_found(game_id))
}

/// Re-read the authoritative state after a mutation, reconcile, attempt the
/// best-effort convergence write, and return the derived view.
async fn finish_mutation(
    store: &Arc<dyn GameStore>,
    game_id: Uuid,
) -> Result<GameView, ServiceError> {
    let snapshot = fetch_snapshot(store, game_id).await?;
    Ok(reconcile_and_persist(store, snapshot).await)
}

async fn reconcile_and_persist(store: &Arc<dyn GameStore>, snapshot: GameSnapshot) -> GameView {
    let view = reconcile::reconcile(&snapshot.game, &snapshot.participants);

    if let Some(patch) = reconcile::convergence_patch(&snapshot.game, &view)
        && let Err(err) = store.update_game(snapshot.game.id, patch).await
    {
        // Expected under restrictive write policies; the derived view stands
        // and the next pass recomputes the same state.
        warn!(game_id = %snapshot.game.id, error = %err, "derived-state write skipped");
    }

    GameView::compose(snapshot.game, snapshot.participants, view)
}

async fn cascade_delete(store: &Arc<dyn GameStore>, game_id: Uuid) {
    if let Err(err) = store.clear_participants(game_id).await {
        warn!(game_id = %game_id, error = %err, "participant purge incomplete");
    }
    if let Err(err) = store.delete_game(game_id).await {
        warn!(game_id = %game_id, error = %err, "game record delete skipped");
    }
}

/// Deduplicate proposed alternates, dropping blanks and the primary time.
fn normalize_alternates(primary_time: &str, alternates: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for alternate in alternates {
        let alternate = alternate.trim().to_owned();
        if alternate.is_empty() || alternate == primary_time || seen.contains(&alternate) {
            continue;
        }
        seen.push(alternate);
    }
    seen
}

#[cfg(all(test, feature = "memory-store"))]
mod tests {
    use std::sync::Arc;

    use time::macros::date;
    use uuid::Uuid;

    use crate::{
        config::AppConfig,
        dao::game_store::memory::MemoryGameStore,
        dao::models::{GameStatus, PLACEHOLDER_DISPLAY_NAME},
        dto::game::{CreateGameRequest, GameUpdate},
        reconcile::ReconciledStatus,
        session::SessionContext,
        state::{AppState, SharedState},
    };

    use super::*;

    fn trace_init() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    async fn state_with_store() -> (SharedState, MemoryGameStore) {
        trace_init();
        let state = AppState::new(AppConfig::default());
        let store = MemoryGameStore::new();
        state.install_game_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn player(store: &MemoryGameStore, name: &str) -> SessionContext {
        let session = SessionContext::sign_in(Uuid::new_v4(), name);
        store.register_profile(session.user_id(), name, None);
        session
    }

    fn request(primary: &str, alternates: &[&str]) -> CreateGameRequest {
        CreateGameRequest {
            date: date!(2026 - 06 - 12),
            primary_time: primary.into(),
            duration_minutes: 90,
            activity_type: "Padel".into(),
            location: "Central Court".into(),
            note: None,
            alternative_times: alternates.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    #[tokio::test]
    async fn create_seeds_creator_with_primary_vote() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");

        let view = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        assert_eq!(view.status, ReconciledStatus::Scheduled);
        assert_eq!(view.canonical_time, "18:00");
        assert!(!view.tentative);
        assert_eq!(view.owner_id, Some(host.user_id()));
        assert_eq!(view.participants.len(), 1);
        assert_eq!(view.participants[0].voted_time.as_deref(), Some("18:00"));
        assert_eq!(view.votes.get("18:00"), Some(&1));
    }

    #[tokio::test]
    async fn create_dedupes_alternates_and_derives_tentative() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");

        let view = create_game(
            &state,
            &host,
            request("18:00", &["19:00", "18:00", "19:00", " "]),
        )
        .await
        .unwrap();

        assert_eq!(view.candidate_times, vec!["19:00".to_owned()]);
        assert!(view.tentative);
        assert_eq!(view.status, ReconciledStatus::TentativeVoting);
    }

    #[tokio::test]
    async fn fourth_join_confirms_single_time_game() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        for name in ["Sarah", "Mike"] {
            let joiner = player(&store, name);
            let view = join_game(&state, &joiner, game.id, Some("18:00".into()))
                .await
                .unwrap();
            assert_eq!(view.status, ReconciledStatus::Scheduled);
        }

        let fourth = player(&store, "Donna");
        let view = join_game(&state, &fourth, game.id, Some("18:00".into()))
            .await
            .unwrap();

        assert_eq!(view.participants.len(), 4);
        assert_eq!(view.status, ReconciledStatus::Confirmed);
        assert_eq!(view.canonical_time, "18:00");

        // The convergence write stuck, so the persisted record agrees now.
        let stored = store.fetch_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.game.status, GameStatus::Confirmed);
    }

    #[tokio::test]
    async fn vote_reaching_quorum_locks_the_winning_time() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &["19:00", "20:00"]))
            .await
            .unwrap();

        let votes = [("Sarah", "18:00"), ("Mike", "19:00"), ("Harvey", "19:00")];
        let mut view = game;
        for (name, vote) in votes {
            let joiner = player(&store, name);
            view = join_game(&state, &joiner, view.id, Some(vote.into()))
                .await
                .unwrap();
        }
        assert_eq!(view.status, ReconciledStatus::TentativeVoting);
        assert_eq!(view.canonical_time, "18:00");
        assert!(view.tentative);

        for name in ["Donna", "Jessica"] {
            let joiner = player(&store, name);
            view = join_game(&state, &joiner, view.id, Some("19:00".into()))
                .await
                .unwrap();
        }

        assert_eq!(view.status, ReconciledStatus::Confirmed);
        assert_eq!(view.canonical_time, "19:00");
        assert!(!view.tentative);
        assert_eq!(view.votes.get("19:00"), Some(&4));

        let stored = store.fetch_game(view.id).await.unwrap().unwrap();
        assert_eq!(stored.game.primary_time, "19:00");
        assert!(!stored.game.tentative);
        assert_eq!(stored.game.status, GameStatus::Confirmed);
    }

    #[tokio::test]
    async fn rejected_status_write_is_swallowed_and_self_heals() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        for name in ["Sarah", "Mike"] {
            let joiner = player(&store, name);
            join_game(&state, &joiner, game.id, Some("18:00".into()))
                .await
                .unwrap();
        }

        store.set_reject_record_writes(true);
        let fourth = player(&store, "Donna");
        let view = join_game(&state, &fourth, game.id, Some("18:00".into()))
            .await
            .unwrap();

        // The caller still gets the correct derived view.
        assert_eq!(view.status, ReconciledStatus::Confirmed);
        let stored = store.fetch_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.game.status, GameStatus::Scheduled);

        // Reads keep deriving the truth from primitives.
        let reloaded = load_game(&state, game.id).await.unwrap();
        assert_eq!(reloaded.status, ReconciledStatus::Confirmed);

        // Once the policy relents, any mutation pass converges the record.
        store.set_reject_record_writes(false);
        join_game(&state, &fourth, game.id, Some("18:00".into()))
            .await
            .unwrap();
        let stored = store.fetch_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.game.status, GameStatus::Confirmed);
    }

    #[tokio::test]
    async fn leave_downgrades_confirmed_game_below_quorum() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        let mut joiners = Vec::new();
        for name in ["Sarah", "Mike", "Donna"] {
            let joiner = player(&store, name);
            join_game(&state, &joiner, game.id, Some("18:00".into()))
                .await
                .unwrap();
            joiners.push(joiner);
        }

        let view = leave_game(&state, &joiners[2], game.id)
            .await
            .unwrap()
            .expect("game still has participants");

        assert_eq!(view.participants.len(), 3);
        assert_eq!(view.status, ReconciledStatus::Scheduled);
        let stored = store.fetch_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.game.status, GameStatus::Scheduled);
    }

    #[tokio::test]
    async fn owner_leave_transfers_to_next_earliest_joiner() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let second = player(&store, "Sarah");
        let third = player(&store, "Mike");

        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();
        join_game(&state, &second, game.id, None).await.unwrap();
        join_game(&state, &third, game.id, None).await.unwrap();

        let view = leave_game(&state, &host, game.id)
            .await
            .unwrap()
            .expect("two participants remain");

        assert_eq!(view.participants.len(), 2);
        assert_eq!(view.owner_id, Some(second.user_id()));
        let stored = store.fetch_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.game.host_id, Some(second.user_id()));
    }

    #[tokio::test]
    async fn owner_transfer_survives_rejected_host_write() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let second = player(&store, "Sarah");

        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();
        join_game(&state, &second, game.id, None).await.unwrap();

        store.set_reject_record_writes(true);
        let view = leave_game(&state, &host, game.id)
            .await
            .unwrap()
            .expect("one participant remains");

        // Derived ownership moved even though the stored pointer is stale.
        assert_eq!(view.owner_id, Some(second.user_id()));
        let stored = store.fetch_game(game.id).await.unwrap().unwrap();
        assert_eq!(stored.game.host_id, Some(host.user_id()));
    }

    #[tokio::test]
    async fn last_leave_cascades_and_hides_the_game() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        let view = leave_game(&state, &host, game.id).await.unwrap();
        assert!(view.is_none());

        assert!(store.fetch_game(game.id).await.unwrap().is_none());
        assert!(list_games(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_tolerates_policy_rejection_of_record_delete() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let second = player(&store, "Sarah");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();
        join_game(&state, &second, game.id, None).await.unwrap();

        store.set_reject_record_writes(true);
        cancel_game(&state, &host, game.id).await.unwrap();

        // The record survived the refused delete but lost its participants,
        // so every listing hides it.
        let stored = store.fetch_game(game.id).await.unwrap().unwrap();
        assert!(stored.participants.is_empty());
        assert!(list_games(&state).await.unwrap().is_empty());
        assert!(matches!(
            load_game(&state, game.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn repeat_join_updates_vote_and_keeps_join_order() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let second = player(&store, "Sarah");

        let game = create_game(&state, &host, request("18:00", &["19:00"]))
            .await
            .unwrap();
        join_game(&state, &second, game.id, Some("18:00".into()))
            .await
            .unwrap();

        let view = join_game(&state, &host, game.id, Some("19:00".into()))
            .await
            .unwrap();

        assert_eq!(view.participants.len(), 2);
        assert_eq!(view.participants[0].user_id, host.user_id());
        assert_eq!(view.participants[0].voted_time.as_deref(), Some("19:00"));
        assert_eq!(view.owner_id, Some(host.user_id()));
    }

    #[tokio::test]
    async fn change_vote_requires_a_proposed_time() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &["19:00"]))
            .await
            .unwrap();

        let err = change_vote(&state, &host, game.id, "21:00".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let view = change_vote(&state, &host, game.id, "19:00".into())
            .await
            .unwrap();
        assert_eq!(view.participants[0].voted_time.as_deref(), Some("19:00"));
    }

    #[tokio::test]
    async fn host_edit_rederives_tentative_from_alternates() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        let update = GameUpdate {
            alternative_times: Some(vec!["19:00".into()]),
            ..GameUpdate::default()
        };
        let view = update_game(&state, &host, game.id, update).await.unwrap();
        assert!(view.tentative);
        assert_eq!(view.status, ReconciledStatus::TentativeVoting);

        let update = GameUpdate {
            alternative_times: Some(Vec::new()),
            ..GameUpdate::default()
        };
        let view = update_game(&state, &host, game.id, update).await.unwrap();
        assert!(!view.tentative);
        assert_eq!(view.status, ReconciledStatus::Scheduled);
    }

    #[tokio::test]
    async fn status_note_round_trips_through_the_view() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        let view = update_status_note(&state, &host, game.id, Some("bring balls".into()))
            .await
            .unwrap();

        assert_eq!(
            view.participants[0].status_note.as_deref(),
            Some("bring balls")
        );
    }

    #[tokio::test]
    async fn participant_without_profile_gets_placeholder_identity() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        // No profile registered for this user.
        let stranger = SessionContext::sign_in(Uuid::new_v4(), "Stranger");
        let view = join_game(&state, &stranger, game.id, None).await.unwrap();

        let row = view
            .participants
            .iter()
            .find(|participant| participant.user_id == stranger.user_id())
            .unwrap();
        assert_eq!(row.display_name, PLACEHOLDER_DISPLAY_NAME);
    }

    #[tokio::test]
    async fn degraded_mode_fails_fast() {
        trace_init();
        let state = AppState::new(AppConfig::default());
        let session = SessionContext::sign_in(Uuid::new_v4(), "Alex");

        let err = join_game(&state, &session, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
        assert!(state.is_degraded().await);
    }

    #[tokio::test]
    async fn join_on_missing_game_is_not_found() {
        let (state, store) = state_with_store().await;
        let session = player(&store, "Alex");

        let err = join_game(&state, &session, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn leaving_without_membership_is_invalid_state() {
        let (state, store) = state_with_store().await;
        let host = player(&store, "Alex");
        let outsider = player(&store, "Sarah");
        let game = create_game(&state, &host, request("18:00", &[]))
            .await
            .unwrap();

        let err = leave_game(&state, &outsider, game.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
