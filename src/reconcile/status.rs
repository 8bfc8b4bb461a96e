use crate::dao::models::{GameEntity, GameRecordPatch, GameStatus, ParticipantEntity};

use super::{CONFIRMATION_QUORUM, ReconciledStatus, ReconciledView, VoteTally, resolve_owner};

/// Full candidate list in voting order: the primary time first, then the
/// alternates in proposal order, with duplicates of the primary dropped.
pub fn candidate_order(game: &GameEntity) -> Vec<String> {
    let mut candidates = Vec::with_capacity(1 + game.candidate_times.len());
    candidates.push(game.primary_time.clone());
    for alternate in &game.candidate_times {
        if alternate != &game.primary_time {
            candidates.push(alternate.clone());
        }
    }
    candidates
}

/// Recompute the canonical view of a game from its raw record and live
/// participant list.
///
/// Trusts `candidate_times`, `primary_time`, and the participants; ignores
/// the stored `status` and `host_id` entirely. A stored `Confirmed` with
/// fewer than [`CONFIRMATION_QUORUM`] participants therefore downgrades
/// naturally instead of short-circuiting on the stale column.
///
/// While alternates exist the vote is re-tallied on every pass: a candidate
/// at quorum locks the time in, and the same recomputation keeps yielding it
/// on later reads even when the confirmation write never stuck.
pub fn reconcile(game: &GameEntity, participants: &[ParticipantEntity]) -> ReconciledView {
    let owner = resolve_owner(participants).map(|participant| participant.user_id);

    if !game.candidate_times.is_empty() {
        let tally = VoteTally::count(&candidate_order(game), participants);
        if let Some(winner) = tally.winner(CONFIRMATION_QUORUM) {
            return ReconciledView {
                status: ReconciledStatus::Confirmed,
                canonical_time: winner.to_owned(),
                tentative: false,
                owner,
            };
        }

        return ReconciledView {
            status: ReconciledStatus::TentativeVoting,
            canonical_time: game.primary_time.clone(),
            tentative: true,
            owner,
        };
    }

    let status = if participants.len() >= CONFIRMATION_QUORUM {
        ReconciledStatus::Confirmed
    } else {
        ReconciledStatus::Scheduled
    };

    ReconciledView {
        status,
        canonical_time: game.primary_time.clone(),
        tentative: false,
        owner,
    }
}

/// Build the record patch that would bring the persisted columns in line with
/// a derived view, or `None` when the record already agrees.
///
/// The patch is advisory: the caller fires it best-effort and swallows
/// rejections, since the view returned to presentation code is already
/// correct.
pub fn convergence_patch(game: &GameEntity, view: &ReconciledView) -> Option<GameRecordPatch> {
    let target_status = match view.status {
        ReconciledStatus::Confirmed => GameStatus::Confirmed,
        ReconciledStatus::Scheduled | ReconciledStatus::TentativeVoting => GameStatus::Scheduled,
    };

    let mut patch = GameRecordPatch::default();
    if game.status != target_status {
        patch.status = Some(target_status);
    }
    if game.tentative != view.tentative {
        patch.tentative = Some(view.tentative);
    }
    if game.primary_time != view.canonical_time {
        patch.primary_time = Some(view.canonical_time.clone());
    }

    if patch.is_empty() { None } else { Some(patch) }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use time::macros::date;
    use uuid::Uuid;

    use super::*;

    fn game(candidate_times: &[&str], status: GameStatus, tentative: bool) -> GameEntity {
        GameEntity {
            id: Uuid::new_v4(),
            date: date!(2026 - 06 - 12),
            primary_time: "18:00".into(),
            duration_minutes: 90,
            activity_type: "Padel".into(),
            location: "Central Court".into(),
            note: None,
            candidate_times: candidate_times.iter().map(|t| (*t).to_owned()).collect(),
            tentative,
            status,
            host_id: None,
        }
    }

    fn voter(vote: Option<&str>) -> ParticipantEntity {
        ParticipantEntity {
            user_id: Uuid::new_v4(),
            joined_at: OffsetDateTime::UNIX_EPOCH,
            voted_time: vote.map(str::to_owned),
            status_note: None,
            display_name: "Player".into(),
            avatar_url: None,
        }
    }

    fn voters(votes: &[&str]) -> Vec<ParticipantEntity> {
        votes.iter().map(|vote| voter(Some(vote))).collect()
    }

    #[test]
    fn single_time_game_confirms_at_quorum() {
        let game = game(&[], GameStatus::Scheduled, false);

        let three = reconcile(&game, &voters(&["18:00", "18:00", "18:00"]));
        assert_eq!(three.status, ReconciledStatus::Scheduled);
        assert_eq!(three.canonical_time, "18:00");

        let four = reconcile(&game, &voters(&["18:00", "18:00", "18:00", "18:00"]));
        assert_eq!(four.status, ReconciledStatus::Confirmed);
        assert_eq!(four.canonical_time, "18:00");
        assert!(!four.tentative);
    }

    #[test]
    fn split_vote_stays_tentative() {
        let game = game(&["19:00", "20:00"], GameStatus::Scheduled, true);
        let view = reconcile(&game, &voters(&["18:00", "18:00", "19:00", "19:00"]));

        assert_eq!(view.status, ReconciledStatus::TentativeVoting);
        assert_eq!(view.canonical_time, "18:00");
        assert!(view.tentative);
    }

    #[test]
    fn vote_reaching_quorum_locks_the_winner() {
        let game = game(&["19:00", "20:00"], GameStatus::Scheduled, true);
        let view = reconcile(
            &game,
            &voters(&["18:00", "18:00", "19:00", "19:00", "19:00", "19:00"]),
        );

        assert_eq!(view.status, ReconciledStatus::Confirmed);
        assert_eq!(view.canonical_time, "19:00");
        assert!(!view.tentative);
    }

    #[test]
    fn stored_confirmed_downgrades_below_quorum() {
        let game = game(&[], GameStatus::Confirmed, false);
        let view = reconcile(&game, &voters(&["18:00", "18:00", "18:00"]));

        assert_eq!(view.status, ReconciledStatus::Scheduled);
    }

    #[test]
    fn stored_confirmed_downgrades_into_voting() {
        let game = game(&["19:00"], GameStatus::Confirmed, false);
        let view = reconcile(&game, &voters(&["19:00", "19:00", "19:00"]));

        assert_eq!(view.status, ReconciledStatus::TentativeVoting);
        assert!(view.tentative);
        assert_eq!(view.canonical_time, "18:00");
    }

    #[test]
    fn owner_is_carried_into_the_view() {
        let game = game(&[], GameStatus::Scheduled, false);
        let participants = voters(&["18:00", "18:00"]);

        let view = reconcile(&game, &participants);
        assert_eq!(view.owner, Some(participants[0].user_id));

        let empty = reconcile(&game, &[]);
        assert_eq!(empty.owner, None);
    }

    #[test]
    fn candidate_order_puts_primary_first_and_dedupes() {
        let game = game(&["19:00", "18:00", "20:00"], GameStatus::Scheduled, true);
        assert_eq!(candidate_order(&game), ["18:00", "19:00", "20:00"]);
    }

    #[test]
    fn convergence_patch_targets_diverging_columns() {
        let record = game(&["19:00"], GameStatus::Scheduled, true);
        let view = reconcile(
            &record,
            &voters(&["19:00", "19:00", "19:00", "19:00", "18:00"]),
        );

        let patch = convergence_patch(&record, &view).unwrap();
        assert_eq!(patch.status, Some(GameStatus::Confirmed));
        assert_eq!(patch.tentative, Some(false));
        assert_eq!(patch.primary_time, Some("19:00".into()));
        assert_eq!(patch.host_id, None);
    }

    #[test]
    fn convergence_patch_is_none_when_record_agrees() {
        let record = game(&[], GameStatus::Scheduled, false);
        let view = reconcile(&record, &voters(&["18:00"]));

        assert_eq!(convergence_patch(&record, &view), None);
    }
}
