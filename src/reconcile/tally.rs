use indexmap::IndexMap;

use crate::dao::models::ParticipantEntity;

/// Vote counts per candidate time, keyed in declared candidate order.
///
/// A vote referencing a time that is no longer in the candidate list is
/// excluded from every count; the participant still counts toward raw
/// head-count checks elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    counts: IndexMap<String, usize>,
}

impl VoteTally {
    /// Count votes over `candidates` (primary time first, then alternates in
    /// proposal order). The result is independent of participant order.
    pub fn count(candidates: &[String], participants: &[ParticipantEntity]) -> Self {
        let mut counts: IndexMap<String, usize> = candidates
            .iter()
            .map(|candidate| (candidate.clone(), 0))
            .collect();

        for participant in participants {
            if let Some(vote) = &participant.voted_time
                && let Some(slot) = counts.get_mut(vote)
            {
                *slot += 1;
            }
        }

        Self { counts }
    }

    /// First candidate in declared order whose count reaches `quorum`.
    ///
    /// Declared order is what makes the winner deterministic when two
    /// candidates reach quorum in the same snapshot.
    pub fn winner(&self, quorum: usize) -> Option<&str> {
        self.counts
            .iter()
            .find(|(_, count)| **count >= quorum)
            .map(|(candidate, _)| candidate.as_str())
    }

    /// Votes recorded for a single candidate (0 for unknown candidates).
    pub fn votes_for(&self, candidate: &str) -> usize {
        self.counts.get(candidate).copied().unwrap_or(0)
    }

    /// Counts per candidate, in declared candidate order.
    pub fn counts(&self) -> &IndexMap<String, usize> {
        &self.counts
    }
}
