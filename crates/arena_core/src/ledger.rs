//! Participant ledger with invariant-checked mutators.
//!
//! The ledger is the only place participant state changes. Every mutator
//! either applies completely or leaves the ledger untouched and reports why.
//!
//! # Invariants
//!
//! - `alive_count + eliminated_count == total` after every mutation, where
//!   `eliminated_count` counts elimination records still marked active.
//! - A participant appears in the used-revival set at most once.
//! - Eliminating a dead participant or reviving a living one is rejected.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ArenaError, Result};
use crate::participant::{Participant, ParticipantId, ParticipantProfile};

/// One entry in the elimination log.
///
/// Records are never removed. A revival clears the `active` marker so the
/// entry stays for history but no longer counts as an elimination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EliminationRecord {
    participant: ParticipantId,
    round: u32,
    killer: Option<ParticipantId>,
    active: bool,
}

impl EliminationRecord {
    /// Who was eliminated.
    #[must_use]
    pub const fn participant(&self) -> ParticipantId {
        self.participant
    }

    /// Round the elimination happened in.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Participant credited with the elimination, if any.
    #[must_use]
    pub const fn killer(&self) -> Option<ParticipantId> {
        self.killer
    }

    /// False once the participant has been revived.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone)]
struct AliveCache {
    round: u32,
    ids: Vec<ParticipantId>,
}

/// Participant bookkeeping for one session.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    participants: HashMap<ParticipantId, Participant>,
    /// Join order; the only iteration order used for decisions.
    roster: Vec<ParticipantId>,
    log: Vec<EliminationRecord>,
    used_revival: HashSet<ParticipantId>,
    round: u32,
    alive_cache: RefCell<Option<AliveCache>>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant at the end of the join order.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::DuplicateParticipant`] if the id is already present.
    pub fn admit(&mut self, id: ParticipantId, profile: ParticipantProfile) -> Result<()> {
        if self.participants.contains_key(&id) {
            return Err(ArenaError::DuplicateParticipant(id));
        }
        let join_index = self.roster.len();
        self.participants
            .insert(id, Participant::new(id, profile, join_index));
        self.roster.push(id);
        self.invalidate();
        Ok(())
    }

    /// Set the round used to key the alive-id cache and stamp new records.
    pub(crate) fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    /// Current round as seen by the ledger.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Eliminate a participant, crediting `killer` if they are alive.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::ParticipantNotFound`] if either id is unknown.
    /// - [`ArenaError::AlreadyEliminated`] if the victim is already out.
    pub fn eliminate(
        &mut self,
        id: ParticipantId,
        killer: Option<ParticipantId>,
    ) -> Result<EliminationRecord> {
        let victim = self
            .participants
            .get(&id)
            .ok_or(ArenaError::ParticipantNotFound(id))?;
        if !victim.alive {
            return Err(ArenaError::AlreadyEliminated(id));
        }
        if let Some(killer_id) = killer {
            if !self.participants.contains_key(&killer_id) {
                return Err(ArenaError::ParticipantNotFound(killer_id));
            }
        }

        if let Some(victim) = self.participants.get_mut(&id) {
            victim.alive = false;
        }

        // Credit only a killer still in play; a self-kill credits nobody.
        let credited = killer.filter(|k| self.is_alive(*k));
        if let Some(killer_id) = credited {
            self.record_kill(killer_id)?;
        }

        let record = EliminationRecord {
            participant: id,
            round: self.round,
            killer: credited,
            active: true,
        };
        self.log.push(record.clone());
        self.invalidate();
        self.debug_validate();
        Ok(record)
    }

    /// Credit one kill to a living participant and return their new total.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::ParticipantNotFound`] if the id is unknown.
    /// - [`ArenaError::AlreadyEliminated`] if the participant is out.
    pub fn record_kill(&mut self, killer: ParticipantId) -> Result<u32> {
        let participant = self
            .participants
            .get_mut(&killer)
            .ok_or(ArenaError::ParticipantNotFound(killer))?;
        if !participant.alive {
            return Err(ArenaError::AlreadyEliminated(killer));
        }
        participant.kills += 1;
        Ok(participant.kills)
    }

    /// Bring an eliminated participant back into play.
    ///
    /// Returns `Ok(false)` without changing anything if the participant has
    /// already used their one revival.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::ParticipantNotFound`] if the id is unknown.
    /// - [`ArenaError::StillAlive`] if the participant is in play.
    pub fn revive(&mut self, id: ParticipantId) -> Result<bool> {
        let participant = self
            .participants
            .get(&id)
            .ok_or(ArenaError::ParticipantNotFound(id))?;
        if participant.alive {
            return Err(ArenaError::StillAlive(id));
        }
        if self.used_revival.contains(&id) {
            return Ok(false);
        }

        if let Some(participant) = self.participants.get_mut(&id) {
            participant.alive = true;
            participant.revivals += 1;
        }
        self.used_revival.insert(id);
        if let Some(record) = self
            .log
            .iter_mut()
            .rev()
            .find(|r| r.participant == id && r.active)
        {
            record.active = false;
        }
        self.invalidate();
        self.debug_validate();
        Ok(true)
    }

    /// Living participant ids in join order.
    ///
    /// Cached per round and invalidated by every mutation.
    #[must_use]
    pub fn alive_ids(&self) -> Vec<ParticipantId> {
        let mut cache = self.alive_cache.borrow_mut();
        if let Some(cached) = cache.as_ref() {
            if cached.round == self.round {
                return cached.ids.clone();
            }
        }
        let ids: Vec<ParticipantId> = self
            .roster
            .iter()
            .copied()
            .filter(|id| self.is_alive(*id))
            .collect();
        *cache = Some(AliveCache {
            round: self.round,
            ids: ids.clone(),
        });
        ids
    }

    /// Number of living participants.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.participants.values().filter(|p| p.alive).count()
    }

    /// Number of elimination records still marked active.
    #[must_use]
    pub fn eliminated_count(&self) -> usize {
        self.log.iter().filter(|r| r.active).count()
    }

    /// Total participants admitted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.roster.len()
    }

    /// Whether the id is known and alive.
    #[must_use]
    pub fn is_alive(&self, id: ParticipantId) -> bool {
        self.participants.get(&id).is_some_and(|p| p.alive)
    }

    /// Look up a participant.
    #[must_use]
    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// All participants in join order.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.roster.iter().filter_map(|id| self.participants.get(id))
    }

    /// Full elimination history, oldest first.
    #[must_use]
    pub fn elimination_log(&self) -> &[EliminationRecord] {
        &self.log
    }

    /// Whether the participant has spent their revival.
    #[must_use]
    pub fn has_used_revival(&self, id: ParticipantId) -> bool {
        self.used_revival.contains(&id)
    }

    /// Most recently eliminated participant who can still be revived.
    #[must_use]
    pub fn latest_revival_candidate(&self) -> Option<ParticipantId> {
        self.log
            .iter()
            .rev()
            .filter(|r| r.active)
            .map(|r| r.participant)
            .find(|id| !self.used_revival.contains(id) && !self.is_alive(*id))
    }

    /// Top `limit` participants by kills, ties broken by join order.
    #[must_use]
    pub fn leaderboard(&self, limit: usize) -> Vec<&Participant> {
        let mut ranked: Vec<&Participant> = self.participants().filter(|p| p.kills > 0).collect();
        ranked.sort_by(|a, b| b.kills.cmp(&a.kills).then(a.join_index.cmp(&b.join_index)));
        ranked.truncate(limit);
        ranked
    }

    /// Check the bookkeeping invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::InvariantViolation`] describing the first broken rule.
    pub fn verify_invariants(&self) -> Result<()> {
        let violation = |message: String| ArenaError::InvariantViolation {
            round: self.round,
            message,
        };

        let alive = self.alive_count();
        let eliminated = self.eliminated_count();
        if alive + eliminated != self.total() {
            return Err(violation(format!(
                "alive {alive} + eliminated {eliminated} != total {}",
                self.total()
            )));
        }

        for participant in self.participants() {
            let active_records = self
                .log
                .iter()
                .filter(|r| r.active && r.participant == participant.id)
                .count();
            let expected = usize::from(!participant.alive);
            if active_records != expected {
                return Err(violation(format!(
                    "{} has {active_records} active elimination records, expected {expected}",
                    participant.id
                )));
            }
            if participant.revivals > 1 {
                return Err(violation(format!(
                    "{} was revived {} times",
                    participant.id, participant.revivals
                )));
            }
        }

        if let Some(stray) = self
            .used_revival
            .iter()
            .find(|id| !self.participants.contains_key(id))
        {
            return Err(violation(format!("unknown id {stray} in used-revival set")));
        }

        Ok(())
    }

    fn invalidate(&mut self) {
        *self.alive_cache.get_mut() = None;
    }

    #[cfg(feature = "debug-validation")]
    fn debug_validate(&self) {
        if let Err(e) = self.verify_invariants() {
            panic!("ledger invariant broken: {e}");
        }
    }

    #[cfg(not(feature = "debug-validation"))]
    #[allow(clippy::unused_self)]
    fn debug_validate(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Cohort;

    fn profile(name: &str) -> ParticipantProfile {
        ParticipantProfile {
            display_name: name.to_string(),
            title: "the Tested".to_string(),
            cohort: Cohort(1),
        }
    }

    fn ledger_with(n: u64) -> Ledger {
        let mut ledger = Ledger::new();
        for i in 1..=n {
            ledger
                .admit(ParticipantId(i), profile(&format!("P{i}")))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_admit_rejects_duplicates() {
        let mut ledger = ledger_with(2);
        let err = ledger.admit(ParticipantId(1), profile("again")).unwrap_err();
        assert_eq!(err, ArenaError::DuplicateParticipant(ParticipantId(1)));
        assert_eq!(ledger.total(), 2);
    }

    #[test]
    fn test_eliminate_credits_living_killer() {
        let mut ledger = ledger_with(3);
        ledger.set_round(4);

        let record = ledger
            .eliminate(ParticipantId(2), Some(ParticipantId(1)))
            .unwrap();

        assert_eq!(record.participant(), ParticipantId(2));
        assert_eq!(record.round(), 4);
        assert_eq!(record.killer(), Some(ParticipantId(1)));
        assert_eq!(ledger.get(ParticipantId(1)).unwrap().kills(), 1);
        assert_eq!(ledger.alive_count(), 2);
        ledger.verify_invariants().unwrap();
    }

    #[test]
    fn test_eliminate_twice_is_rejected_without_change() {
        let mut ledger = ledger_with(3);
        ledger.eliminate(ParticipantId(2), None).unwrap();

        let err = ledger
            .eliminate(ParticipantId(2), Some(ParticipantId(1)))
            .unwrap_err();

        assert_eq!(err, ArenaError::AlreadyEliminated(ParticipantId(2)));
        assert_eq!(ledger.elimination_log().len(), 1);
        assert_eq!(ledger.get(ParticipantId(1)).unwrap().kills(), 0);
    }

    #[test]
    fn test_eliminate_unknown_ids() {
        let mut ledger = ledger_with(2);
        assert_eq!(
            ledger.eliminate(ParticipantId(9), None).unwrap_err(),
            ArenaError::ParticipantNotFound(ParticipantId(9))
        );
        assert_eq!(
            ledger
                .eliminate(ParticipantId(1), Some(ParticipantId(9)))
                .unwrap_err(),
            ArenaError::ParticipantNotFound(ParticipantId(9))
        );
        assert!(ledger.is_alive(ParticipantId(1)));
    }

    #[test]
    fn test_dead_killer_gets_no_credit() {
        let mut ledger = ledger_with(3);
        ledger.eliminate(ParticipantId(1), None).unwrap();

        let record = ledger
            .eliminate(ParticipantId(2), Some(ParticipantId(1)))
            .unwrap();

        assert_eq!(record.killer(), None);
        assert_eq!(ledger.get(ParticipantId(1)).unwrap().kills(), 0);
    }

    #[test]
    fn test_revive_at_most_once() {
        let mut ledger = ledger_with(3);
        ledger.eliminate(ParticipantId(3), None).unwrap();

        assert!(ledger.revive(ParticipantId(3)).unwrap());
        assert!(ledger.is_alive(ParticipantId(3)));
        assert_eq!(ledger.elimination_log().len(), 1);
        assert!(!ledger.elimination_log()[0].is_active());

        ledger.eliminate(ParticipantId(3), None).unwrap();
        let before = ledger.clone();
        assert!(!ledger.revive(ParticipantId(3)).unwrap());
        assert!(!ledger.is_alive(ParticipantId(3)));
        assert_eq!(ledger.elimination_log(), before.elimination_log());
        assert_eq!(ledger.get(ParticipantId(3)).unwrap().revivals(), 1);
        ledger.verify_invariants().unwrap();
    }

    #[test]
    fn test_revive_living_is_rejected() {
        let mut ledger = ledger_with(2);
        assert_eq!(
            ledger.revive(ParticipantId(1)).unwrap_err(),
            ArenaError::StillAlive(ParticipantId(1))
        );
        assert!(!ledger.has_used_revival(ParticipantId(1)));
    }

    #[test]
    fn test_alive_ids_follow_join_order_and_refresh() {
        let mut ledger = ledger_with(4);
        ledger.set_round(1);
        assert_eq!(
            ledger.alive_ids(),
            vec![
                ParticipantId(1),
                ParticipantId(2),
                ParticipantId(3),
                ParticipantId(4)
            ]
        );

        ledger.eliminate(ParticipantId(2), None).unwrap();
        assert_eq!(
            ledger.alive_ids(),
            vec![ParticipantId(1), ParticipantId(3), ParticipantId(4)]
        );

        ledger.revive(ParticipantId(2)).unwrap();
        assert_eq!(ledger.alive_ids().len(), 4);
    }

    #[test]
    fn test_latest_revival_candidate_skips_used() {
        let mut ledger = ledger_with(4);
        ledger.eliminate(ParticipantId(1), None).unwrap();
        ledger.eliminate(ParticipantId(2), None).unwrap();
        assert_eq!(ledger.latest_revival_candidate(), Some(ParticipantId(2)));

        ledger.revive(ParticipantId(2)).unwrap();
        ledger.eliminate(ParticipantId(2), None).unwrap();
        assert_eq!(ledger.latest_revival_candidate(), Some(ParticipantId(1)));

        ledger.revive(ParticipantId(1)).unwrap();
        assert_eq!(ledger.latest_revival_candidate(), None);
    }

    #[test]
    fn test_leaderboard_orders_by_kills_then_join() {
        let mut ledger = ledger_with(5);
        ledger
            .eliminate(ParticipantId(5), Some(ParticipantId(3)))
            .unwrap();
        ledger
            .eliminate(ParticipantId(4), Some(ParticipantId(2)))
            .unwrap();
        ledger
            .eliminate(ParticipantId(1), Some(ParticipantId(3)))
            .unwrap();

        let ids: Vec<_> = ledger.leaderboard(3).iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![ParticipantId(3), ParticipantId(2)]);
    }
}
