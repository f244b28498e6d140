//! Per-category event resolution.
//!
//! Handlers sample participants uniformly without replacement from the
//! living roster, mutate the ledger only through its checked operations,
//! and render narration. Errors go back to the selector, which decides
//! between a no-op and the fallback line.

use rand::seq::SliceRandom;
use rand::Rng;

use super::narration::{join_names, pick, render};
use super::{EventCategory, EventOutcome};
use crate::data::{probability, EventRules, NarrationTable};
use crate::error::{ArenaError, Result};
use crate::ledger::Ledger;
use crate::participant::ParticipantId;

fn name_of(ledger: &Ledger, id: ParticipantId) -> Result<&str> {
    ledger
        .get(id)
        .map(|p| p.display_name())
        .ok_or(ArenaError::ParticipantNotFound(id))
}

fn sample<R: Rng + ?Sized>(pool: &[ParticipantId], count: usize, rng: &mut R) -> Result<Vec<ParticipantId>> {
    if pool.len() < count {
        return Err(ArenaError::EventExecutionFailure(format!(
            "cannot sample {count} from {} participants",
            pool.len()
        )));
    }
    Ok(pool.choose_multiple(rng, count).copied().collect())
}

/// Caused or environmental elimination of one or more participants.
///
/// At least one participant always survives, and a killer is never among
/// the victims.
pub(super) fn elimination<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    rules: &EventRules,
    narration: &NarrationTable,
    rng: &mut R,
) -> Result<EventOutcome> {
    let alive = ledger.alive_ids();
    if alive.len() < 2 {
        return Err(ArenaError::EventExecutionFailure(
            "elimination needs two living participants".to_string(),
        ));
    }

    let caused = rng.gen_bool(probability(rules.caused_chance));
    let multi = alive.len() >= rules.multi_victim_min_alive
        && rules.multi_victim_max >= 2
        && rng.gen_bool(probability(rules.multi_victim_chance));
    let victim_count = if multi {
        rng.gen_range(2..=rules.multi_victim_max).min(alive.len() - 1)
    } else {
        1
    };

    let victims = sample(&alive, victim_count, rng)?;
    let killer = if caused {
        let remaining: Vec<ParticipantId> = alive
            .iter()
            .copied()
            .filter(|id| !victims.contains(id))
            .collect();
        remaining.choose(rng).copied()
    } else {
        None
    };

    // Render before mutating so a template error leaves the ledger untouched.
    let victim_names: Vec<&str> = victims
        .iter()
        .map(|id| name_of(ledger, *id))
        .collect::<Result<_>>()?;
    let victims_text = join_names(&victim_names);
    let message = match (killer, victims.len()) {
        (Some(k), 1) => render(
            pick(&narration.elimination_caused, "caused elimination", rng)?,
            &[("killer", name_of(ledger, k)?), ("victim", victim_names[0])],
        )?,
        (None, 1) => render(
            pick(&narration.elimination_environmental, "environmental elimination", rng)?,
            &[("victim", victim_names[0])],
        )?,
        (Some(k), _) => render(
            pick(&narration.elimination_multi_caused, "multi-victim elimination", rng)?,
            &[
                ("killer", name_of(ledger, k)?),
                ("victims", victims_text.as_str()),
            ],
        )?,
        (None, _) => render(
            pick(
                &narration.elimination_multi_environmental,
                "multi-victim elimination",
                rng,
            )?,
            &[("victims", victims_text.as_str())],
        )?,
    };

    let mut outcome = EventOutcome::with_message(EventCategory::Elimination, message);
    for victim in victims {
        ledger.eliminate(victim, killer)?;
        outcome.eliminated.push(victim);
    }
    Ok(outcome)
}

/// One living participant gets through the day.
pub(super) fn survival<R: Rng + ?Sized>(
    ledger: &Ledger,
    narration: &NarrationTable,
    rng: &mut R,
) -> Result<EventOutcome> {
    let alive = ledger.alive_ids();
    let tribute = sample(&alive, 1, rng)?[0];
    let message = render(
        pick(&narration.survival, "survival", rng)?,
        &[("tribute", name_of(ledger, tribute)?)],
    )?;
    Ok(EventOutcome::with_message(EventCategory::Survival, message))
}

/// Revive the most recently eliminated participant who has a revival left.
///
/// Emits nothing when the roll fails or nobody is eligible.
pub(super) fn sponsor_revival<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    narration: &NarrationTable,
    chance: f64,
    rng: &mut R,
) -> Result<EventOutcome> {
    let mut outcome = EventOutcome::new(EventCategory::SponsorRevival);
    if !rng.gen_bool(probability(chance)) {
        return Ok(outcome);
    }
    let Some(target) = ledger.latest_revival_candidate() else {
        return Ok(outcome);
    };

    let message = render(
        pick(&narration.sponsor_revival, "sponsor revival", rng)?,
        &[("tribute", name_of(ledger, target)?)],
    )?;
    if !ledger.revive(target)? {
        return Err(ArenaError::RevivalAlreadyUsed(target));
    }
    outcome.messages.push(message);
    outcome.revived = Some(target);
    Ok(outcome)
}

/// Two participants cooperate or fall out. No state changes either way.
pub(super) fn alliance<R: Rng + ?Sized>(
    ledger: &Ledger,
    rules: &EventRules,
    narration: &NarrationTable,
    rng: &mut R,
) -> Result<EventOutcome> {
    let alive = ledger.alive_ids();
    let pair = sample(&alive, 2, rng)?;
    let pool = if rng.gen_bool(probability(rules.betrayal_chance)) {
        &narration.alliance_betrayal
    } else {
        &narration.alliance_cooperate
    };
    let message = render(
        pick(pool, "alliance", rng)?,
        &[("a", name_of(ledger, pair[0])?), ("b", name_of(ledger, pair[1])?)],
    )?;
    Ok(EventOutcome::with_message(EventCategory::Alliance, message))
}

/// One or two participants find supplies. Flavor only.
pub(super) fn supply_find<R: Rng + ?Sized>(
    ledger: &Ledger,
    narration: &NarrationTable,
    rng: &mut R,
) -> Result<EventOutcome> {
    let alive = ledger.alive_ids();
    let count = rng.gen_range(1..=2).min(alive.len());
    let finders = sample(&alive, count, rng)?;
    let message = match finders.as_slice() {
        [one] => render(
            pick(&narration.supply_single, "supply", rng)?,
            &[("tribute", name_of(ledger, *one)?)],
        )?,
        [a, b] => render(
            pick(&narration.supply_pair, "supply", rng)?,
            &[("a", name_of(ledger, *a)?), ("b", name_of(ledger, *b)?)],
        )?,
        _ => {
            return Err(ArenaError::EventExecutionFailure(
                "supply find needs a living participant".to_string(),
            ))
        }
    };
    Ok(EventOutcome::with_message(EventCategory::SupplyFind, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ArenaTables;
    use crate::participant::{Cohort, ParticipantProfile};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ledger_with(n: u64) -> Ledger {
        let mut ledger = Ledger::new();
        for i in 1..=n {
            ledger
                .admit(
                    ParticipantId(i),
                    ParticipantProfile {
                        display_name: format!("P{i}"),
                        title: "the Tested".to_string(),
                        cohort: Cohort(1),
                    },
                )
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_caused_elimination_credits_surviving_killer() {
        let tables = ArenaTables::default();
        let mut rules = tables.events.clone();
        rules.caused_chance = 1.0;
        rules.multi_victim_chance = 0.0;
        let mut rng = ChaCha8Rng::seed_from_u64(21);

        for _ in 0..20 {
            let mut ledger = ledger_with(6);
            let outcome = elimination(&mut ledger, &rules, &tables.narration, &mut rng).unwrap();

            assert_eq!(outcome.eliminated.len(), 1);
            let record = &ledger.elimination_log()[0];
            let killer = record.killer().expect("caused elimination has a killer");
            assert_ne!(killer, record.participant());
            assert!(ledger.is_alive(killer));
            assert_eq!(ledger.get(killer).unwrap().kills(), 1);
        }
    }

    #[test]
    fn test_multi_victim_elimination_bounds() {
        let tables = ArenaTables::default();
        let mut rules = tables.events.clone();
        rules.multi_victim_chance = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..50 {
            let mut ledger = ledger_with(8);
            let outcome = elimination(&mut ledger, &rules, &tables.narration, &mut rng).unwrap();

            assert!((2..=3).contains(&outcome.eliminated.len()));
            let mut unique = outcome.eliminated.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), outcome.eliminated.len());
            if let Some(killer) = ledger.elimination_log()[0].killer() {
                assert!(!outcome.eliminated.contains(&killer));
                assert_eq!(
                    ledger.get(killer).unwrap().kills() as usize,
                    outcome.eliminated.len()
                );
            }
        }
    }

    #[test]
    fn test_multi_victim_needs_large_field() {
        let tables = ArenaTables::default();
        let mut rules = tables.events.clone();
        rules.multi_victim_chance = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..30 {
            let mut ledger = ledger_with(7);
            let outcome = elimination(&mut ledger, &rules, &tables.narration, &mut rng).unwrap();
            assert_eq!(outcome.eliminated.len(), 1);
        }
    }

    #[test]
    fn test_elimination_never_empties_the_arena() {
        let tables = ArenaTables::default();
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let mut ledger = ledger_with(2);

        elimination(&mut ledger, &tables.events, &tables.narration, &mut rng).unwrap();

        assert_eq!(ledger.alive_count(), 1);
        assert!(elimination(&mut ledger, &tables.events, &tables.narration, &mut rng).is_err());
        assert_eq!(ledger.alive_count(), 1);
    }

    #[test]
    fn test_broken_template_leaves_ledger_untouched() {
        let mut tables = ArenaTables::default();
        tables.narration.elimination_caused = vec!["{oops}".to_string()];
        tables.narration.elimination_environmental = vec!["{oops}".to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut ledger = ledger_with(4);

        assert!(elimination(&mut ledger, &tables.events, &tables.narration, &mut rng).is_err());
        assert_eq!(ledger.alive_count(), 4);
        assert!(ledger.elimination_log().is_empty());
    }

    #[test]
    fn test_sponsor_revives_most_recent_eligible() {
        let tables = ArenaTables::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut ledger = ledger_with(4);
        ledger.eliminate(ParticipantId(1), None).unwrap();
        ledger.eliminate(ParticipantId(3), None).unwrap();

        let outcome = sponsor_revival(&mut ledger, &tables.narration, 1.0, &mut rng).unwrap();

        assert_eq!(outcome.revived, Some(ParticipantId(3)));
        assert_eq!(outcome.messages.len(), 1);
        assert!(ledger.is_alive(ParticipantId(3)));
    }

    #[test]
    fn test_sponsor_noop_without_candidate_or_roll() {
        let tables = ArenaTables::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut ledger = ledger_with(3);

        let outcome = sponsor_revival(&mut ledger, &tables.narration, 1.0, &mut rng).unwrap();
        assert!(outcome.messages.is_empty());
        assert_eq!(outcome.revived, None);

        ledger.eliminate(ParticipantId(2), None).unwrap();
        let outcome = sponsor_revival(&mut ledger, &tables.narration, 0.0, &mut rng).unwrap();
        assert!(outcome.messages.is_empty());
        assert!(!ledger.is_alive(ParticipantId(2)));
    }

    #[test]
    fn test_alliance_picks_two_distinct_and_changes_nothing() {
        let tables = ArenaTables::default();
        let mut rules = tables.events.clone();
        rules.betrayal_chance = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let ledger = ledger_with(2);

        for _ in 0..20 {
            let outcome = alliance(&ledger, &rules, &tables.narration, &mut rng).unwrap();
            let text = &outcome.messages[0];
            assert!(text.contains("P1") && text.contains("P2"), "{text}");
            assert!(outcome.eliminated.is_empty());
        }
        assert_eq!(ledger.alive_count(), 2);
    }

    #[test]
    fn test_supply_find_single_survivor() {
        let tables = ArenaTables::default();
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut ledger = ledger_with(2);
        ledger.eliminate(ParticipantId(2), None).unwrap();

        for _ in 0..10 {
            let outcome = supply_find(&ledger, &tables.narration, &mut rng).unwrap();
            assert!(outcome.messages[0].contains("P1"));
        }
    }
}
