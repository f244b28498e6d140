//! Narration templates and flavor titles.

use serde::{Deserialize, Serialize};

use crate::events::narration::render;

/// Narration template pools.
///
/// Each pool lists the placeholders it may use; [`NarrationTable::validate`]
/// renders every template against exactly those keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationTable {
    /// `{killer}`, `{victim}`.
    pub elimination_caused: Vec<String>,
    /// `{victim}`.
    pub elimination_environmental: Vec<String>,
    /// `{killer}`, `{victims}`.
    pub elimination_multi_caused: Vec<String>,
    /// `{victims}`.
    pub elimination_multi_environmental: Vec<String>,
    /// `{tribute}`.
    pub survival: Vec<String>,
    /// `{tribute}`.
    pub sponsor_revival: Vec<String>,
    /// `{a}`, `{b}`.
    pub alliance_cooperate: Vec<String>,
    /// `{a}`, `{b}`.
    pub alliance_betrayal: Vec<String>,
    /// `{tribute}`.
    pub supply_single: Vec<String>,
    /// `{a}`, `{b}`.
    pub supply_pair: Vec<String>,
    /// `{names}`.
    pub final_three: Vec<String>,
    /// `{a}`, `{b}`.
    pub final_duel: Vec<String>,
    /// `{winner}`, `{title}`, `{kills}`, `{cohort}`.
    pub winner: Vec<String>,
    /// No placeholders.
    pub quiet_round: Vec<String>,
    /// No placeholders.
    pub fallback: Vec<String>,
    /// Flavor titles handed out on admission.
    pub titles: Vec<String>,
}

impl NarrationTable {
    fn pools(&self) -> [(&'static str, &[String], &'static [&'static str]); 15] {
        [
            ("elimination_caused", &self.elimination_caused, &["killer", "victim"]),
            ("elimination_environmental", &self.elimination_environmental, &["victim"]),
            ("elimination_multi_caused", &self.elimination_multi_caused, &["killer", "victims"]),
            (
                "elimination_multi_environmental",
                &self.elimination_multi_environmental,
                &["victims"],
            ),
            ("survival", &self.survival, &["tribute"]),
            ("sponsor_revival", &self.sponsor_revival, &["tribute"]),
            ("alliance_cooperate", &self.alliance_cooperate, &["a", "b"]),
            ("alliance_betrayal", &self.alliance_betrayal, &["a", "b"]),
            ("supply_single", &self.supply_single, &["tribute"]),
            ("supply_pair", &self.supply_pair, &["a", "b"]),
            ("final_three", &self.final_three, &["names"]),
            ("final_duel", &self.final_duel, &["a", "b"]),
            ("winner", &self.winner, &["winner", "title", "kills", "cohort"]),
            ("quiet_round", &self.quiet_round, &[]),
            ("fallback", &self.fallback, &[]),
        ]
    }

    pub(crate) fn validate(&self, errors: &mut Vec<String>) {
        for (name, pool, keys) in self.pools() {
            if pool.is_empty() {
                errors.push(format!("narration pool '{name}' is empty"));
            }
            let vars: Vec<(&str, &str)> = keys.iter().map(|k| (*k, "x")).collect();
            for template in pool {
                if let Err(e) = render(template, &vars) {
                    errors.push(format!("narration pool '{name}': {e}"));
                }
            }
        }
        if self.titles.is_empty() {
            errors.push("title pool is empty".to_string());
        }
    }
}

fn strings(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| (*s).to_string()).collect()
}

impl Default for NarrationTable {
    fn default() -> Self {
        Self {
            elimination_caused: strings(&[
                "{killer} ambushes {victim} near the cornucopia.",
                "{killer} catches {victim} off guard with a thrown spear.",
                "{victim} is overpowered by {killer} in a desperate struggle.",
                "{killer} sets a snare, and {victim} walks right into it.",
                "{killer} pushes {victim} from a cliff edge.",
            ]),
            elimination_environmental: strings(&[
                "{victim} eats a handful of nightlock berries.",
                "{victim} falls into a ravine while fleeing.",
                "{victim} succumbs to an infected wound.",
                "{victim} is caught in a rockslide.",
                "{victim} drinks from a poisoned stream.",
            ]),
            elimination_multi_caused: strings(&[
                "{killer} rigs the supply pile to explode, taking out {victims}.",
                "{killer} hunts down {victims} one after another through the night.",
            ]),
            elimination_multi_environmental: strings(&[
                "A mudslide buries {victims}.",
                "{victims} are overwhelmed by a pack of mutts.",
            ]),
            survival: strings(&[
                "{tribute} spends the day building a shelter.",
                "{tribute} climbs a tree and sleeps soundly.",
                "{tribute} hunts a rabbit and cooks it over a small fire.",
                "{tribute} tends to their wounds by a stream.",
                "{tribute} camouflages themselves in the mud.",
            ]),
            sponsor_revival: strings(&[
                "A silver parachute carries medicine to {tribute}, pulling them back from the brink!",
                "The sponsors refuse to let {tribute} go. They rise again!",
            ]),
            alliance_cooperate: strings(&[
                "{a} and {b} agree to watch each other's backs.",
                "{a} shares their water with {b}. An alliance is formed.",
                "{a} and {b} team up to raid the cornucopia.",
            ]),
            alliance_betrayal: strings(&[
                "{a} steals {b}'s supplies in the night and slips away.",
                "{a} breaks their alliance with {b} after a bitter argument.",
            ]),
            supply_single: strings(&[
                "{tribute} finds a backpack full of dried fruit.",
                "{tribute} discovers a hidden cache of knives.",
                "{tribute} receives a sponsor gift of bread.",
            ]),
            supply_pair: strings(&[
                "{a} and {b} split a crate of supplies they stumble upon.",
                "{a} and {b} both reach for the same sleeping bag. They share it.",
            ]),
            final_three: strings(&[
                "Only three remain: {names}. The arena falls silent.",
            ]),
            final_duel: strings(&[
                "It comes down to {a} and {b}. Only one will leave the arena.",
            ]),
            winner: strings(&[
                "{winner} {title} of {cohort} is the victor, with {kills} kills!",
            ]),
            quiet_round: strings(&[
                "The arena is quiet. Nobody dares to move.",
                "A tense silence settles over the arena.",
            ]),
            fallback: strings(&["Something stirs in the arena, but nobody sees what."]),
            titles: strings(&[
                "the Relentless",
                "the Cunning",
                "the Unbroken",
                "the Swift",
                "the Silent",
                "the Fearless",
                "the Wary",
                "the Lucky",
            ]),
        }
    }
}
