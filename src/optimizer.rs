use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::availability::Slot;
use crate::config::ScoringConfig;
use crate::nl_command_parser::{CommandSettings, Priority};
use crate::user_learning::{Preferences, RiskySet};

/// Points each rule contributed to a slot's score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub preferred_hour: i32,
    pub risky_hour: i32,
    pub morning_band: i32,
    pub priority: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.preferred_hour + self.risky_hour + self.morning_band + self.priority
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredSlot {
    pub slot: Slot,
    pub score: i32,
    pub breakdown: ScoreBreakdown,
}

/// Evaluate every rule independently for one slot
pub fn score_breakdown(
    slot: &Slot,
    preferences: &Preferences,
    risky_hours: &RiskySet,
    settings: &CommandSettings,
    weights: &ScoringConfig,
) -> ScoreBreakdown {
    let hour = slot.hour();
    let mut breakdown = ScoreBreakdown::default();

    if hour == preferences.preferred_hour {
        breakdown.preferred_hour = weights.preferred_hour_bonus;
    }

    if risky_hours.contains(&hour) {
        breakdown.risky_hour = -weights.risky_hour_penalty;
    }

    if (weights.morning_band_start..=weights.morning_band_end).contains(&hour) {
        breakdown.morning_band = weights.morning_band_bonus;
    }

    if settings.priority == Priority::High {
        breakdown.priority = weights.high_priority_bonus;
    }

    breakdown
}

pub fn score_slot(
    slot: &Slot,
    preferences: &Preferences,
    risky_hours: &RiskySet,
    settings: &CommandSettings,
    weights: &ScoringConfig,
) -> i32 {
    score_breakdown(slot, preferences, risky_hours, settings, weights).total()
}

/// Score every slot, keeping input order
pub fn rank_slots(
    slots: &[Slot],
    preferences: &Preferences,
    risky_hours: &RiskySet,
    settings: &CommandSettings,
    weights: &ScoringConfig,
) -> Vec<ScoredSlot> {
    slots
        .iter()
        .map(|slot| {
            let breakdown = score_breakdown(slot, preferences, risky_hours, settings, weights);
            ScoredSlot {
                slot: *slot,
                score: breakdown.total(),
                breakdown,
            }
        })
        .collect()
}

/// Highest-scoring slot; the first one wins a tie. `None` when there is
/// nothing to choose from.
pub fn choose_best_slot(
    slots: &[Slot],
    preferences: &Preferences,
    risky_hours: &RiskySet,
    settings: &CommandSettings,
    weights: &ScoringConfig,
) -> Option<ScoredSlot> {
    pick_best(rank_slots(slots, preferences, risky_hours, settings, weights))
}

pub(crate) fn pick_best(scored: Vec<ScoredSlot>) -> Option<ScoredSlot> {
    let mut best: Option<ScoredSlot> = None;
    for candidate in scored {
        if best.as_ref().map_or(true, |current| candidate.score > current.score) {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar_adapter::FixtureCalendar;
    use crate::config::ConfigBuilder;
    use crate::user_learning::PreferenceSource;
    use crate::utils::day_at;

    fn at(hour: u32, minute: u32) -> Slot {
        day_at(FixtureCalendar::default_day(), hour, minute)
    }

    fn prefer(hour: u32) -> Preferences {
        Preferences {
            preferred_hour: hour,
            source: PreferenceSource::Explicit,
        }
    }

    fn high() -> CommandSettings {
        CommandSettings {
            priority: Priority::High,
            ..Default::default()
        }
    }

    fn score(slot: Slot, prefs: Preferences, risky: &RiskySet, settings: &CommandSettings) -> i32 {
        score_slot(&slot, &prefs, risky, settings, &ScoringConfig::default())
    }

    #[test]
    fn test_no_rules_fire() {
        assert_eq!(score(at(16, 45), prefer(9), &RiskySet::new(), &CommandSettings::default()), 0);
    }

    #[test]
    fn test_each_rule_in_isolation() {
        let none = RiskySet::new();
        let normal = CommandSettings::default();

        assert_eq!(score(at(15, 15), prefer(15), &none, &normal), 10);
        assert_eq!(score(at(14, 0), prefer(9), &RiskySet::from([14]), &normal), -5);
        assert_eq!(score(at(10, 45), prefer(16), &none, &normal), 3);
        assert_eq!(score(at(17, 0), prefer(9), &none, &high()), 5);
    }

    #[test]
    fn test_morning_band_is_inclusive() {
        let none = RiskySet::new();
        let normal = CommandSettings::default();

        assert_eq!(score(at(8, 59), prefer(0), &none, &normal), 0);
        assert_eq!(score(at(9, 0), prefer(0), &none, &normal), 3);
        assert_eq!(score(at(12, 59), prefer(0), &none, &normal), 3);
        assert_eq!(score(at(13, 0), prefer(0), &none, &normal), 0);
    }

    #[test]
    fn test_rules_are_additive() {
        let slot = at(10, 0);
        let risky = RiskySet::from([10]);
        assert_eq!(score(slot, prefer(10), &risky, &high()), 10 - 5 + 3 + 5);

        let breakdown = score_breakdown(&slot, &prefer(10), &risky, &high(), &ScoringConfig::default());
        assert_eq!(
            breakdown,
            ScoreBreakdown {
                preferred_hour: 10,
                risky_hour: -5,
                morning_band: 3,
                priority: 5,
            }
        );
    }

    #[test]
    fn test_risky_hour_subtracts_exactly_five() {
        for hour in [9, 11, 14, 17] {
            let slot = at(hour, 0);
            let safe = score(slot, prefer(hour), &RiskySet::new(), &high());
            let risky = score(slot, prefer(hour), &RiskySet::from([hour]), &high());
            assert_eq!(safe - risky, 5);
        }
    }

    #[test]
    fn test_positive_rules_never_lower_the_score() {
        let slot = at(11, 30);
        let risky = RiskySet::from([11]);
        let base = score(slot, prefer(15), &risky, &CommandSettings::default());

        assert!(score(slot, prefer(11), &risky, &CommandSettings::default()) >= base);
        assert!(score(slot, prefer(15), &risky, &high()) >= base);
    }

    #[test]
    fn test_custom_weights() {
        let weights = ScoringConfig {
            preferred_hour_bonus: 1,
            risky_hour_penalty: 2,
            morning_band_start: 14,
            morning_band_end: 15,
            morning_band_bonus: 4,
            high_priority_bonus: 8,
        };
        let total = score_slot(&at(14, 0), &prefer(14), &RiskySet::from([14]), &high(), &weights);
        assert_eq!(total, 1 - 2 + 4 + 8);
    }

    #[test]
    fn test_shifted_morning_band() {
        let config = ConfigBuilder::new().morning_band(7, 8).build();
        let normal = CommandSettings::default();

        let early = score_slot(&at(8, 30), &prefer(0), &RiskySet::new(), &normal, &config.scoring);
        let usual = score_slot(&at(10, 0), &prefer(0), &RiskySet::new(), &normal, &config.scoring);
        assert_eq!((early, usual), (3, 0));
    }

    #[test]
    fn test_choose_best_unique_maximum() {
        let slots = vec![at(9, 0), at(10, 45), at(15, 15), at(16, 45)];
        let best = choose_best_slot(
            &slots,
            &prefer(15),
            &RiskySet::from([14]),
            &CommandSettings::default(),
            &ScoringConfig::default(),
        )
        .unwrap();

        assert_eq!(best.slot, at(15, 15));
        assert_eq!(best.score, 10);
    }

    #[test]
    fn test_choose_best_first_of_ties() {
        let slots = vec![at(16, 45), at(15, 15), at(17, 0)];
        let best = choose_best_slot(
            &slots,
            &prefer(9),
            &RiskySet::new(),
            &high(),
            &ScoringConfig::default(),
        )
        .unwrap();
        assert_eq!(best.slot, at(16, 45));

        let reversed: Vec<Slot> = slots.into_iter().rev().collect();
        let best = choose_best_slot(
            &reversed,
            &prefer(9),
            &RiskySet::new(),
            &high(),
            &ScoringConfig::default(),
        )
        .unwrap();
        assert_eq!(best.slot, at(17, 0));
    }

    #[test]
    fn test_choose_best_handles_negative_scores() {
        let slots = vec![at(14, 0), at(14, 30)];
        let best = choose_best_slot(
            &slots,
            &prefer(9),
            &RiskySet::from([14]),
            &CommandSettings::default(),
            &ScoringConfig::default(),
        )
        .unwrap();
        assert_eq!(best.slot, at(14, 0));
        assert_eq!(best.score, -5);
    }

    #[test]
    fn test_choose_best_empty_is_none() {
        let best = choose_best_slot(
            &[],
            &prefer(9),
            &RiskySet::new(),
            &CommandSettings::default(),
            &ScoringConfig::default(),
        );
        assert!(best.is_none());
    }

    #[test]
    fn test_rank_keeps_input_order() {
        let slots = vec![at(16, 45), at(9, 0)];
        let ranked = rank_slots(
            &slots,
            &prefer(9),
            &RiskySet::new(),
            &CommandSettings::default(),
            &ScoringConfig::default(),
        );
        assert_eq!(ranked.iter().map(|s| s.slot).collect::<Vec<_>>(), slots);
        assert_eq!(ranked.iter().map(|s| s.score).collect::<Vec<_>>(), vec![0, 13]);
    }
}
