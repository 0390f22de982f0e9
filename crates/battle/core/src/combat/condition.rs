//! Condition evaluation.
//!
//! Pure predicates over a [`ConditionContext`]. Unknown kinds and comparators
//! resolve to `false` with a logged warning; evaluation never fails.

use tracing::warn;

use crate::combat::context::ConditionContext;
use crate::skill::condition::{Condition, ScalarRef};
use crate::state::CombatantState;

/// Evaluate a conjunctive condition list. Empty means unconditional.
pub fn evaluate_all(conditions: &[Condition], ctx: &ConditionContext<'_>) -> bool {
    conditions.iter().all(|condition| evaluate(condition, ctx))
}

/// Evaluate a single condition against the context.
pub fn evaluate(condition: &Condition, ctx: &ConditionContext<'_>) -> bool {
    match condition {
        Condition::CombatantTypeIs {
            subject,
            combatant_type,
            comparator,
        } => {
            let actual = ctx.resolve(*subject).has_type(*combatant_type);
            equality(comparator.compare(actual, true), "combatant_type_is")
        }

        Condition::StatThreshold {
            subject,
            scalar,
            value,
            percent_of_max,
            comparator,
        } => {
            let unit = ctx.resolve(*subject);
            let lhs = scalar_value(unit, *scalar, *percent_of_max);
            numeric(comparator.compare(lhs, *value), "stat_threshold")
        }

        Condition::HasAffliction {
            subject,
            affliction,
            expected,
            comparator,
        } => {
            let actual = ctx.resolve(*subject).has_affliction(*affliction);
            equality(comparator.compare(actual, *expected), "has_affliction")
        }

        Condition::HasAnyAffliction {
            subject,
            expected,
            comparator,
        } => {
            let actual = !ctx.resolve(*subject).afflictions.is_empty();
            equality(comparator.compare(actual, *expected), "has_any_affliction")
        }

        Condition::HasAnyBuff {
            subject,
            expected,
            comparator,
        } => {
            let actual = !ctx.resolve(*subject).buffs.is_empty();
            equality(comparator.compare(actual, *expected), "has_any_buff")
        }

        Condition::HasAnyDebuff {
            subject,
            expected,
            comparator,
        } => {
            let actual = !ctx.resolve(*subject).debuffs.is_empty();
            equality(comparator.compare(actual, *expected), "has_any_debuff")
        }

        Condition::HasFlag {
            subject,
            flags,
            expected,
            comparator,
        } => {
            let actual = ctx.resolve(*subject).flags.contains(*flags);
            equality(comparator.compare(actual, *expected), "has_flag")
        }

        Condition::HitConnected {
            expected,
            comparator,
        } => equality(
            comparator.compare(ctx.flags.hit_connected, *expected),
            "hit_connected",
        ),

        Condition::TargetDefeated {
            expected,
            comparator,
        } => {
            let actual = ctx.target.is_defeated() || ctx.flags.target_defeated;
            equality(comparator.compare(actual, *expected), "target_defeated")
        }

        Condition::RowPosition {
            subject,
            row,
            comparator,
        } => {
            let actual = ctx.resolve(*subject).position.row == *row;
            equality(comparator.compare(actual, true), "row_position")
        }

        Condition::FirstHitGuarded {
            expected,
            comparator,
        } => equality(
            comparator.compare(ctx.flags.first_hit_guarded, *expected),
            "first_hit_guarded",
        ),

        Condition::WasCritical {
            expected,
            comparator,
        } => equality(
            comparator.compare(ctx.flags.was_critical, *expected),
            "was_critical",
        ),

        Condition::IsNight {
            expected,
            comparator,
        } => {
            let actual = ctx.battlefield.is_some_and(|view| view.night);
            equality(comparator.compare(actual, *expected), "is_night")
        }

        Condition::UnitCount {
            side,
            value,
            comparator,
        } => {
            let count = ctx.battlefield.map_or(0, |view| match side {
                crate::skill::CountSide::Allies => view.ally_count,
                crate::skill::CountSide::Enemies => view.enemy_count,
            });
            numeric(comparator.compare(count, *value), "unit_count")
        }

        Condition::UnitCountDifference { value, comparator } => {
            let diff = ctx
                .battlefield
                .map_or(0, |view| view.ally_count - view.enemy_count);
            numeric(comparator.compare(diff, *value), "unit_count_difference")
        }

        Condition::SameRowTypeCount {
            combatant_type,
            value,
            comparator,
        } => {
            let count = ctx.battlefield.map_or(0, |view| {
                view.same_row_types
                    .iter()
                    .filter(|t| *t == combatant_type)
                    .count() as i32
            });
            numeric(comparator.compare(count, *value), "same_row_type_count")
        }

        Condition::Unknown => {
            warn!("unknown condition kind, evaluating to false");
            false
        }
    }
}

fn scalar_value(unit: &CombatantState, scalar: ScalarRef, percent_of_max: bool) -> i32 {
    match scalar {
        ScalarRef::Hp => {
            if percent_of_max {
                // Percent-of-max is only meaningful for HP.
                unit.current_hp * 100 / unit.max_hp().max(1)
            } else {
                unit.current_hp
            }
        }
        ScalarRef::Ap => unit.current_ap,
        ScalarRef::Pp => unit.current_pp,
        ScalarRef::Stat(kind) => unit.combat_stats.get(kind),
    }
}

fn equality(result: Option<bool>, kind: &str) -> bool {
    result.unwrap_or_else(|| {
        warn!(condition = kind, "unknown equality comparator, evaluating to false");
        false
    })
}

fn numeric(result: Option<bool>, kind: &str) -> bool {
    result.unwrap_or_else(|| {
        warn!(condition = kind, "unknown numeric comparator, evaluating to false");
        false
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::context::BattlefieldView;
    use crate::skill::condition::{ConditionSubject, EqualityComparator, NumericComparator};
    use crate::skill::SkillId;
    use crate::state::{AfflictionKind, CombatStats, CombatantId, CombatantState, CombatantType,
        Position, Team};

    fn unit(id: u32, hp: i32) -> CombatantState {
        let mut unit = CombatantState::new(
            CombatantId(id),
            Team::Blue,
            Position::default(),
            CombatStats {
                max_hp: 100,
                ..CombatStats::default()
            },
        );
        unit.current_hp = hp;
        unit
    }

    #[test]
    fn empty_condition_list_is_unconditional() {
        let user = unit(1, 100);
        let target = unit(2, 100);
        let ctx = ConditionContext::new(&user, &target);
        assert!(evaluate_all(&[], &ctx));
    }

    #[test]
    fn hp_percent_threshold() {
        let user = unit(1, 40);
        let target = unit(2, 100);
        let ctx = ConditionContext::new(&user, &target);

        // 40/100 HP = 40%, below 50.
        assert!(evaluate(
            &Condition::hp_below_percent(ConditionSubject::User, 50),
            &ctx,
        ));
        assert!(!evaluate(
            &Condition::hp_below_percent(ConditionSubject::User, 40),
            &ctx,
        ));
    }

    #[test]
    fn affliction_check_with_negated_expectation() {
        let mut user = unit(1, 100);
        user.afflictions.push(crate::state::Affliction {
            kind: AfflictionKind::Poison,
            level: 1,
            skill: SkillId::new("venom"),
        });
        let target = unit(2, 100);
        let ctx = ConditionContext::new(&user, &target);

        assert!(evaluate(
            &Condition::has_affliction(ConditionSubject::User, AfflictionKind::Poison),
            &ctx,
        ));
        assert!(!evaluate(
            &Condition::HasAffliction {
                subject: ConditionSubject::User,
                affliction: AfflictionKind::Poison,
                expected: false,
                comparator: EqualityComparator::EqualTo,
            },
            &ctx,
        ));
    }

    #[test]
    fn ally_and_enemy_resolve_to_target() {
        let user = unit(1, 100);
        let mut target = unit(2, 100);
        target.combatant_types.push(CombatantType::Flying);
        let ctx = ConditionContext::new(&user, &target);

        assert!(evaluate(
            &Condition::is_type(ConditionSubject::Enemy, CombatantType::Flying),
            &ctx,
        ));
        assert!(evaluate(
            &Condition::is_type(ConditionSubject::Ally, CombatantType::Flying),
            &ctx,
        ));
        assert!(!evaluate(
            &Condition::is_type(ConditionSubject::User, CombatantType::Flying),
            &ctx,
        ));
    }

    #[test]
    fn battlefield_counts_default_to_zero_without_view() {
        let user = unit(1, 100);
        let target = unit(2, 100);
        let ctx = ConditionContext::new(&user, &target);

        assert!(evaluate(
            &Condition::UnitCount {
                side: crate::skill::CountSide::Allies,
                value: 0,
                comparator: NumericComparator::EqualTo,
            },
            &ctx,
        ));
        assert!(!evaluate(
            &Condition::IsNight {
                expected: true,
                comparator: EqualityComparator::EqualTo,
            },
            &ctx,
        ));
    }

    #[test]
    fn night_and_counts_read_from_view() {
        let user = unit(1, 100);
        let target = unit(2, 100);
        let view = BattlefieldView {
            ally_count: 3,
            enemy_count: 5,
            night: true,
            ..BattlefieldView::default()
        };
        let ctx = ConditionContext::with_battlefield(&user, &target, Some(&view));

        assert!(evaluate(
            &Condition::IsNight {
                expected: true,
                comparator: EqualityComparator::EqualTo,
            },
            &ctx,
        ));
        assert!(evaluate(
            &Condition::UnitCountDifference {
                value: -2,
                comparator: NumericComparator::EqualTo,
            },
            &ctx,
        ));
    }

    #[test]
    fn unknown_condition_is_false() {
        let user = unit(1, 100);
        let target = unit(2, 100);
        let ctx = ConditionContext::new(&user, &target);
        assert!(!evaluate(&Condition::Unknown, &ctx));
    }
}
