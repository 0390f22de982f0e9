//! Status application and stat recalculation.
//!
//! Derived stats are a pure function of the foundation plus active
//! buffs/debuffs. Every mutation of the buff/debuff collections in this
//! module ends with a recalculation so the derived stats never go stale.

use strum::IntoEnumIterator;

use crate::skill::{CleanseScope, SkillId};
use crate::state::{Affliction, AfflictionKind, CombatStats, CombatantFlags, CombatantState,
    CombatantType, Expiry, ModifierStat, Scaling, StatKind, StatModifier};

// === Recalculation ==========================================================

/// Recompute a combatant's derived stats from the foundation plus active
/// unconditional buffs/debuffs.
///
/// For each primary stat:
/// `derived = round((foundation + flat) × (1 + percent/100))`, where debuff
/// contributions are subtracted and scaled by any active debuff
/// amplification. MaxHp clamps to a minimum of 1, everything else to 0.
pub fn recalculate_stats(unit: &mut CombatantState) {
    unit.combat_stats = derive_stats(unit, None);
}

/// Derived stats against a specific opposing target, overlaying buffs that
/// are conditional on the target's combatant type. Stored state is untouched.
pub fn effective_stats_for_target(unit: &CombatantState, target: &CombatantState) -> CombatStats {
    derive_stats(unit, Some(&target.combatant_types))
}

fn derive_stats(unit: &CombatantState, target_types: Option<&[CombatantType]>) -> CombatStats {
    let amplification = debuff_amplification(unit);
    let mut stats = CombatStats::default();

    for kind in StatKind::iter() {
        let mut flat = 0.0;
        let mut percent = 0.0;

        for buff in &unit.buffs {
            if buff.stat != ModifierStat::Stat(kind) {
                continue;
            }
            match buff.conditional_on_target {
                None => {}
                Some(required) => {
                    if !target_types.is_some_and(|types| types.contains(&required)) {
                        continue;
                    }
                }
            }
            match buff.scaling {
                Scaling::Flat => flat += f64::from(buff.value),
                Scaling::Percent => percent += f64::from(buff.value),
            }
        }

        for debuff in &unit.debuffs {
            if debuff.stat != ModifierStat::Stat(kind) {
                continue;
            }
            match debuff.scaling {
                Scaling::Flat => flat -= f64::from(debuff.value) * amplification,
                Scaling::Percent => percent -= f64::from(debuff.value) * amplification,
            }
        }

        let foundation = f64::from(unit.foundation.get(kind));
        let value = ((foundation + flat) * (1.0 + percent / 100.0)).round() as i32;
        let floor = if kind == StatKind::MaxHp { 1 } else { 0 };
        stats.set(kind, value.max(floor));
    }

    stats
}

/// Multiplier applied to debuff contributions.
///
/// Only the first amplification entry counts; amplification never applies to
/// buffs, and the entry itself contributes to no stat sum.
fn debuff_amplification(unit: &CombatantState) -> f64 {
    unit.debuffs
        .iter()
        .find(|d| d.stat == ModifierStat::DebuffAmplification)
        .map_or(1.0, |d| f64::from(d.value) / 100.0)
}

// === Buff / debuff application ==============================================

/// Apply a buff. Non-stacking modifiers replace any prior instance granted
/// by the same skill.
pub fn apply_buff(unit: &mut CombatantState, modifier: StatModifier) {
    if !modifier.stacks {
        unit.buffs.retain(|b| b.skill != modifier.skill);
    }
    unit.buffs.push(modifier);
    recalculate_stats(unit);
}

/// Apply a debuff with the same replace-vs-stack semantics as [`apply_buff`].
///
/// Returns `false` without mutating anything when the target is debuff
/// immune.
pub fn apply_debuff(unit: &mut CombatantState, modifier: StatModifier) -> bool {
    if unit.flags.contains(CombatantFlags::DEBUFF_IMMUNE) {
        return false;
    }
    if !modifier.stacks {
        unit.debuffs.retain(|d| d.skill != modifier.skill);
    }
    unit.debuffs.push(modifier);
    recalculate_stats(unit);
    true
}

/// Apply an affliction.
///
/// Burn stacks by summing levels; every other kind replaces. Deathblow is
/// instantaneous: it zeroes HP and is never stored.
pub fn apply_affliction(unit: &mut CombatantState, kind: AfflictionKind, level: i32, skill: SkillId) {
    match kind {
        AfflictionKind::Deathblow => {
            unit.current_hp = 0;
        }
        AfflictionKind::Burn => {
            if let Some(existing) = unit.afflictions.iter_mut().find(|a| a.kind == kind) {
                existing.level += level;
                existing.skill = skill;
            } else {
                unit.afflictions.push(Affliction { kind, level, skill });
            }
        }
        _ => {
            unit.afflictions.retain(|a| a.kind != kind);
            unit.afflictions.push(Affliction { kind, level, skill });
        }
    }
}

/// Remove an affliction by kind. Returns whether an entry was removed.
pub fn remove_affliction(unit: &mut CombatantState, kind: AfflictionKind) -> bool {
    let before = unit.afflictions.len();
    unit.afflictions.retain(|a| a.kind != kind);
    unit.afflictions.len() != before
}

// === Expiry =================================================================

/// Remove buffs whose duration matches the trigger; recalculates when
/// anything was removed. Returns whether anything expired.
pub fn remove_expired_buffs(unit: &mut CombatantState, trigger: Expiry) -> bool {
    let before = unit.buffs.len();
    unit.buffs.retain(|b| b.duration != trigger);
    let removed = unit.buffs.len() != before;
    if removed {
        recalculate_stats(unit);
    }
    removed
}

/// Remove debuffs whose duration matches the trigger; recalculates when
/// anything was removed.
pub fn remove_expired_debuffs(unit: &mut CombatantState, trigger: Expiry) -> bool {
    let before = unit.debuffs.len();
    unit.debuffs.retain(|d| d.duration != trigger);
    let removed = unit.debuffs.len() != before;
    if removed {
        recalculate_stats(unit);
    }
    removed
}

/// Remove conferrals whose duration matches the trigger.
pub fn remove_expired_conferrals(unit: &mut CombatantState, trigger: Expiry) -> bool {
    let before = unit.conferrals.len();
    unit.conferrals.retain(|c| c.duration != trigger);
    unit.conferrals.len() != before
}

/// Remove evades and damage immunities whose duration matches the trigger.
pub fn remove_expired_consumables(unit: &mut CombatantState, trigger: Expiry) {
    unit.evades.retain(|e| e.duration != trigger);
    unit.damage_immunities.retain(|i| i.duration != trigger);
}

/// Prune every expiring status category for one trigger.
pub fn remove_expired_statuses(unit: &mut CombatantState, trigger: Expiry) {
    remove_expired_buffs(unit, trigger);
    remove_expired_debuffs(unit, trigger);
    remove_expired_conferrals(unit, trigger);
    remove_expired_consumables(unit, trigger);
}

// === Cleanse ================================================================

/// Strip afflictions and/or debuffs per the scope.
pub fn cleanse(unit: &mut CombatantState, scope: CleanseScope) {
    let clear_afflictions = matches!(scope, CleanseScope::Afflictions | CleanseScope::All);
    let clear_debuffs = matches!(scope, CleanseScope::Debuffs | CleanseScope::All);

    if clear_afflictions {
        unit.afflictions.clear();
    }
    if clear_debuffs && !unit.debuffs.is_empty() {
        unit.debuffs.clear();
        recalculate_stats(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CombatantId, Position, Team};

    fn unit() -> CombatantState {
        CombatantState::new(
            CombatantId(1),
            Team::Blue,
            Position::default(),
            CombatStats {
                max_hp: 100,
                physical_attack: 50,
                ..CombatStats::default()
            },
        )
    }

    fn flat_buff(skill: &str, kind: StatKind, value: i32) -> StatModifier {
        StatModifier {
            stat: ModifierStat::Stat(kind),
            value,
            scaling: Scaling::Flat,
            duration: Expiry::Indefinite,
            skill: SkillId::new(skill),
            stacks: false,
            conditional_on_target: None,
        }
    }

    #[test]
    fn flat_then_percent_layering() {
        let mut unit = unit();
        apply_buff(&mut unit, flat_buff("war_cry", StatKind::PhysicalAttack, 10));
        apply_buff(
            &mut unit,
            StatModifier {
                scaling: Scaling::Percent,
                value: 50,
                ..flat_buff("battle_hymn", StatKind::PhysicalAttack, 0)
            },
        );

        // (50 + 10) * 1.5 = 90
        assert_eq!(unit.combat_stats.physical_attack, 90);
    }

    #[test]
    fn same_skill_replaces_unless_stacking() {
        let mut unit = unit();
        apply_buff(&mut unit, flat_buff("war_cry", StatKind::PhysicalAttack, 10));
        apply_buff(&mut unit, flat_buff("war_cry", StatKind::PhysicalAttack, 20));
        assert_eq!(unit.buffs.len(), 1);
        assert_eq!(unit.combat_stats.physical_attack, 70);

        let stacking = StatModifier {
            stacks: true,
            ..flat_buff("war_cry", StatKind::PhysicalAttack, 5)
        };
        apply_buff(&mut unit, stacking.clone());
        apply_buff(&mut unit, stacking);
        assert_eq!(unit.buffs.len(), 3);
    }

    #[test]
    fn debuff_amplification_scales_debuffs_only() {
        let mut unit = unit();
        apply_buff(&mut unit, flat_buff("war_cry", StatKind::PhysicalAttack, 10));
        assert!(apply_debuff(
            &mut unit,
            flat_buff("weaken", StatKind::PhysicalAttack, 10),
        ));
        // (50 + 10 - 10) = 50
        assert_eq!(unit.combat_stats.physical_attack, 50);

        assert!(apply_debuff(
            &mut unit,
            StatModifier {
                stat: ModifierStat::DebuffAmplification,
                ..flat_buff("hex", StatKind::PhysicalAttack, 150)
            },
        ));
        // debuff 10 amplified to 15: (50 + 10 - 15) = 45
        assert_eq!(unit.combat_stats.physical_attack, 45);
    }

    #[test]
    fn debuff_immunity_no_ops() {
        let mut unit = unit();
        unit.flags |= CombatantFlags::DEBUFF_IMMUNE;
        assert!(!apply_debuff(
            &mut unit,
            flat_buff("weaken", StatKind::PhysicalAttack, 10),
        ));
        assert!(unit.debuffs.is_empty());
        assert_eq!(unit.combat_stats.physical_attack, 50);
    }

    #[test]
    fn burn_stacks_poison_replaces() {
        let mut unit = unit();
        apply_affliction(&mut unit, AfflictionKind::Burn, 1, SkillId::new("ember"));
        apply_affliction(&mut unit, AfflictionKind::Burn, 1, SkillId::new("ember"));
        assert_eq!(unit.affliction_level(AfflictionKind::Burn), 2);

        apply_affliction(&mut unit, AfflictionKind::Poison, 1, SkillId::new("venom"));
        apply_affliction(&mut unit, AfflictionKind::Poison, 1, SkillId::new("venom"));
        assert_eq!(
            unit.afflictions
                .iter()
                .filter(|a| a.kind == AfflictionKind::Poison)
                .count(),
            1
        );
    }

    #[test]
    fn remove_affliction_reports_removal() {
        let mut unit = unit();
        apply_affliction(&mut unit, AfflictionKind::Blind, 1, SkillId::new("flash"));
        apply_affliction(&mut unit, AfflictionKind::Poison, 1, SkillId::new("venom"));

        assert!(remove_affliction(&mut unit, AfflictionKind::Blind));
        assert!(!unit.has_affliction(AfflictionKind::Blind));
        assert!(unit.has_affliction(AfflictionKind::Poison));
        assert!(!remove_affliction(&mut unit, AfflictionKind::Blind));
    }

    #[test]
    fn deathblow_is_never_stored() {
        let mut unit = unit();
        apply_affliction(&mut unit, AfflictionKind::Deathblow, 1, SkillId::new("doom"));
        assert_eq!(unit.current_hp, 0);
        assert!(unit.afflictions.is_empty());
    }

    #[test]
    fn expiry_removal_restores_foundation_value() {
        let mut unit = unit();
        apply_buff(
            &mut unit,
            StatModifier {
                duration: Expiry::UntilNextAttack,
                ..flat_buff("war_cry", StatKind::PhysicalAttack, 10)
            },
        );
        apply_buff(
            &mut unit,
            StatModifier {
                scaling: Scaling::Percent,
                duration: Expiry::UntilNextAttack,
                ..flat_buff("battle_hymn", StatKind::PhysicalAttack, 20)
            },
        );
        assert_eq!(unit.combat_stats.physical_attack, 72);

        assert!(remove_expired_buffs(&mut unit, Expiry::UntilNextAttack));
        assert_eq!(unit.combat_stats.physical_attack, 50);
        assert!(!remove_expired_buffs(&mut unit, Expiry::UntilNextAttack));
    }

    #[test]
    fn conditional_buff_only_in_target_view() {
        let mut unit = unit();
        apply_buff(
            &mut unit,
            StatModifier {
                conditional_on_target: Some(CombatantType::Armored),
                ..flat_buff("armorsbane", StatKind::PhysicalAttack, 30)
            },
        );
        assert_eq!(unit.combat_stats.physical_attack, 50);

        let mut armored = CombatantState::new(
            CombatantId(2),
            Team::Red,
            Position::default(),
            CombatStats::default(),
        );
        armored.combatant_types.push(CombatantType::Armored);
        assert_eq!(
            effective_stats_for_target(&unit, &armored).physical_attack,
            80
        );

        let plain = CombatantState::new(
            CombatantId(3),
            Team::Red,
            Position::default(),
            CombatStats::default(),
        );
        assert_eq!(
            effective_stats_for_target(&unit, &plain).physical_attack,
            50
        );
    }

    #[test]
    fn max_hp_clamps_to_one() {
        let mut unit = unit();
        assert!(apply_debuff(
            &mut unit,
            flat_buff("wither", StatKind::MaxHp, 500),
        ));
        assert_eq!(unit.combat_stats.max_hp, 1);
    }

    #[test]
    fn cleanse_scopes() {
        let mut unit = unit();
        apply_affliction(&mut unit, AfflictionKind::Poison, 1, SkillId::new("venom"));
        assert!(apply_debuff(
            &mut unit,
            flat_buff("weaken", StatKind::PhysicalAttack, 10),
        ));

        cleanse(&mut unit, CleanseScope::Afflictions);
        assert!(unit.afflictions.is_empty());
        assert_eq!(unit.debuffs.len(), 1);

        cleanse(&mut unit, CleanseScope::All);
        assert!(unit.debuffs.is_empty());
        assert_eq!(unit.combat_stats.physical_attack, 50);
    }
}
