//! Consumption rules for one-shot defensive statuses.
//!
//! Evasion negates hits, damage immunity negates landed damage, and a small
//! family of named buffs (`TrueStrike`, `TrueCritical`, `Unguardable`,
//! `NegateMagicDamage`) is consumed on first use. Priority inside each
//! family is fixed: entire-attack entries trump counted entries, which trump
//! single-hit entries.

use crate::state::{CombatantState, EvadeKind, Expiry, ImmunityKind, ModifierStat};

/// Result of a damage-immunity check.
///
/// `remaining_hits` is returned alongside the mutated collection so a
/// multi-hit sequence can thread the counter across hits instead of
/// re-reading a just-mutated collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImmunityCheck {
    pub blocked: bool,
    pub remaining_hits: i32,
    /// The consumed entry covers every hit of the current attack.
    pub entire_attack: bool,
}

/// Consume one evade against an incoming hit, if any is held.
///
/// Priority: `EntireAttack` (consumes all evade entries) over `TwoHits`
/// (decrements its counter) over `SingleHit`. Counted entries are removed
/// once exhausted only when their duration is `UntilAttacked`; indefinite
/// entries linger at zero uses until explicitly cleared.
pub fn check_and_consume_evade(unit: &mut CombatantState) -> Option<EvadeKind> {
    if unit.evades.iter().any(|e| e.kind == EvadeKind::EntireAttack) {
        unit.evades.clear();
        return Some(EvadeKind::EntireAttack);
    }

    if let Some(index) = unit
        .evades
        .iter()
        .position(|e| e.kind == EvadeKind::TwoHits && e.remaining > 0)
    {
        unit.evades[index].remaining -= 1;
        if unit.evades[index].remaining == 0 && unit.evades[index].duration == Expiry::UntilAttacked
        {
            unit.evades.remove(index);
        }
        return Some(EvadeKind::TwoHits);
    }

    if let Some(index) = unit
        .evades
        .iter()
        .position(|e| e.kind == EvadeKind::SingleHit && e.remaining > 0)
    {
        unit.evades[index].remaining = 0;
        if unit.evades[index].duration == Expiry::UntilAttacked {
            unit.evades.remove(index);
        }
        return Some(EvadeKind::SingleHit);
    }

    None
}

/// Consume one damage immunity against a landed hit, if any is held.
///
/// Same priority shape as evasion: `EntireAttack` over `MultipleHits` over
/// `SingleHit`.
pub fn check_and_consume_damage_immunity(unit: &mut CombatantState) -> ImmunityCheck {
    if let Some(index) = unit
        .damage_immunities
        .iter()
        .position(|i| i.kind == ImmunityKind::EntireAttack)
    {
        if unit.damage_immunities[index].duration == Expiry::UntilAttacked {
            unit.damage_immunities.remove(index);
        }
        return ImmunityCheck {
            blocked: true,
            remaining_hits: 0,
            entire_attack: true,
        };
    }

    if let Some(index) = unit
        .damage_immunities
        .iter()
        .position(|i| i.kind == ImmunityKind::MultipleHits && i.remaining_hits > 0)
    {
        unit.damage_immunities[index].remaining_hits -= 1;
        let remaining = unit.damage_immunities[index].remaining_hits;
        if remaining == 0 && unit.damage_immunities[index].duration == Expiry::UntilAttacked {
            unit.damage_immunities.remove(index);
        }
        return ImmunityCheck {
            blocked: true,
            remaining_hits: remaining,
            entire_attack: false,
        };
    }

    if let Some(index) = unit
        .damage_immunities
        .iter()
        .position(|i| i.kind == ImmunityKind::SingleHit && i.remaining_hits > 0)
    {
        unit.damage_immunities[index].remaining_hits = 0;
        if unit.damage_immunities[index].duration == Expiry::UntilAttacked {
            unit.damage_immunities.remove(index);
        }
        return ImmunityCheck {
            blocked: true,
            remaining_hits: 0,
            entire_attack: false,
        };
    }

    ImmunityCheck::default()
}

/// Consume a named one-shot buff if held. Returns whether it was active.
///
/// `Unguardable` is only removed when its duration is not indefinite; an
/// indefinite unguardable stance stays active across attacks.
pub fn check_and_consume_buff(unit: &mut CombatantState, stat: ModifierStat) -> bool {
    let Some(index) = unit.buffs.iter().position(|b| b.stat == stat) else {
        return false;
    };

    let keep = stat == ModifierStat::Unguardable
        && unit.buffs[index].duration == Expiry::Indefinite;
    if !keep {
        unit.buffs.remove(index);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::SkillId;
    use crate::state::{CombatStats, CombatantId, DamageImmunity, Evade, Position, Scaling,
        StatModifier, Team};

    fn unit() -> CombatantState {
        CombatantState::new(
            CombatantId(1),
            Team::Red,
            Position::default(),
            CombatStats {
                max_hp: 50,
                ..CombatStats::default()
            },
        )
    }

    #[test]
    fn entire_attack_evade_consumes_everything() {
        let mut unit = unit();
        unit.evades
            .push(Evade::new(EvadeKind::SingleHit, Expiry::UntilAttacked));
        unit.evades
            .push(Evade::new(EvadeKind::EntireAttack, Expiry::UntilAttacked));

        assert_eq!(
            check_and_consume_evade(&mut unit),
            Some(EvadeKind::EntireAttack)
        );
        assert!(unit.evades.is_empty());
    }

    #[test]
    fn two_hit_evade_decrements_then_expires() {
        let mut unit = unit();
        unit.evades
            .push(Evade::new(EvadeKind::TwoHits, Expiry::UntilAttacked));

        assert_eq!(check_and_consume_evade(&mut unit), Some(EvadeKind::TwoHits));
        assert_eq!(unit.evades[0].remaining, 1);
        assert_eq!(check_and_consume_evade(&mut unit), Some(EvadeKind::TwoHits));
        assert!(unit.evades.is_empty());
        assert_eq!(check_and_consume_evade(&mut unit), None);
    }

    #[test]
    fn indefinite_evade_lingers_exhausted() {
        let mut unit = unit();
        unit.evades
            .push(Evade::new(EvadeKind::SingleHit, Expiry::Indefinite));

        assert_eq!(
            check_and_consume_evade(&mut unit),
            Some(EvadeKind::SingleHit)
        );
        assert_eq!(unit.evades.len(), 1);
        assert_eq!(unit.evades[0].remaining, 0);
        assert_eq!(check_and_consume_evade(&mut unit), None);
    }

    #[test]
    fn multi_hit_immunity_threads_counter() {
        let mut unit = unit();
        unit.damage_immunities
            .push(DamageImmunity::multiple_hits(2, Expiry::UntilAttacked));

        let first = check_and_consume_damage_immunity(&mut unit);
        assert!(first.blocked);
        assert_eq!(first.remaining_hits, 1);

        let second = check_and_consume_damage_immunity(&mut unit);
        assert!(second.blocked);
        assert_eq!(second.remaining_hits, 0);
        assert!(unit.damage_immunities.is_empty());

        assert!(!check_and_consume_damage_immunity(&mut unit).blocked);
    }

    #[test]
    fn entire_attack_immunity_reports_scope() {
        let mut unit = unit();
        unit.damage_immunities
            .push(DamageImmunity::new(ImmunityKind::EntireAttack, Expiry::UntilAttacked));

        let check = check_and_consume_damage_immunity(&mut unit);
        assert!(check.blocked);
        assert!(check.entire_attack);
        assert!(unit.damage_immunities.is_empty());
    }

    #[test]
    fn indefinite_unguardable_survives_consumption() {
        let mut unit = unit();
        unit.buffs.push(StatModifier {
            stat: ModifierStat::Unguardable,
            value: 0,
            scaling: Scaling::Flat,
            duration: Expiry::Indefinite,
            skill: SkillId::new("berserk_stance"),
            stacks: false,
            conditional_on_target: None,
        });

        assert!(check_and_consume_buff(&mut unit, ModifierStat::Unguardable));
        assert_eq!(unit.buffs.len(), 1);

        unit.buffs[0].duration = Expiry::UntilNextAttack;
        assert!(check_and_consume_buff(&mut unit, ModifierStat::Unguardable));
        assert!(unit.buffs.is_empty());
        assert!(!check_and_consume_buff(&mut unit, ModifierStat::Unguardable));
    }
}
