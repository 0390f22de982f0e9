//! Damage calculation.
//!
//! A fixed-order pipeline per hit: blind, hit resolution, evade consumption,
//! crit, guard, per-component raw damage, crit/guard composition, conferral,
//! effectiveness, target-HP bonus, damage reduction, and damage immunity
//! last. Multi-hit skills expand into independent runs of the same pipeline
//! with consumable state threaded across hits.

use crate::combat::consume::{check_and_consume_buff, check_and_consume_damage_immunity,
    check_and_consume_evade};
use crate::combat::effects::EffectProcessingResult;
use crate::combat::result::{DamageBreakdown, DamageResult};
use crate::combat::status::{effective_stats_for_target, remove_affliction};
use crate::env::{CombatEnv, CombatEvent};
use crate::skill::effect::{DamageEffect, OwnHpScaling};
use crate::skill::{AttackType, Skill, SkillFlags};
use crate::state::{AfflictionKind, CombatantFlags, CombatantState, EvadeKind, Expiry,
    ModifierStat};

/// Critical damage multiplier.
const CRIT_MULTIPLIER: f64 = 1.5;

/// Consumable state threaded across the hits of one attack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceState {
    /// Remaining hits a counted immunity will still block, mirrored from the
    /// last consumption so callers need not re-read the mutated collection.
    pub remaining_immunity_hits: Option<i32>,
    /// An entire-attack immunity blocks every remaining hit.
    pub entire_attack_immunity: bool,
    /// An entire-attack evade dodges every remaining hit.
    pub entire_attack_evaded: bool,
    /// The magical component is negated for the rest of the attack.
    pub magic_negated: bool,
}

/// Natural guard damage multiplier.
///
/// Pure: `reduction = min(25 + guard_efficiency, 75)`, multiplier
/// `(100 − reduction)/100`; `1.0` when the roll did not guard.
pub fn natural_guard_multiplier(guarded: bool, guard_efficiency: i32) -> f64 {
    if !guarded {
        return 1.0;
    }
    f64::from(100 - natural_guard_reduction(guard_efficiency)) / 100.0
}

fn natural_guard_reduction(guard_efficiency: i32) -> i32 {
    (25 + guard_efficiency).min(75)
}

/// Resolve one hit of a damage effect.
pub fn calculate_skill_damage(
    damage: &DamageEffect,
    skill: &Skill,
    attacker: &mut CombatantState,
    target: &mut CombatantState,
    env: &mut CombatEnv<'_>,
    effect_results: &EffectProcessingResult,
    sequence: &mut SequenceState,
) -> DamageResult {
    // An entire-attack evade short-circuits every remaining hit.
    if sequence.entire_attack_evaded {
        return DamageResult::dodged(0.0);
    }

    // --- 1. Blind: consumes the affliction and forces a pre-hit miss.
    if remove_affliction(attacker, AfflictionKind::Blind) {
        env.emit(CombatEvent::AttackBlinded {
            attacker: attacker.id,
        });
        return DamageResult::miss(0.0);
    }

    let melee = skill.attack_type == Some(AttackType::Melee);
    let attacker_stats = effective_stats_for_target(attacker, target);
    let target_stats = effective_stats_for_target(target, attacker);

    // --- 2. Hit resolution.
    let true_strike = skill.flags.contains(SkillFlags::TRUE_STRIKE)
        || check_and_consume_buff(attacker, ModifierStat::TrueStrike);
    let hit_chance = if true_strike {
        100.0
    } else {
        let flying_factor = if melee && target.is_flying() { 0.5 } else { 1.0 };
        let base = f64::from(100 + attacker_stats.accuracy - target_stats.evasion)
            * f64::from(skill.hit_rate)
            / 100.0;
        (base * flying_factor).clamp(0.0, 100.0)
    };

    if !true_strike && env.roll_percent() >= hit_chance {
        env.emit(CombatEvent::AttackMissed {
            attacker: attacker.id,
            target: target.id,
        });
        return DamageResult::miss(hit_chance);
    }

    // --- 3. Evade consumption. A guaranteed hit bypasses evades but still
    // clears until-attacked entries, since the unit was attacked.
    if true_strike {
        target.evades.retain(|e| e.duration != Expiry::UntilAttacked);
    } else if let Some(kind) = check_and_consume_evade(target) {
        if kind == EvadeKind::EntireAttack {
            sequence.entire_attack_evaded = true;
        }
        env.emit(CombatEvent::AttackDodged {
            target: target.id,
            evade: kind,
        });
        return DamageResult::dodged(hit_chance);
    }

    // --- Own-HP variant: terminal value, then immunity. No crit, guard,
    // conferral, effectiveness, or reduction stages.
    if let Some(scaling) = damage.own_hp {
        return resolve_own_hp_damage(scaling, attacker, target, env, sequence, hit_chance);
    }

    // --- 4. Critical.
    let was_critical = if attacker.has_affliction(AfflictionKind::CritSeal) {
        false
    } else if skill.flags.contains(SkillFlags::TRUE_CRITICAL)
        || check_and_consume_buff(attacker, ModifierStat::TrueCritical)
    {
        true
    } else {
        env.roll_percent() < f64::from(attacker_stats.critical)
    };
    let crit_multiplier = if was_critical { CRIT_MULTIPLIER } else { 1.0 };
    if was_critical {
        env.emit(CombatEvent::CriticalHit {
            attacker: attacker.id,
            target: target.id,
        });
    }

    // --- 5. Per-component raw damage.
    let ignore = effect_results.ignore_defense_fraction();
    let potency_boost = effect_results.potency_boost;

    let mut raw_base = 0.0;
    let mut physical_after_potency = 0;
    if let Some(potency) = damage.physical_potency {
        let raw = f64::from(attacker_stats.physical_attack)
            - f64::from(target_stats.physical_defense) * (1.0 - ignore);
        raw_base += raw;

        if melee && target.flags.contains(CombatantFlags::INCOMING_PARRY) {
            target.flags.remove(CombatantFlags::INCOMING_PARRY);
            env.emit(CombatEvent::AttackParried { target: target.id });
        } else {
            let adjusted = f64::from(potency + potency_boost);
            physical_after_potency = ((raw * adjusted / 100.0).round() as i32).max(1);
        }
    }

    let mut magical_after_potency = 0;
    if let Some(potency) = damage.magical_potency {
        let raw = f64::from(attacker_stats.magical_attack)
            - f64::from(target_stats.magical_defense) * (1.0 - ignore);
        raw_base += raw;

        if !sequence.magic_negated
            && check_and_consume_buff(target, ModifierStat::NegateMagicDamage)
        {
            sequence.magic_negated = true;
            env.emit(CombatEvent::MagicNegated { target: target.id });
        }
        if !sequence.magic_negated {
            let adjusted = f64::from(potency + potency_boost);
            magical_after_potency = ((raw * adjusted / 100.0).round() as i32).max(1);
        }
    }

    // --- 6. Guard: physical component only.
    let unguardable = skill.flags.contains(SkillFlags::UNGUARDABLE)
        || check_and_consume_buff(attacker, ModifierStat::Unguardable);
    let guardable =
        physical_after_potency > 0 && !unguardable && !target.has_affliction(AfflictionKind::GuardSeal);
    let guard_multiplier = if !guardable {
        1.0
    } else if let Some(tier) = target.incoming_guard.take() {
        tier.multiplier()
    } else {
        let guarded = env.roll_percent() < f64::from(target_stats.guard);
        natural_guard_multiplier(guarded, target.guard_efficiency)
    };
    let was_guarded = guardable && guard_multiplier < 1.0;
    if was_guarded {
        env.emit(CombatEvent::AttackGuarded {
            target: target.id,
            reduction_percent: (100.0 - guard_multiplier * 100.0).round() as i32,
        });
    }

    // --- 7. Crit + guard composition.
    let after_potency = physical_after_potency + magical_after_potency;
    let after_crit = (f64::from(after_potency) * crit_multiplier).round() as i32;
    let after_guard = (f64::from(physical_after_potency) * crit_multiplier * guard_multiplier
        + f64::from(magical_after_potency) * crit_multiplier)
        .round() as i32;

    // --- 8. Conferral contributions; `UntilNextAttack` entries prune on use.
    let mut conferral_damage = 0;
    if !sequence.magic_negated && !attacker.conferrals.is_empty() {
        for conferral in &attacker.conferrals {
            let raw = f64::from(conferral.caster_matk - target_stats.magical_defense);
            conferral_damage += ((raw * f64::from(conferral.potency) / 100.0 * crit_multiplier)
                .round() as i32)
                .max(1);
        }
        attacker
            .conferrals
            .retain(|c| c.duration != Expiry::UntilNextAttack);
    }

    let total = after_guard + conferral_damage;
    let mut breakdown = DamageBreakdown {
        raw_base_damage: raw_base.round() as i32,
        after_potency,
        after_crit,
        after_guard,
        after_effectiveness: 0,
        after_damage_reduction: 0,
    };

    // A fully nulled hit (e.g. parried melee) connects for zero damage; the
    // later floors never resurrect it.
    if total <= 0 {
        return DamageResult {
            hit: true,
            damage: 0,
            was_critical,
            was_guarded,
            was_dodged: false,
            was_blocked: false,
            hit_chance,
            breakdown,
        };
    }

    // --- 9. Effectiveness.
    let effectiveness = env
        .effectiveness
        .lookup(&attacker.combatant_types, &target.combatant_types);
    let after_effectiveness =
        ((f64::from(total) * effectiveness.multiplier).round() as i32).max(1);
    breakdown.after_effectiveness = after_effectiveness;

    // --- 10. Target-HP bonus, then damage reduction.
    let bonus = target.current_hp * effect_results.target_hp_bonus_percent / 100;
    let with_bonus = after_effectiveness + bonus;
    let reduction = target_stats.damage_reduction;
    let final_damage =
        ((f64::from(with_bonus) * f64::from(100 - reduction) / 100.0).round() as i32).max(1);
    breakdown.after_damage_reduction = final_damage;

    // --- 11. Damage immunity, last.
    finish_with_immunity(final_damage, target, env, sequence, DamageResult {
        hit: true,
        damage: final_damage,
        was_critical,
        was_guarded,
        was_dodged: false,
        was_blocked: false,
        hit_chance,
        breakdown,
    })
}

fn resolve_own_hp_damage(
    scaling: OwnHpScaling,
    attacker: &CombatantState,
    target: &mut CombatantState,
    env: &mut CombatEnv<'_>,
    sequence: &mut SequenceState,
    hit_chance: f64,
) -> DamageResult {
    let terminal = match scaling {
        OwnHpScaling::MissingHp { percent } => {
            (attacker.max_hp() - attacker.current_hp).max(0) * percent / 100
        }
        OwnHpScaling::CurrentHp { percent } => attacker.current_hp.max(0) * percent / 100,
    };

    let breakdown = DamageBreakdown {
        raw_base_damage: terminal,
        after_potency: terminal,
        after_crit: terminal,
        after_guard: terminal,
        after_effectiveness: terminal,
        after_damage_reduction: terminal,
    };

    finish_with_immunity(terminal, target, env, sequence, DamageResult {
        hit: true,
        damage: terminal,
        was_critical: false,
        was_guarded: false,
        was_dodged: false,
        was_blocked: false,
        hit_chance,
        breakdown,
    })
}

/// Apply the immunity stage to a landed hit. A block zeroes the damage but
/// leaves the breakdown showing what would have been dealt.
fn finish_with_immunity(
    final_damage: i32,
    target: &mut CombatantState,
    env: &mut CombatEnv<'_>,
    sequence: &mut SequenceState,
    mut result: DamageResult,
) -> DamageResult {
    if final_damage <= 0 {
        return result;
    }

    let blocked = if sequence.entire_attack_immunity {
        true
    } else if sequence.remaining_immunity_hits == Some(0) {
        // An immunity engaged earlier in this attack and is exhausted; the
        // remaining hits land without re-reading the mutated collection.
        false
    } else {
        let check = check_and_consume_damage_immunity(target);
        if check.blocked {
            sequence.remaining_immunity_hits = Some(check.remaining_hits);
            sequence.entire_attack_immunity = check.entire_attack;
        }
        check.blocked
    };

    if blocked {
        result.damage = 0;
        result.was_blocked = true;
        env.emit(CombatEvent::DamageBlocked { target: target.id });
    }
    result
}

/// Resolve a multi-hit damage effect: `hit_count` independent runs of the
/// single-hit pipeline sharing one [`SequenceState`].
pub fn calculate_multi_hit_damage(
    damage: &DamageEffect,
    skill: &Skill,
    attacker: &mut CombatantState,
    target: &mut CombatantState,
    env: &mut CombatEnv<'_>,
    effect_results: &EffectProcessingResult,
) -> Vec<DamageResult> {
    let mut sequence = SequenceState::default();
    (0..damage.hit_count.max(1))
        .map(|_| {
            calculate_skill_damage(
                damage,
                skill,
                attacker,
                target,
                env,
                effect_results,
                &mut sequence,
            )
        })
        .collect()
}
