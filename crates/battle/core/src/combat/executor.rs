//! Skill execution.
//!
//! The top-level orchestrator: pays upfront costs, computes the sacrifice
//! once, then resolves each target independently. User-directed buffs land
//! before the damage calculation so a self-granted crit boost affects the
//! very attack that granted it; target-directed status changes land only if
//! the attack connected.

use crate::combat::condition::evaluate_all;
use crate::combat::context::{BattlefieldView, ConditionContext};
use crate::combat::damage::calculate_multi_hit_damage;
use crate::combat::effects::{process_effects, process_sacrifice_effects, EffectProcessingResult};
use crate::combat::result::{DamageResult, SkillResult, TargetOutcome};
use crate::combat::status::{apply_affliction, apply_buff, apply_debuff, cleanse,
    remove_expired_statuses};
use crate::env::{CombatEnv, CombatEvent};
use crate::error::ExecuteError;
use crate::skill::{EffectKind, EffectTarget, HealAmount, ResourceKind, Skill};
use crate::state::{Conferral, CombatantState, Expiry};

/// Execute one skill against an already-resolved, non-empty target list.
///
/// Single-target invocations produce [`SkillResult::Single`]; everything
/// else produces [`SkillResult::Multi`].
pub fn execute_skill(
    skill: &Skill,
    attacker: &mut CombatantState,
    targets: &mut [&mut CombatantState],
    env: &mut CombatEnv<'_>,
    battlefield: Option<&BattlefieldView>,
) -> Result<SkillResult, ExecuteError> {
    if targets.is_empty() {
        return Err(ExecuteError::NoTargets);
    }

    tracing::debug!(skill = %skill.id, caster = %attacker.id, targets = targets.len(), "executing skill");

    env.emit(CombatEvent::SkillUsed {
        skill: skill.id.clone(),
        caster: attacker.id,
    });

    attacker.current_ap = (attacker.current_ap - skill.ap_cost).max(0);
    attacker.current_pp = (attacker.current_pp - skill.pp_cost).max(0);

    // Sacrifice is a cost of using the skill: computed once, against the
    // first target's context, regardless of target count.
    let sacrifice = {
        let ctx = ConditionContext::with_battlefield(attacker, &*targets[0], battlefield);
        process_sacrifice_effects(&skill.effects, &ctx)
    };
    if sacrifice.hp_sacrificed > 0 {
        attacker.current_hp = (attacker.current_hp - sacrifice.hp_sacrificed).max(1);
        env.emit(CombatEvent::HpSacrificed {
            caster: attacker.id,
            amount: sacrifice.hp_sacrificed,
        });
    }

    let is_damage_skill = skill.is_damage_skill();
    let mut defeat_gain_granted = false;
    let mut outcomes = Vec::with_capacity(targets.len());

    for target in targets.iter_mut() {
        let outcome = resolve_target(
            skill,
            attacker,
            target,
            env,
            battlefield,
            is_damage_skill,
            &mut defeat_gain_granted,
        );
        outcomes.push(outcome);
    }

    remove_expired_statuses(attacker, Expiry::UntilActionEnd);

    let hp_sacrificed = sacrifice.hp_sacrificed;
    Ok(if outcomes.len() == 1 {
        SkillResult::Single {
            outcome: outcomes.pop().unwrap_or_default(),
            hp_sacrificed,
        }
    } else {
        SkillResult::Multi {
            outcomes,
            hp_sacrificed,
        }
    })
}

fn resolve_target(
    skill: &Skill,
    attacker: &mut CombatantState,
    target: &mut CombatantState,
    env: &mut CombatEnv<'_>,
    battlefield: Option<&BattlefieldView>,
    is_damage_skill: bool,
    defeat_gain_granted: &mut bool,
) -> TargetOutcome {
    let was_defeated_before = target.is_defeated();
    let caster_matk = attacker.combat_stats.magical_attack;

    let results = {
        let ctx = ConditionContext::with_battlefield(attacker, target, battlefield);
        process_effects(&skill.effects, &ctx, &skill.id, caster_matk)
    };

    // User-directed buffs land before the damage calculation.
    for (apply_to, modifier) in &results.buffs {
        if *apply_to == EffectTarget::User {
            apply_buff(attacker, modifier.clone());
            env.emit(CombatEvent::BuffApplied {
                target: attacker.id,
                stat: modifier.stat,
            });
        }
    }

    let hits = resolve_damage_effects(skill, attacker, target, env, battlefield, &results);
    let connected = if is_damage_skill {
        hits.iter().any(|h| h.hit && !h.was_dodged)
    } else {
        true
    };
    let total_damage: i32 = hits.iter().map(|h| h.damage).sum();

    if total_damage > 0 {
        target.apply_damage(total_damage);
        for hit in &hits {
            if hit.damage > 0 {
                env.emit(CombatEvent::DamageDealt {
                    attacker: attacker.id,
                    target: target.id,
                    amount: hit.damage,
                });
            }
        }
    }

    let mut defeated = !was_defeated_before && target.is_defeated();
    if defeated {
        env.emit(CombatEvent::Defeated { target: target.id });
    }

    if connected {
        apply_target_changes(skill, attacker, target, env, &results, total_damage);
        // Status application (Deathblow, resource drain) can finish a target
        // the damage itself did not.
        if !defeated && !was_defeated_before && target.is_defeated() {
            defeated = true;
            env.emit(CombatEvent::Defeated { target: target.id });
        }
    }

    apply_user_changes(skill, attacker, target, env, &results, defeat_gain_granted);

    if is_damage_skill {
        remove_expired_statuses(attacker, Expiry::UntilNextAttack);
        if connected {
            remove_expired_statuses(target, Expiry::UntilAttacked);
        }
    }

    TargetOutcome {
        target: target.id,
        hits,
        total_damage,
        connected,
        defeated,
    }
}

fn resolve_damage_effects(
    skill: &Skill,
    attacker: &mut CombatantState,
    target: &mut CombatantState,
    env: &mut CombatEnv<'_>,
    battlefield: Option<&BattlefieldView>,
    results: &EffectProcessingResult,
) -> Vec<DamageResult> {
    let mut hits = Vec::new();
    for effect in &skill.effects {
        let EffectKind::Damage(damage) = &effect.kind else {
            continue;
        };
        let pass = {
            let ctx = ConditionContext::with_battlefield(attacker, target, battlefield);
            evaluate_all(&effect.conditions, &ctx)
        };
        if !pass {
            continue;
        }
        hits.extend(calculate_multi_hit_damage(
            damage, skill, attacker, target, env, results,
        ));
    }
    hits
}

/// Apply the target-directed pending changes of a connected attack.
fn apply_target_changes(
    skill: &Skill,
    attacker: &mut CombatantState,
    target: &mut CombatantState,
    env: &mut CombatEnv<'_>,
    results: &EffectProcessingResult,
    total_damage: i32,
) {
    for (apply_to, modifier) in &results.buffs {
        if *apply_to == EffectTarget::Target {
            apply_buff(target, modifier.clone());
            env.emit(CombatEvent::BuffApplied {
                target: target.id,
                stat: modifier.stat,
            });
        }
    }

    for (apply_to, modifier) in &results.debuffs {
        let unit: &mut CombatantState = match apply_to {
            EffectTarget::Target => target,
            EffectTarget::User => attacker,
        };
        if apply_debuff(unit, modifier.clone()) {
            env.emit(CombatEvent::DebuffApplied {
                target: unit.id,
                stat: modifier.stat,
            });
        } else {
            env.emit(CombatEvent::DebuffResisted { target: unit.id });
        }
    }

    for pending in &results.afflictions {
        let unit: &mut CombatantState = match pending.apply_to {
            EffectTarget::Target => target,
            EffectTarget::User => attacker,
        };
        apply_affliction(unit, pending.kind, pending.level, skill.id.clone());
        env.emit(CombatEvent::AfflictionInflicted {
            target: unit.id,
            affliction: pending.kind,
            level: pending.level,
        });
    }

    for (apply_to, flags) in &results.flags {
        if *apply_to == EffectTarget::Target {
            target.flags |= *flags;
        }
    }

    for (apply_to, amount) in &results.heals {
        if *apply_to == EffectTarget::Target {
            heal_unit(target, *amount, env);
        }
    }

    for (apply_to, scope) in &results.cleanses {
        if *apply_to == EffectTarget::Target {
            cleanse(target, *scope);
            env.emit(CombatEvent::Cleansed { target: target.id });
        }
    }

    for pending in &results.conferrals {
        if pending.apply_to == EffectTarget::Target {
            grant_conferral(target, skill, pending.potency, pending.caster_matk, pending.duration);
            env.emit(CombatEvent::ConferralGranted {
                target: target.id,
                potency: pending.potency,
            });
        }
    }

    for (apply_to, percent_hp) in &results.resurrects {
        if *apply_to == EffectTarget::Target && target.is_defeated() {
            let hp = (target.max_hp() * percent_hp / 100).max(1);
            target.current_hp = hp;
            env.emit(CombatEvent::Resurrected {
                target: target.id,
                hp,
            });
        }
    }

    for (apply_to, evade) in &results.evades {
        if *apply_to == EffectTarget::Target {
            target.evades.push(evade.clone());
        }
    }
    for (apply_to, immunity) in &results.immunities {
        if *apply_to == EffectTarget::Target {
            target.damage_immunities.push(immunity.clone());
        }
    }

    for (resource, amount) in &results.resource_steals {
        let stolen = match resource {
            ResourceKind::Ap => {
                let stolen = (*amount).min(target.current_ap.max(0));
                target.current_ap -= stolen;
                attacker.current_ap += stolen;
                stolen
            }
            ResourceKind::Pp => {
                let stolen = (*amount).min(target.current_pp.max(0));
                target.current_pp -= stolen;
                attacker.current_pp += stolen;
                stolen
            }
        };
        if stolen > 0 {
            env.emit(CombatEvent::ResourceGained {
                target: attacker.id,
                resource: *resource,
                amount: stolen,
            });
        }
    }

    if results.lifesteal_percent > 0 && total_damage > 0 {
        let restored = attacker.heal(total_damage * results.lifesteal_percent / 100);
        if restored > 0 {
            env.emit(CombatEvent::Healed {
                target: attacker.id,
                amount: restored,
            });
        }
    }
}

/// Apply the user-directed pending changes that are not pre-damage buffs.
fn apply_user_changes(
    skill: &Skill,
    attacker: &mut CombatantState,
    target: &CombatantState,
    env: &mut CombatEnv<'_>,
    results: &EffectProcessingResult,
    defeat_gain_granted: &mut bool,
) {
    for (apply_to, flags) in &results.flags {
        if *apply_to == EffectTarget::User {
            attacker.flags |= *flags;
        }
    }

    for (apply_to, amount) in &results.heals {
        if *apply_to == EffectTarget::User {
            heal_unit(attacker, *amount, env);
        }
    }

    for (apply_to, scope) in &results.cleanses {
        if *apply_to == EffectTarget::User {
            cleanse(attacker, *scope);
            env.emit(CombatEvent::Cleansed {
                target: attacker.id,
            });
        }
    }

    for pending in &results.conferrals {
        if pending.apply_to == EffectTarget::User {
            grant_conferral(attacker, skill, pending.potency, pending.caster_matk, pending.duration);
            env.emit(CombatEvent::ConferralGranted {
                target: attacker.id,
                potency: pending.potency,
            });
        }
    }

    for (apply_to, evade) in &results.evades {
        if *apply_to == EffectTarget::User {
            attacker.evades.push(evade.clone());
        }
    }
    for (apply_to, immunity) in &results.immunities {
        if *apply_to == EffectTarget::User {
            attacker.damage_immunities.push(immunity.clone());
        }
    }

    for gain in &results.resource_gains {
        if gain.requires_defeat {
            // Defeat-gated gains fire at most once per invocation, attributed
            // to the first defeated target evaluated.
            if *defeat_gain_granted || !target.is_defeated() {
                continue;
            }
            *defeat_gain_granted = true;
        }
        match gain.resource {
            ResourceKind::Ap => attacker.current_ap += gain.amount,
            ResourceKind::Pp => attacker.current_pp += gain.amount,
        }
        env.emit(CombatEvent::ResourceGained {
            target: attacker.id,
            resource: gain.resource,
            amount: gain.amount,
        });
    }
}

fn heal_unit(unit: &mut CombatantState, amount: HealAmount, env: &mut CombatEnv<'_>) {
    let amount = match amount {
        HealAmount::Flat(value) => value,
        HealAmount::PercentOfMax(percent) => unit.max_hp() * percent / 100,
    };
    let restored = unit.heal(amount);
    if restored > 0 {
        env.emit(CombatEvent::Healed {
            target: unit.id,
            amount: restored,
        });
    }
}

/// Grant a conferral, replacing any prior grant from the same skill.
fn grant_conferral(
    unit: &mut CombatantState,
    skill: &Skill,
    potency: i32,
    caster_matk: i32,
    duration: Expiry,
) {
    unit.conferrals.retain(|c| c.skill != skill.id);
    unit.conferrals.push(Conferral {
        skill: skill.id.clone(),
        potency,
        caster_matk,
        duration,
    });
}
