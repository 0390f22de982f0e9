//! Effect processing.
//!
//! Walks a skill's effect list, evaluates each effect's conditions, and folds
//! the surviving payloads into an [`EffectProcessingResult`] accumulator.
//! Damage effects are skipped here (the damage calculator resolves them);
//! sacrifice effects have their own once-per-invocation entry point.

use tracing::warn;

use crate::combat::condition::evaluate_all;
use crate::combat::context::ConditionContext;
use crate::skill::condition::Condition;
use crate::skill::effect::ModifierPayload;
use crate::skill::{CleanseScope, Effect, EffectKind, EffectTarget, HealAmount, ResourceKind,
    SkillId};
use crate::state::{AfflictionKind, CombatantFlags, DamageImmunity, Evade, Expiry, StatModifier};

/// A pending AP/PP grant to the user.
///
/// `requires_defeat` marks a grant gated on the target being defeated; the
/// executor applies it after damage resolution, at most once across all
/// targets of a multi-target skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingResourceGain {
    pub resource: ResourceKind,
    pub amount: i32,
    pub requires_defeat: bool,
}

/// A pending affliction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingAffliction {
    pub apply_to: EffectTarget,
    pub kind: AfflictionKind,
    pub level: i32,
}

/// A pending conferral grant; the caster's MATK is captured at processing
/// time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingConferral {
    pub apply_to: EffectTarget,
    pub potency: i32,
    pub caster_matk: i32,
    pub duration: Expiry,
}

/// Accumulated pending changes from one target's effect pass.
///
/// Pure data: produced here, consumed by the executor. Created and discarded
/// per skill invocation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectProcessingResult {
    /// Additive potency bonus folded into this skill's damage components.
    pub potency_boost: i32,
    /// Max-merged defense-ignore percentage, capped at 100.
    pub ignore_defense_percent: i32,
    /// Bonus damage percentage of the target's current HP.
    pub target_hp_bonus_percent: i32,
    /// Summed lifesteal percentage of damage dealt.
    pub lifesteal_percent: i32,

    pub flags: Vec<(EffectTarget, CombatantFlags)>,
    pub heals: Vec<(EffectTarget, HealAmount)>,
    pub resource_gains: Vec<PendingResourceGain>,
    pub resource_steals: Vec<(ResourceKind, i32)>,
    pub buffs: Vec<(EffectTarget, StatModifier)>,
    pub debuffs: Vec<(EffectTarget, StatModifier)>,
    pub afflictions: Vec<PendingAffliction>,
    pub cleanses: Vec<(EffectTarget, CleanseScope)>,
    pub conferrals: Vec<PendingConferral>,
    pub resurrects: Vec<(EffectTarget, i32)>,
    pub evades: Vec<(EffectTarget, Evade)>,
    pub immunities: Vec<(EffectTarget, DamageImmunity)>,
}

impl EffectProcessingResult {
    /// Defense-ignore as a fraction in `[0, 1]`.
    pub fn ignore_defense_fraction(&self) -> f64 {
        f64::from(self.ignore_defense_percent.clamp(0, 100)) / 100.0
    }
}

/// Sacrifice cost computed once per skill invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SacrificeOutcome {
    /// HP to subtract from the caster, already clamped so the caster keeps
    /// at least 1 HP.
    pub hp_sacrificed: i32,
    /// The raw percentage the skill asked for.
    pub percent_requested: i32,
}

/// Process every non-damage, non-sacrifice effect for one target context.
pub fn process_effects(
    effects: &[Effect],
    ctx: &ConditionContext<'_>,
    skill: &SkillId,
    caster_matk: i32,
) -> EffectProcessingResult {
    let mut result = EffectProcessingResult::default();

    for effect in effects {
        match &effect.kind {
            // Resolved by the damage calculator.
            EffectKind::Damage(_) => continue,
            // Resolved by `process_sacrifice_effects`, once per invocation.
            EffectKind::SacrificeHp { .. } => continue,
            _ => {}
        }

        // Defeat-gated resource gains are deferred past damage resolution;
        // their remaining conditions are still evaluated now.
        let defeat_gated = matches!(effect.kind, EffectKind::ResourceGain { .. })
            && has_defeat_gate(&effect.conditions);
        let live_conditions: Vec<&Condition> = effect
            .conditions
            .iter()
            .filter(|c| !(defeat_gated && is_defeat_gate(c)))
            .collect();
        if !live_conditions
            .iter()
            .all(|condition| crate::combat::condition::evaluate(condition, ctx))
        {
            continue;
        }

        fold_effect(&mut result, effect, skill, caster_matk, defeat_gated);
    }

    result
}

fn fold_effect(
    result: &mut EffectProcessingResult,
    effect: &Effect,
    skill: &SkillId,
    caster_matk: i32,
    defeat_gated: bool,
) {
    let apply_to = effect.apply_to;
    match &effect.kind {
        EffectKind::Damage(_) | EffectKind::SacrificeHp { .. } => unreachable!("filtered above"),

        EffectKind::PotencyBoost { amount } => result.potency_boost += amount,

        EffectKind::IgnoreDefense { percent } => {
            result.ignore_defense_percent =
                result.ignore_defense_percent.max((*percent).min(100));
        }

        EffectKind::GrantFlag { flags } => result.flags.push((apply_to, *flags)),

        EffectKind::Heal { amount } => result.heals.push((apply_to, *amount)),

        EffectKind::ResourceGain { resource, amount } => {
            result.resource_gains.push(PendingResourceGain {
                resource: *resource,
                amount: *amount,
                requires_defeat: defeat_gated,
            });
        }

        EffectKind::ApplyBuff(payload) => result
            .buffs
            .push((apply_to, to_modifier(payload, skill))),

        EffectKind::ApplyDebuff(payload) => result
            .debuffs
            .push((apply_to, to_modifier(payload, skill))),

        EffectKind::InflictAffliction { affliction, level } => {
            result.afflictions.push(PendingAffliction {
                apply_to,
                kind: *affliction,
                level: *level,
            });
        }

        EffectKind::Cleanse { scope } => result.cleanses.push((apply_to, *scope)),

        EffectKind::GrantConferral { potency, duration } => {
            result.conferrals.push(PendingConferral {
                apply_to,
                potency: *potency,
                caster_matk,
                duration: *duration,
            });
        }

        EffectKind::Resurrect { percent_hp } => result.resurrects.push((apply_to, *percent_hp)),

        EffectKind::Lifesteal { percent } => result.lifesteal_percent += percent,

        EffectKind::ResourceSteal { resource, amount } => {
            result.resource_steals.push((*resource, *amount));
        }

        EffectKind::GrantEvasion { evade, duration } => {
            result.evades.push((apply_to, Evade::new(*evade, *duration)));
        }

        EffectKind::GrantImmunity { immunity, duration } => {
            result
                .immunities
                .push((apply_to, DamageImmunity::new(*immunity, *duration)));
        }

        EffectKind::TargetHpBonusDamage { percent_of_current } => {
            result.target_hp_bonus_percent += percent_of_current;
        }

        EffectKind::Unknown => {
            warn!(skill = %skill, "unknown effect kind, skipping");
        }
    }
}

/// Compute the upfront HP sacrifice for one skill invocation.
///
/// `floor(maxHP × percent/100)`, clamped so the caster's HP after payment is
/// never below 1. Must be called exactly once per invocation regardless of
/// target count.
pub fn process_sacrifice_effects(
    effects: &[Effect],
    ctx: &ConditionContext<'_>,
) -> SacrificeOutcome {
    let mut outcome = SacrificeOutcome::default();

    for effect in effects {
        let EffectKind::SacrificeHp { percent } = &effect.kind else {
            continue;
        };
        if !evaluate_all(&effect.conditions, ctx) {
            continue;
        }
        outcome.percent_requested += percent;
    }

    if outcome.percent_requested > 0 {
        let requested = ctx.user.max_hp() * outcome.percent_requested / 100;
        outcome.hp_sacrificed = requested.min((ctx.user.current_hp - 1).max(0));
    }

    outcome
}

fn to_modifier(payload: &ModifierPayload, skill: &SkillId) -> StatModifier {
    StatModifier {
        stat: payload.stat,
        value: payload.value,
        scaling: payload.scaling,
        duration: payload.duration,
        skill: skill.clone(),
        stacks: payload.stacks,
        conditional_on_target: payload.conditional_on_target,
    }
}

fn has_defeat_gate(conditions: &[Condition]) -> bool {
    conditions.iter().any(is_defeat_gate)
}

fn is_defeat_gate(condition: &Condition) -> bool {
    matches!(condition, Condition::TargetDefeated { expected: true, .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skill::condition::ConditionSubject;
    use crate::skill::effect::DamageEffect;
    use crate::state::{CombatStats, CombatantId, CombatantState, ModifierStat, Position,
        StatKind, Team};

    fn unit(id: u32) -> CombatantState {
        CombatantState::new(
            CombatantId(id),
            Team::Blue,
            Position::default(),
            CombatStats {
                max_hp: 100,
                ..CombatStats::default()
            },
        )
    }

    #[test]
    fn potency_boosts_sum_and_ignore_defense_takes_max() {
        let user = unit(1);
        let target = unit(2);
        let ctx = ConditionContext::new(&user, &target);
        let effects = vec![
            Effect::new(EffectKind::PotencyBoost { amount: 20 }),
            Effect::new(EffectKind::PotencyBoost { amount: 30 }),
            Effect::new(EffectKind::IgnoreDefense { percent: 40 }),
            Effect::new(EffectKind::IgnoreDefense { percent: 25 }),
            Effect::new(EffectKind::IgnoreDefense { percent: 150 }),
        ];

        let result = process_effects(&effects, &ctx, &SkillId::new("cleave"), 0);
        assert_eq!(result.potency_boost, 50);
        assert_eq!(result.ignore_defense_percent, 100);
        assert_eq!(result.ignore_defense_fraction(), 1.0);
    }

    #[test]
    fn damage_effects_are_skipped() {
        let user = unit(1);
        let target = unit(2);
        let ctx = ConditionContext::new(&user, &target);
        let effects = vec![Effect::new(EffectKind::Damage(DamageEffect::physical(100)))];

        let result = process_effects(&effects, &ctx, &SkillId::new("strike"), 0);
        assert_eq!(result, EffectProcessingResult::default());
    }

    #[test]
    fn failed_condition_drops_the_effect() {
        let user = unit(1);
        let target = unit(2);
        let ctx = ConditionContext::new(&user, &target);
        let effects = vec![
            Effect::new(EffectKind::PotencyBoost { amount: 50 })
                .with_condition(Condition::hp_below_percent(ConditionSubject::User, 50)),
        ];

        let result = process_effects(&effects, &ctx, &SkillId::new("desperation"), 0);
        assert_eq!(result.potency_boost, 0);
    }

    #[test]
    fn defeat_gated_resource_gain_is_deferred() {
        let user = unit(1);
        let target = unit(2);
        let ctx = ConditionContext::new(&user, &target);
        let effects = vec![
            Effect::new(EffectKind::ResourceGain {
                resource: ResourceKind::Ap,
                amount: 2,
            })
            .with_condition(Condition::target_defeated()),
        ];

        // The target is alive, but the gain survives processing with the
        // defeat gate deferred to the executor.
        let result = process_effects(&effects, &ctx, &SkillId::new("reaper"), 0);
        assert_eq!(result.resource_gains.len(), 1);
        assert!(result.resource_gains[0].requires_defeat);
    }

    #[test]
    fn modifier_payload_carries_skill_identity() {
        let user = unit(1);
        let target = unit(2);
        let ctx = ConditionContext::new(&user, &target);
        let effects = vec![Effect::new(EffectKind::ApplyBuff(ModifierPayload::flat(
            ModifierStat::Stat(StatKind::Critical),
            25,
        )))
        .on_user()];

        let result = process_effects(&effects, &ctx, &SkillId::new("focus"), 12);
        let (apply_to, modifier) = &result.buffs[0];
        assert_eq!(*apply_to, EffectTarget::User);
        assert_eq!(modifier.skill, SkillId::new("focus"));
        assert_eq!(modifier.value, 25);
    }

    #[test]
    fn sacrifice_floors_and_clamps() {
        let mut user = unit(1);
        let target = unit(2);
        let effects = vec![Effect::new(EffectKind::SacrificeHp { percent: 30 })];

        {
            let ctx = ConditionContext::new(&user, &target);
            let outcome = process_sacrifice_effects(&effects, &ctx);
            // floor(100 * 30/100) = 30
            assert_eq!(outcome.hp_sacrificed, 30);
        }

        user.current_hp = 10;
        let ctx = ConditionContext::new(&user, &target);
        let outcome = process_sacrifice_effects(&effects, &ctx);
        // Clamped: the caster keeps at least 1 HP.
        assert_eq!(outcome.hp_sacrificed, 9);
    }

    #[test]
    fn conferral_captures_caster_matk() {
        let user = unit(1);
        let target = unit(2);
        let ctx = ConditionContext::new(&user, &target);
        let effects = vec![Effect::new(EffectKind::GrantConferral {
            potency: 60,
            duration: Expiry::UntilNextAttack,
        })];

        let result = process_effects(&effects, &ctx, &SkillId::new("spell_brand"), 34);
        assert_eq!(result.conferrals[0].caster_matk, 34);
        assert_eq!(result.conferrals[0].potency, 60);
    }
}
