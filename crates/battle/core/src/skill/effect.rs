//! Effect kinds - the closed payload set a skill's effect list draws from.
//!
//! Every effect carries its own condition list and an application target.
//! `Damage` effects are resolved by the damage calculator; everything else is
//! folded into an `EffectProcessingResult` by the effect processor. Unknown
//! kinds deserialize to [`EffectKind::Unknown`] and are skipped with a logged
//! warning, never a failure.

use crate::skill::condition::Condition;
use crate::state::{AfflictionKind, CombatantFlags, CombatantType, EvadeKind, Expiry,
    ImmunityKind, ModifierStat, Scaling};

/// Who an effect applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EffectTarget {
    /// The acting combatant. User-directed buffs are applied before the
    /// damage calculation so they affect the very attack that granted them.
    User,
    /// The current target of the skill invocation.
    #[default]
    Target,
}

/// Resource pools a skill can grant or steal.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResourceKind {
    Ap,
    Pp,
}

/// Heal payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum HealAmount {
    Flat(i32),
    /// Percentage of the recipient's maximum HP, resolved at apply time.
    PercentOfMax(i32),
}

/// Cleanse scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CleanseScope {
    Afflictions,
    Debuffs,
    All,
}

/// Own-HP damage scaling for sacrifice-style attacks.
///
/// These skills compute their terminal damage value directly from the
/// attacker's HP and bypass the potency/crit/guard/effectiveness/reduction
/// stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum OwnHpScaling {
    /// Percentage of the attacker's missing HP.
    MissingHp { percent: i32 },
    /// Percentage of the attacker's current HP.
    CurrentHp { percent: i32 },
}

/// Damage payload of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DamageEffect {
    /// Physical potency percentage applied to `PATK − PDEF`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub physical_potency: Option<i32>,
    /// Magical potency percentage applied to `MATK − MDEF`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub magical_potency: Option<i32>,
    /// Number of independent hits; each runs the full single-hit pipeline.
    #[cfg_attr(feature = "serde", serde(default = "default_hit_count"))]
    pub hit_count: u32,
    /// Own-HP terminal damage variant.
    #[cfg_attr(feature = "serde", serde(default))]
    pub own_hp: Option<OwnHpScaling>,
}

#[cfg(feature = "serde")]
fn default_hit_count() -> u32 {
    1
}

impl DamageEffect {
    /// Single-hit physical damage.
    pub fn physical(potency: i32) -> Self {
        Self {
            physical_potency: Some(potency),
            magical_potency: None,
            hit_count: 1,
            own_hp: None,
        }
    }

    /// Single-hit magical damage.
    pub fn magical(potency: i32) -> Self {
        Self {
            physical_potency: None,
            magical_potency: Some(potency),
            hit_count: 1,
            own_hp: None,
        }
    }

    pub fn with_hit_count(mut self, hits: u32) -> Self {
        self.hit_count = hits;
        self
    }

    pub fn with_magical(mut self, potency: i32) -> Self {
        self.magical_potency = Some(potency);
        self
    }
}

/// Buff/debuff payload as authored in the catalog.
///
/// The granting skill id is attached when the modifier is applied, turning
/// this into a stored `StatModifier`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ModifierPayload {
    pub stat: ModifierStat,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: Scaling,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Expiry,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacks: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditional_on_target: Option<CombatantType>,
}

impl ModifierPayload {
    pub fn flat(stat: ModifierStat, value: i32) -> Self {
        Self {
            stat,
            value,
            scaling: Scaling::Flat,
            duration: Expiry::Indefinite,
            stacks: false,
            conditional_on_target: None,
        }
    }

    pub fn percent(stat: ModifierStat, value: i32) -> Self {
        Self {
            scaling: Scaling::Percent,
            ..Self::flat(stat, value)
        }
    }

    pub fn with_duration(mut self, duration: Expiry) -> Self {
        self.duration = duration;
        self
    }

    pub fn stacking(mut self) -> Self {
        self.stacks = true;
        self
    }

    pub fn against(mut self, target_type: CombatantType) -> Self {
        self.conditional_on_target = Some(target_type);
        self
    }
}

/// The closed effect kind set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "camelCase"))]
pub enum EffectKind {
    /// Resolved by the damage calculator, not the effect processor.
    Damage(DamageEffect),

    /// Adds to the potency of this skill's damage components (additive merge).
    PotencyBoost { amount: i32 },

    /// Ignores a fraction of the target's defense. Multiple entries take the
    /// maximum, capped at 100%.
    IgnoreDefense { percent: i32 },

    /// Grants combatant flags.
    GrantFlag { flags: CombatantFlags },

    Heal { amount: HealAmount },

    /// Grants AP/PP to the user. When gated on a target-defeated condition,
    /// a multi-target skill grants it at most once.
    ResourceGain { resource: ResourceKind, amount: i32 },

    ApplyBuff(ModifierPayload),

    ApplyDebuff(ModifierPayload),

    InflictAffliction {
        affliction: AfflictionKind,
        #[cfg_attr(feature = "serde", serde(default = "default_level"))]
        level: i32,
    },

    Cleanse { scope: CleanseScope },

    /// Grants bonus magical damage to the recipient's own future attacks;
    /// the caster's MATK is captured at grant time.
    GrantConferral { potency: i32, duration: Expiry },

    /// Revives a defeated target at a percentage of max HP.
    Resurrect { percent_hp: i32 },

    /// Heals the user for a percentage of the damage dealt.
    Lifesteal { percent: i32 },

    /// Moves AP/PP from the target to the user.
    ResourceSteal { resource: ResourceKind, amount: i32 },

    /// Upfront HP cost of using the skill; paid exactly once per invocation
    /// regardless of target count, and never below 1 remaining HP.
    SacrificeHp { percent: i32 },

    GrantEvasion { evade: EvadeKind, duration: Expiry },

    GrantImmunity { immunity: ImmunityKind, duration: Expiry },

    /// Bonus damage from the target's current HP, added after effectiveness
    /// and before damage reduction.
    TargetHpBonusDamage { percent_of_current: i32 },

    /// Future catalog kinds land here; skipped with a logged warning.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

#[cfg(feature = "serde")]
fn default_level() -> i32 {
    1
}

/// A skill effect: payload, gating conditions, and application target.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Effect {
    pub kind: EffectKind,
    /// Conjunctive condition list; empty means unconditional.
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<Condition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub apply_to: EffectTarget,
}

impl Effect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
            apply_to: EffectTarget::Target,
        }
    }

    pub fn on_user(mut self) -> Self {
        self.apply_to = EffectTarget::User;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions.extend(conditions);
        self
    }
}
