//! Status entries carried by a combatant: buffs, debuffs, afflictions,
//! conferrals, and the one-shot defensive consumables (evades and damage
//! immunities).
//!
//! Entries live in plain `Vec`s on [`crate::state::CombatantState`]; the
//! lifecycle rules (replace vs stack, expiry triggers, consumption priority)
//! are implemented in the `combat::status` and `combat::consume` modules.

use crate::skill::SkillId;
use crate::state::stats::StatKind;

/// How a modifier value is applied to the foundation stat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Scaling {
    /// Added to the foundation value before percent scaling.
    #[default]
    Flat,
    /// Summed into the percent multiplier: `(1 + percent/100)`.
    Percent,
}

/// When a status entry expires.
///
/// `Indefinite` entries are never auto-removed; everything else is pruned by
/// the matching trigger during skill execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Expiry {
    #[default]
    Indefinite,
    /// Expires once the holder performs an attack.
    UntilNextAttack,
    /// Expires once the holder is attacked.
    UntilAttacked,
    /// Expires when the holder's action resolves.
    UntilActionEnd,
}

/// The stat a buff or debuff modifies.
///
/// Primary stats feed the recalculation pass; the named specials are one-shot
/// consumables resolved by `combat::consume` and never contribute to stat
/// sums.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ModifierStat {
    /// One of the ten primary stats.
    Stat(StatKind),
    /// Multiplies the value of incoming debuff contributions (debuffs only,
    /// value in percent: 150 = ×1.5).
    DebuffAmplification,
    /// Negates the magical component of one incoming attack.
    NegateMagicDamage,
    /// Forces the holder's next attack to hit.
    TrueStrike,
    /// Forces the holder's next attack to crit.
    TrueCritical,
    /// The holder's next attack cannot be guarded.
    Unguardable,
}

/// A buff or debuff instance.
///
/// Identity for replace-vs-stack decisions is the granting `skill`, not the
/// stat: re-applying a non-stacking modifier from the same skill replaces the
/// prior instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct StatModifier {
    pub stat: ModifierStat,
    pub value: i32,
    pub scaling: Scaling,
    pub duration: Expiry,
    /// The skill that granted this modifier (replace identity).
    pub skill: SkillId,
    /// `true` appends instead of replacing on re-application.
    pub stacks: bool,
    /// When set, the modifier only contributes to the target-specific
    /// effective-stats view against combatants of this type, never to the
    /// unconditional recalculation.
    pub conditional_on_target: Option<crate::state::CombatantType>,
}

/// Affliction kinds.
///
/// Burn is the only stacking affliction (its level accumulates); the rest
/// replace on re-application. Deathblow is instantaneous and never stored.
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
pub enum AfflictionKind {
    Poison,
    /// Stacking damage-over-time; `level` accumulates on re-application.
    Burn,
    /// Forces the holder's next attack to miss, then clears.
    Blind,
    Stun,
    /// The holder cannot land critical hits.
    CritSeal,
    /// The holder cannot guard.
    GuardSeal,
    /// Instant zero HP. Resolved on application, never stored.
    Deathblow,
}

/// A stored affliction instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Affliction {
    pub kind: AfflictionKind,
    /// Burn accumulates this; other kinds keep it at 1.
    pub level: i32,
    /// The skill that inflicted this affliction.
    pub skill: SkillId,
}

/// Bonus magical damage granted to the holder's own subsequent attacks by an
/// ally's support skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Conferral {
    pub skill: SkillId,
    /// Percentage applied to `caster_matk − target MDEF`.
    pub potency: i32,
    /// The granting caster's magical attack, captured at grant time.
    pub caster_matk: i32,
    pub duration: Expiry,
}

/// Evasion consumable scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EvadeKind {
    /// Negates one incoming hit.
    SingleHit,
    /// Negates up to two incoming hits (per-entry counter).
    TwoHits,
    /// Negates every hit of one incoming attack, consuming all evade entries.
    EntireAttack,
}

/// A one-shot evasion status.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Evade {
    pub kind: EvadeKind,
    /// Remaining uses; only meaningful for [`EvadeKind::TwoHits`].
    pub remaining: i32,
    pub duration: Expiry,
}

impl Evade {
    /// Create an evade with the default remaining-use counter for its kind.
    pub fn new(kind: EvadeKind, duration: Expiry) -> Self {
        let remaining = match kind {
            EvadeKind::TwoHits => 2,
            EvadeKind::SingleHit | EvadeKind::EntireAttack => 1,
        };
        Self {
            kind,
            remaining,
            duration,
        }
    }
}

/// Damage-immunity consumable scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ImmunityKind {
    /// Blocks the damage of one landed hit.
    SingleHit,
    /// Blocks the damage of multiple landed hits (per-entry counter).
    MultipleHits,
    /// Blocks every hit of one incoming attack.
    EntireAttack,
}

/// A one-shot damage-immunity status.
///
/// Unlike evasion, an immunity lets the hit land (and the breakdown records
/// what would have been dealt) but zeroes the final damage.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DamageImmunity {
    pub kind: ImmunityKind,
    /// Remaining hits to block; only meaningful for
    /// [`ImmunityKind::MultipleHits`].
    pub remaining_hits: i32,
    pub duration: Expiry,
}

impl DamageImmunity {
    /// Create an immunity with the default remaining-hit counter for its kind.
    pub fn new(kind: ImmunityKind, duration: Expiry) -> Self {
        let remaining_hits = match kind {
            ImmunityKind::MultipleHits => 2,
            ImmunityKind::SingleHit | ImmunityKind::EntireAttack => 1,
        };
        Self {
            kind,
            remaining_hits,
            duration,
        }
    }

    /// Create a multiple-hit immunity with an explicit counter.
    pub fn multiple_hits(hits: i32, duration: Expiry) -> Self {
        Self {
            kind: ImmunityKind::MultipleHits,
            remaining_hits: hits,
            duration,
        }
    }
}

/// Guard tiers for the companion "Guard" skill override.
///
/// When set on a target, the tier multiplier replaces the natural guard roll
/// for the next incoming physical hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum GuardTier {
    Light,
    Medium,
    Heavy,
    /// Fully negates the physical component.
    Full,
}

impl GuardTier {
    /// Damage multiplier applied to the physical component.
    pub fn multiplier(self) -> f64 {
        match self {
            GuardTier::Light => 0.75,
            GuardTier::Medium => 0.5,
            GuardTier::Heavy => 0.25,
            GuardTier::Full => 0.0,
        }
    }
}
