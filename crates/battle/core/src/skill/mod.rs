//! Skill definitions - the catalog input data consumed by the executor.
//!
//! Skills, effects, and conditions arrive as static content (closed,
//! versioned variant sets). The core never authors or validates catalogs; it
//! tolerates unknown future kinds by skipping them with a logged warning.

pub mod condition;
pub mod effect;

use bitflags::bitflags;

pub use condition::{Condition, ConditionSubject, CountSide, EqualityComparator,
    NumericComparator, ScalarRef};
pub use effect::{CleanseScope, DamageEffect, Effect, EffectKind, EffectTarget, HealAmount,
    ModifierPayload, OwnHpScaling, ResourceKind};

/// Catalog identifier of a skill.
///
/// Skill identity drives the replace-vs-stack semantics of buffs and
/// conferrals, so it is threaded through every granted status entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SkillId(String);

impl SkillId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SkillId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl core::fmt::Display for SkillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

bitflags! {
    /// Innate skill flags read by the damage pipeline.
    ///
    /// Each of these can also arrive as a consumable buff on the attacker;
    /// the pipeline honors either source.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SkillFlags: u8 {
        /// The attack always hits and bypasses evade consumption.
        const TRUE_STRIKE   = 1 << 0;
        /// The attack always crits (unless the attacker is crit-sealed).
        const TRUE_CRITICAL = 1 << 1;
        /// The physical component cannot be guarded.
        const UNGUARDABLE   = 1 << 2;
    }
}

// Serialized as raw bits. Unknown bits from newer catalogs are dropped on
// load rather than rejected.
#[cfg(feature = "serde")]
impl serde::Serialize for SkillFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SkillFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = <u8 as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// Broad skill classification, carried through to events and results.
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
pub enum SkillCategory {
    Physical,
    Magical,
    Healing,
    Support,
}

/// Attack delivery type. Melee attacks are halved against flying targets and
/// can be parried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum AttackType {
    Melee,
    Ranged,
    Magic,
}

/// A complete skill definition.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: SkillFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub categories: Vec<SkillCategory>,
    /// Innate attack type; `None` for pure support skills.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_type: Option<AttackType>,
    /// Skill hit-rate percentage folded into the hit formula.
    #[cfg_attr(feature = "serde", serde(default = "default_hit_rate"))]
    pub hit_rate: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub ap_cost: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pp_cost: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<Effect>,
}

#[cfg(feature = "serde")]
fn default_hit_rate() -> i32 {
    100
}

impl Skill {
    /// Create an empty skill with default hit rate and no effects.
    pub fn new(id: impl Into<SkillId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            flags: SkillFlags::empty(),
            categories: Vec::new(),
            attack_type: None,
            hit_rate: 100,
            ap_cost: 0,
            pp_cost: 0,
            effects: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: SkillFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_attack_type(mut self, attack_type: AttackType) -> Self {
        self.attack_type = Some(attack_type);
        self
    }

    pub fn with_hit_rate(mut self, hit_rate: i32) -> Self {
        self.hit_rate = hit_rate;
        self
    }

    pub fn with_costs(mut self, ap: i32, pp: i32) -> Self {
        self.ap_cost = ap;
        self.pp_cost = pp;
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether the skill carries at least one damage effect.
    pub fn is_damage_skill(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e.kind, EffectKind::Damage(_)))
    }
}

impl From<SkillId> for String {
    fn from(id: SkillId) -> Self {
        id.0
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn skill_flags_round_trip_as_bits() {
        let flags = SkillFlags::TRUE_STRIKE | SkillFlags::UNGUARDABLE;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, "5");
        let back: SkillFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }

    #[test]
    fn skill_deserializes_from_catalog_json() {
        let json = r#"{"id":"strike","name":"Strike","flags":5,"hitRate":85}"#;
        let skill: Skill = serde_json::from_str(json).unwrap();
        assert_eq!(skill.id, SkillId::new("strike"));
        assert!(skill.flags.contains(SkillFlags::TRUE_STRIKE | SkillFlags::UNGUARDABLE));
        assert_eq!(skill.hit_rate, 85);
        assert!(skill.effects.is_empty());
    }
}
