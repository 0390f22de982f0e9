//! Result types produced by the damage calculator and skill executor.
//!
//! Every hit keeps its full stage-by-stage breakdown for auditing; a blocked
//! hit reports zero damage while the breakdown retains what would have been
//! dealt.

use crate::state::CombatantId;

/// Stage-by-stage damage breakdown for one hit.
///
/// `raw_base_damage` is the pre-potency attack/defense difference and may be
/// negative; every later stage is post-floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DamageBreakdown {
    pub raw_base_damage: i32,
    pub after_potency: i32,
    pub after_crit: i32,
    pub after_guard: i32,
    pub after_effectiveness: i32,
    pub after_damage_reduction: i32,
}

/// Outcome of one hit of a damage effect.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DamageResult {
    /// Whether the hit connected (a dodged hit did not connect).
    pub hit: bool,
    /// Final damage to apply; zero for misses, dodges, and blocked hits.
    pub damage: i32,
    pub was_critical: bool,
    pub was_guarded: bool,
    pub was_dodged: bool,
    /// A damage immunity zeroed the final damage of a landed hit.
    pub was_blocked: bool,
    /// The computed hit chance, retained for auditing.
    pub hit_chance: f64,
    pub breakdown: DamageBreakdown,
}

impl DamageResult {
    /// A missed hit: all-zero breakdown, only the hit chance retained.
    pub fn miss(hit_chance: f64) -> Self {
        Self {
            hit_chance,
            ..Self::default()
        }
    }

    /// A dodged hit: the roll landed, an evade negated it.
    pub fn dodged(hit_chance: f64) -> Self {
        Self {
            was_dodged: true,
            hit_chance,
            ..Self::default()
        }
    }
}

/// Everything that happened to one target of a skill invocation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TargetOutcome {
    pub target: CombatantId,
    /// Per-hit results; empty for non-damage skills.
    pub hits: Vec<DamageResult>,
    pub total_damage: i32,
    /// Whether the skill connected with this target. Non-damage skills
    /// always connect.
    pub connected: bool,
    pub defeated: bool,
}

impl TargetOutcome {
    pub fn any_critical(&self) -> bool {
        self.hits.iter().any(|h| h.was_critical)
    }

    pub fn any_dodged(&self) -> bool {
        self.hits.iter().any(|h| h.was_dodged)
    }
}

/// Result of one full skill execution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SkillResult {
    Single {
        outcome: TargetOutcome,
        hp_sacrificed: i32,
    },
    Multi {
        outcomes: Vec<TargetOutcome>,
        hp_sacrificed: i32,
    },
}

impl SkillResult {
    /// Per-target outcomes regardless of shape.
    pub fn outcomes(&self) -> &[TargetOutcome] {
        match self {
            SkillResult::Single { outcome, .. } => std::slice::from_ref(outcome),
            SkillResult::Multi { outcomes, .. } => outcomes,
        }
    }

    /// HP the caster paid up front.
    pub fn hp_sacrificed(&self) -> i32 {
        match self {
            SkillResult::Single { hp_sacrificed, .. }
            | SkillResult::Multi { hp_sacrificed, .. } => *hp_sacrificed,
        }
    }

    /// Total damage dealt across all targets.
    pub fn total_damage(&self) -> i32 {
        self.outcomes().iter().map(|o| o.total_damage).sum()
    }

    /// Whether any target was defeated by this execution.
    pub fn any_defeated(&self) -> bool {
        self.outcomes().iter().any(|o| o.defeated)
    }
}
