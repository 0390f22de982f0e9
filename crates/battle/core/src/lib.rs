//! Deterministic turn-based combat resolution.
//!
//! `battle-core` resolves one skill invocation at a time: hit/miss, critical
//! and guard outcomes, the multi-stage damage pipeline, and every secondary
//! state change (buffs, debuffs, afflictions, conferrals, consumable
//! evades/immunities, resource gains). All randomness, effectiveness data,
//! and event output arrive through the capabilities in [`env`], so a seeded
//! generator replays an engagement draw-for-draw.
pub mod combat;
pub mod env;
pub mod error;
pub mod skill;
pub mod state;
pub use combat::{
    execute_skill, BattlefieldView, ConditionContext, DamageBreakdown, DamageResult,
    EffectProcessingResult, ResolutionFlags, SequenceState, SkillResult, TargetOutcome,
};
pub use env::{
    compute_seed, CombatEnv, CombatEvent, Effectiveness, EffectivenessOracle, EffectivenessRule,
    EventSink, NeutralEffectiveness, NullSink, RandomSource, RecordingSink, SeededRng,
    SequenceRng, TableEffectiveness,
};
pub use error::ExecuteError;
pub use skill::{
    AttackType, Condition, ConditionSubject, DamageEffect, Effect, EffectKind, EffectTarget,
    HealAmount, ResourceKind, Skill, SkillCategory, SkillFlags, SkillId,
};
pub use state::{
    Affliction, AfflictionKind, CombatStats, CombatantFlags, CombatantId, CombatantState,
    CombatantType, Conferral, DamageImmunity, Evade, EvadeKind, Expiry, GuardTier, ImmunityKind,
    ModifierStat, Position, Row, Scaling, StatKind, StatModifier, Team,
};
