//! Combat resolution: condition evaluation, effect processing, status
//! lifecycle, consumable resolution, the damage pipeline, and the skill
//! executor that orchestrates them.

pub mod condition;
pub mod consume;
pub mod context;
pub mod damage;
pub mod effects;
pub mod executor;
pub mod result;
pub mod status;

pub use condition::{evaluate, evaluate_all};
pub use consume::{check_and_consume_buff, check_and_consume_damage_immunity,
    check_and_consume_evade, ImmunityCheck};
pub use context::{BattlefieldView, ConditionContext, ResolutionFlags};
pub use damage::{calculate_multi_hit_damage, calculate_skill_damage, natural_guard_multiplier,
    SequenceState};
pub use effects::{process_effects, process_sacrifice_effects, EffectProcessingResult,
    PendingAffliction, PendingConferral, PendingResourceGain, SacrificeOutcome};
pub use executor::execute_skill;
pub use result::{DamageBreakdown, DamageResult, SkillResult, TargetOutcome};
pub use status::{apply_affliction, apply_buff, apply_debuff, cleanse,
    effective_stats_for_target, recalculate_stats, remove_affliction, remove_expired_buffs,
    remove_expired_conferrals, remove_expired_consumables, remove_expired_debuffs,
    remove_expired_statuses};
