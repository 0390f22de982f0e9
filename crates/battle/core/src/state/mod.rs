//! Combatant model: stats, status collections, and per-unit state.

pub mod combatant;
pub mod stats;
pub mod status;

pub use combatant::{CombatantFlags, CombatantId, CombatantState, CombatantType, Position, Row,
    Team};
pub use stats::{CombatStats, StatKind};
pub use status::{Affliction, AfflictionKind, Conferral, DamageImmunity, Evade, EvadeKind, Expiry,
    GuardTier, ImmunityKind, ModifierStat, Scaling, StatModifier};
