//! Combatant state - one per unit participating in combat.
//!
//! A [`CombatantState`] persists for the whole engagement. Its mutable status
//! collections start empty and are updated in place by the status/effect
//! layers; `combat_stats` is always a pure function of `foundation` plus the
//! active buffs/debuffs at the moment of the last recalculation.

use bitflags::bitflags;

use super::stats::CombatStats;
use super::status::{Affliction, AfflictionKind, Conferral, DamageImmunity, Evade, GuardTier,
    StatModifier};

/// Unique combatant identifier within an engagement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl core::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "combatant#{}", self.0)
    }
}

/// Team tag for a combatant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Team {
    #[default]
    Blue,
    Red,
}

/// Formation row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Row {
    #[default]
    Front,
    Back,
}

/// Formation position (row + column).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Position {
    pub row: Row,
    pub column: u8,
}

impl Position {
    pub fn new(row: Row, column: u8) -> Self {
        Self { row, column }
    }
}

/// Combatant classification used by conditions and effectiveness lookups.
///
/// A unit can carry several types (e.g. `Flying` + `Dragon`).
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
pub enum CombatantType {
    Infantry,
    Armored,
    Cavalry,
    /// Flying units halve melee hit chance against them.
    Flying,
    Undead,
    Beast,
    Dragon,
    Mage,
}

bitflags! {
    /// One-shot and persistent flags on a combatant.
    ///
    /// Flags are granted by skill effects and read by conditions and the
    /// damage pipeline.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CombatantFlags: u8 {
        /// Debuff applications silently no-op while set.
        const DEBUFF_IMMUNE  = 1 << 0;
        /// The next incoming melee physical hit is nulled, consuming the flag.
        const INCOMING_PARRY = 1 << 1;
        /// Generic condition marker set by support skills.
        const EMPOWERED      = 1 << 2;
        /// Generic condition marker set by hostile skills.
        const MARKED         = 1 << 3;
    }
}

// Serialized as raw bits. Unknown bits from newer catalogs are dropped on
// load rather than rejected.
#[cfg(feature = "serde")]
impl serde::Serialize for CombatantFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CombatantFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = <u8 as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// Full per-unit combat state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CombatantState {
    pub id: CombatantId,
    pub team: Team,
    pub position: Position,

    pub current_hp: i32,
    pub current_ap: i32,
    pub current_pp: i32,

    /// Derived stats, recomputed from `foundation` + buffs/debuffs.
    /// Never edited directly.
    pub combat_stats: CombatStats,
    /// Base class stats + equipment bonuses. Immutable per engagement.
    pub foundation: CombatStats,
    /// Equipment contribution to the natural guard reduction.
    pub guard_efficiency: i32,

    pub buffs: Vec<StatModifier>,
    pub debuffs: Vec<StatModifier>,
    pub afflictions: Vec<Affliction>,
    pub conferrals: Vec<Conferral>,
    pub evades: Vec<Evade>,
    pub damage_immunities: Vec<DamageImmunity>,
    pub flags: CombatantFlags,
    pub combatant_types: Vec<CombatantType>,

    /// Companion "Guard" skill override for the next incoming physical hit.
    pub incoming_guard: Option<GuardTier>,
}

impl CombatantState {
    /// Create a combatant at full HP with empty status collections.
    ///
    /// The foundation is supplied by the equipment/base-stat lookup at
    /// combatant-initialization time and is not re-derived mid-engagement.
    pub fn new(id: CombatantId, team: Team, position: Position, foundation: CombatStats) -> Self {
        Self {
            id,
            team,
            position,
            current_hp: foundation.max_hp,
            current_ap: 0,
            current_pp: 0,
            combat_stats: foundation,
            foundation,
            guard_efficiency: 0,
            buffs: Vec::new(),
            debuffs: Vec::new(),
            afflictions: Vec::new(),
            conferrals: Vec::new(),
            evades: Vec::new(),
            damage_immunities: Vec::new(),
            flags: CombatantFlags::empty(),
            combatant_types: Vec::new(),
            incoming_guard: None,
        }
    }

    /// Maximum HP from the current derived stats.
    pub fn max_hp(&self) -> i32 {
        self.combat_stats.max_hp
    }

    /// A combatant is defeated at zero HP.
    pub fn is_defeated(&self) -> bool {
        self.current_hp <= 0
    }

    pub fn has_type(&self, kind: CombatantType) -> bool {
        self.combatant_types.contains(&kind)
    }

    pub fn is_flying(&self) -> bool {
        self.has_type(CombatantType::Flying)
    }

    pub fn has_affliction(&self, kind: AfflictionKind) -> bool {
        self.afflictions.iter().any(|a| a.kind == kind)
    }

    /// Current level of an affliction, 0 when absent.
    pub fn affliction_level(&self, kind: AfflictionKind) -> i32 {
        self.afflictions
            .iter()
            .find(|a| a.kind == kind)
            .map_or(0, |a| a.level)
    }

    /// Subtract damage, clamping HP at 0.
    pub fn apply_damage(&mut self, amount: i32) {
        self.current_hp = (self.current_hp - amount.max(0)).max(0);
    }

    /// Add healing, clamping at maximum HP. Returns the amount restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let missing = (self.max_hp() - self.current_hp).max(0);
        let restored = amount.clamp(0, missing);
        self.current_hp += restored;
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::stats::CombatStats;

    fn unit() -> CombatantState {
        CombatantState::new(
            CombatantId(1),
            Team::Blue,
            Position::default(),
            CombatStats {
                max_hp: 100,
                ..CombatStats::default()
            },
        )
    }

    #[test]
    fn new_combatant_starts_at_full_hp() {
        let unit = unit();
        assert_eq!(unit.current_hp, 100);
        assert!(!unit.is_defeated());
        assert!(unit.buffs.is_empty());
    }

    #[test]
    fn damage_clamps_at_zero() {
        let mut unit = unit();
        unit.apply_damage(250);
        assert_eq!(unit.current_hp, 0);
        assert!(unit.is_defeated());
    }

    #[test]
    fn heal_clamps_at_max_and_reports_restored() {
        let mut unit = unit();
        unit.apply_damage(30);
        assert_eq!(unit.heal(50), 30);
        assert_eq!(unit.current_hp, 100);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn combatant_flags_round_trip_as_bits() {
        let flags = CombatantFlags::DEBUFF_IMMUNE | CombatantFlags::MARKED;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, "9");
        let back: CombatantFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);

        // Bits from a newer catalog are dropped, not rejected.
        let tolerant: CombatantFlags = serde_json::from_str("255").unwrap();
        assert_eq!(tolerant, CombatantFlags::all());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn combatant_state_round_trips_with_flags() {
        let mut unit = unit();
        unit.flags |= CombatantFlags::INCOMING_PARRY;
        let json = serde_json::to_string(&unit).unwrap();
        let back: CombatantState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unit);
    }
}
