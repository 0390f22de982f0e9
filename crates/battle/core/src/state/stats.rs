//! Combat stats - foundation values and recalculated derived values.
//!
//! Every combatant carries two copies of [`CombatStats`]:
//!
//! - the **foundation**: base class stats plus equipment bonuses, immutable
//!   for the duration of an engagement, and
//! - the **derived** stats: recomputed from the foundation plus active
//!   buffs/debuffs, never edited directly.
//!
//! Derived = round((foundation + flat) × (1 + percent/100)), clamped.

/// The ten primary combat stats.
///
/// This is a closed set: buffs and debuffs reference these kinds, and the
/// recalculation pass iterates over all of them.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatKind {
    /// Maximum hit points. Clamped to a minimum of 1 after recalculation.
    MaxHp,
    /// Physical attack power.
    PhysicalAttack,
    /// Magical attack power.
    MagicalAttack,
    /// Physical defense.
    PhysicalDefense,
    /// Magical defense.
    MagicalDefense,
    /// Accuracy (hit chance contribution).
    Accuracy,
    /// Evasion (hit chance reduction).
    Evasion,
    /// Critical chance (percentage).
    Critical,
    /// Guard chance (percentage, physical damage only).
    Guard,
    /// Flat percentage reduction applied at the end of the damage pipeline.
    DamageReduction,
}

/// A full set of primary stat values.
///
/// Used both as the per-engagement foundation and as the recalculated
/// derived stats on a combatant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub max_hp: i32,
    pub physical_attack: i32,
    pub magical_attack: i32,
    pub physical_defense: i32,
    pub magical_defense: i32,
    pub accuracy: i32,
    pub evasion: i32,
    pub critical: i32,
    pub guard: i32,
    pub damage_reduction: i32,
}

impl CombatStats {
    /// Read a stat by kind.
    pub fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::MaxHp => self.max_hp,
            StatKind::PhysicalAttack => self.physical_attack,
            StatKind::MagicalAttack => self.magical_attack,
            StatKind::PhysicalDefense => self.physical_defense,
            StatKind::MagicalDefense => self.magical_defense,
            StatKind::Accuracy => self.accuracy,
            StatKind::Evasion => self.evasion,
            StatKind::Critical => self.critical,
            StatKind::Guard => self.guard,
            StatKind::DamageReduction => self.damage_reduction,
        }
    }

    /// Write a stat by kind.
    pub fn set(&mut self, kind: StatKind, value: i32) {
        match kind {
            StatKind::MaxHp => self.max_hp = value,
            StatKind::PhysicalAttack => self.physical_attack = value,
            StatKind::MagicalAttack => self.magical_attack = value,
            StatKind::PhysicalDefense => self.physical_defense = value,
            StatKind::MagicalDefense => self.magical_defense = value,
            StatKind::Accuracy => self.accuracy = value,
            StatKind::Evasion => self.evasion = value,
            StatKind::Critical => self.critical = value,
            StatKind::Guard => self.guard = value,
            StatKind::DamageReduction => self.damage_reduction = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn get_set_round_trips_every_kind() {
        let mut stats = CombatStats::default();
        for (i, kind) in StatKind::iter().enumerate() {
            stats.set(kind, i as i32 + 1);
        }
        for (i, kind) in StatKind::iter().enumerate() {
            assert_eq!(stats.get(kind), i as i32 + 1);
        }
    }

    #[test]
    fn ten_primary_stats() {
        assert_eq!(StatKind::iter().count(), 10);
    }
}
