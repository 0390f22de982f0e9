//! Class-effectiveness oracle.
//!
//! Effectiveness is static content: a pure lookup from the attacker's and
//! defender's combatant types to a damage multiplier plus the rule that
//! produced it. The engine treats the table as opaque data behind a trait so
//! catalogs can ship their own matchup charts.

use crate::state::CombatantType;

/// Why an effectiveness multiplier applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EffectivenessRule {
    #[default]
    Neutral,
    /// The attacker's types counter the defender's.
    Advantage,
    /// The defender's types resist the attacker's.
    Disadvantage,
}

/// Result of an effectiveness lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Effectiveness {
    pub multiplier: f64,
    pub rule: EffectivenessRule,
}

impl Effectiveness {
    pub const NEUTRAL: Self = Self {
        multiplier: 1.0,
        rule: EffectivenessRule::Neutral,
    };
}

/// Pure matchup lookup over combatant types.
pub trait EffectivenessOracle {
    fn lookup(&self, attacker: &[CombatantType], defender: &[CombatantType]) -> Effectiveness;
}

/// Always neutral. The default when no matchup chart is supplied.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeutralEffectiveness;

impl EffectivenessOracle for NeutralEffectiveness {
    fn lookup(&self, _attacker: &[CombatantType], _defender: &[CombatantType]) -> Effectiveness {
        Effectiveness::NEUTRAL
    }
}

/// Table-driven matchups; the first matching (attacker type, defender type)
/// pair wins.
#[derive(Clone, Debug, Default)]
pub struct TableEffectiveness {
    entries: Vec<MatchupEntry>,
}

#[derive(Clone, Debug)]
struct MatchupEntry {
    attacker: CombatantType,
    defender: CombatantType,
    multiplier: f64,
}

impl TableEffectiveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a matchup. Multipliers above 1.0 read as advantage, below as
    /// disadvantage.
    pub fn with_matchup(
        mut self,
        attacker: CombatantType,
        defender: CombatantType,
        multiplier: f64,
    ) -> Self {
        self.entries.push(MatchupEntry {
            attacker,
            defender,
            multiplier,
        });
        self
    }
}

impl EffectivenessOracle for TableEffectiveness {
    fn lookup(&self, attacker: &[CombatantType], defender: &[CombatantType]) -> Effectiveness {
        for entry in &self.entries {
            if attacker.contains(&entry.attacker) && defender.contains(&entry.defender) {
                let rule = if entry.multiplier > 1.0 {
                    EffectivenessRule::Advantage
                } else if entry.multiplier < 1.0 {
                    EffectivenessRule::Disadvantage
                } else {
                    EffectivenessRule::Neutral
                };
                return Effectiveness {
                    multiplier: entry.multiplier,
                    rule,
                };
            }
        }
        Effectiveness::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_oracle_always_returns_one() {
        let oracle = NeutralEffectiveness;
        let result = oracle.lookup(&[CombatantType::Dragon], &[CombatantType::Infantry]);
        assert_eq!(result, Effectiveness::NEUTRAL);
    }

    #[test]
    fn table_first_match_wins() {
        let oracle = TableEffectiveness::new()
            .with_matchup(CombatantType::Cavalry, CombatantType::Flying, 2.0)
            .with_matchup(CombatantType::Cavalry, CombatantType::Flying, 0.5);

        let result = oracle.lookup(
            &[CombatantType::Cavalry],
            &[CombatantType::Flying, CombatantType::Dragon],
        );
        assert_eq!(result.multiplier, 2.0);
        assert_eq!(result.rule, EffectivenessRule::Advantage);
    }

    #[test]
    fn unmatched_pair_is_neutral() {
        let oracle =
            TableEffectiveness::new().with_matchup(CombatantType::Mage, CombatantType::Armored, 1.5);
        let result = oracle.lookup(&[CombatantType::Infantry], &[CombatantType::Armored]);
        assert_eq!(result, Effectiveness::NEUTRAL);
    }
}
