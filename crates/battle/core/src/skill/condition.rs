//! Condition kinds - the closed predicate set gating skill effects.
//!
//! Conditions are pure predicates over a snapshot of the acting and target
//! combatants plus optional battlefield aggregates. Evaluation lives in
//! `combat::condition`; this module only defines the data.
//!
//! Two comparator families exist: equality (boolean-valued conditions, with a
//! default expected value of `true`) and numeric. An unrecognized kind or
//! comparator resolves to `false` with a logged warning, never an error.

use crate::state::{AfflictionKind, CombatantFlags, CombatantType, Row, StatKind};

/// Which combatant a condition inspects.
///
/// `Ally` and `Enemy` both resolve to the in-context target of the current
/// invocation; the distinction is catalog-side documentation of whether the
/// skill is friendly or hostile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ConditionSubject {
    /// The acting combatant.
    #[default]
    User,
    /// The in-context target of a friendly skill.
    Ally,
    /// The in-context target of a hostile skill.
    Enemy,
}

/// Comparators for boolean-valued conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EqualityComparator {
    #[default]
    EqualTo,
    NotEqualTo,
    /// Future comparator kinds land here; evaluate to `false` with a warning.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl EqualityComparator {
    /// Compare an actual boolean against the expected value.
    ///
    /// Returns `None` for [`EqualityComparator::Unknown`] so the evaluator
    /// can log and fall back to `false`.
    pub fn compare(self, actual: bool, expected: bool) -> Option<bool> {
        match self {
            EqualityComparator::EqualTo => Some(actual == expected),
            EqualityComparator::NotEqualTo => Some(actual != expected),
            EqualityComparator::Unknown => None,
        }
    }
}

/// Comparators for numeric-valued conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum NumericComparator {
    #[default]
    EqualTo,
    NotEqualTo,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    /// Future comparator kinds land here; evaluate to `false` with a warning.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl NumericComparator {
    /// Compare `lhs` against `rhs`.
    ///
    /// Returns `None` for [`NumericComparator::Unknown`] so the evaluator
    /// can log and fall back to `false`.
    pub fn compare(self, lhs: i32, rhs: i32) -> Option<bool> {
        match self {
            NumericComparator::EqualTo => Some(lhs == rhs),
            NumericComparator::NotEqualTo => Some(lhs != rhs),
            NumericComparator::GreaterThan => Some(lhs > rhs),
            NumericComparator::LessThan => Some(lhs < rhs),
            NumericComparator::GreaterOrEqual => Some(lhs >= rhs),
            NumericComparator::LessOrEqual => Some(lhs <= rhs),
            NumericComparator::Unknown => None,
        }
    }
}

/// Scalar a threshold condition reads from the subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ScalarRef {
    /// Current HP; supports the percent-of-max option.
    Hp,
    /// Current AP.
    Ap,
    /// Current PP.
    Pp,
    /// A derived primary stat.
    Stat(StatKind),
}

/// Which side a unit-count condition counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum CountSide {
    Allies,
    Enemies,
}

/// The closed condition kind set.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "camelCase"))]
pub enum Condition {
    /// The subject carries the given combatant type.
    CombatantTypeIs {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        combatant_type: CombatantType,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    /// Numeric threshold against a subject scalar, optionally as a
    /// percentage of the maximum (HP only).
    StatThreshold {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        scalar: ScalarRef,
        value: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        percent_of_max: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: NumericComparator,
    },

    HasAffliction {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        affliction: AfflictionKind,
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    HasAnyAffliction {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    HasAnyBuff {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    HasAnyDebuff {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    HasFlag {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        flags: CombatantFlags,
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    /// The last resolved hit connected.
    HitConnected {
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    /// The in-context target is defeated.
    TargetDefeated {
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    RowPosition {
        #[cfg_attr(feature = "serde", serde(default))]
        subject: ConditionSubject,
        row: Row,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    /// The first hit of the engagement's previous exchange was guarded.
    FirstHitGuarded {
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    /// The last resolved hit was a critical.
    WasCritical {
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    IsNight {
        #[cfg_attr(feature = "serde", serde(default = "default_true"))]
        expected: bool,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: EqualityComparator,
    },

    /// Count of living units on one side.
    UnitCount {
        side: CountSide,
        value: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: NumericComparator,
    },

    /// `ally_count − enemy_count`.
    UnitCountDifference {
        value: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: NumericComparator,
    },

    /// Count of units of a type sharing the acting unit's row.
    SameRowTypeCount {
        combatant_type: CombatantType,
        value: i32,
        #[cfg_attr(feature = "serde", serde(default))]
        comparator: NumericComparator,
    },

    /// Future catalog kinds land here; evaluate to `false` with a warning.
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Condition {
    /// Subject-has-affliction shorthand with default comparator semantics.
    pub fn has_affliction(subject: ConditionSubject, affliction: AfflictionKind) -> Self {
        Condition::HasAffliction {
            subject,
            affliction,
            expected: true,
            comparator: EqualityComparator::EqualTo,
        }
    }

    /// Subject-is-type shorthand.
    pub fn is_type(subject: ConditionSubject, combatant_type: CombatantType) -> Self {
        Condition::CombatantTypeIs {
            subject,
            combatant_type,
            comparator: EqualityComparator::EqualTo,
        }
    }

    /// Target-defeated shorthand.
    pub fn target_defeated() -> Self {
        Condition::TargetDefeated {
            expected: true,
            comparator: EqualityComparator::EqualTo,
        }
    }

    /// HP-below-percent shorthand.
    pub fn hp_below_percent(subject: ConditionSubject, percent: i32) -> Self {
        Condition::StatThreshold {
            subject,
            scalar: ScalarRef::Hp,
            value: percent,
            percent_of_max: true,
            comparator: NumericComparator::LessThan,
        }
    }
}
