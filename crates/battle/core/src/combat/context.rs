//! Evaluation context for conditions and effect processing.
//!
//! A context is a read-only snapshot of the acting and target combatants
//! plus optional battlefield aggregates. It is rebuilt per target inside a
//! skill invocation; nothing in it outlives the call.

use crate::skill::ConditionSubject;
use crate::state::{CombatantState, CombatantType};

/// Battlefield aggregates supplied by the caller.
///
/// The engine performs no targeting or roster bookkeeping; counts and
/// prior-exchange flags arrive precomputed.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct BattlefieldView {
    /// Living units on the acting combatant's side.
    pub ally_count: i32,
    /// Living units opposing the acting combatant.
    pub enemy_count: i32,
    pub night: bool,
    /// Types of the units sharing the acting combatant's row.
    pub same_row_types: Vec<CombatantType>,
    /// Whether the previous exchange's hit connected.
    pub last_hit_connected: bool,
    /// Whether the previous exchange defeated its target.
    pub last_target_defeated: bool,
    /// Whether the previous exchange was a critical.
    pub last_was_critical: bool,
    /// Whether the first hit of the previous exchange was guarded.
    pub first_hit_guarded: bool,
}

/// Resolution flags visible to conditions.
///
/// Seeded from the battlefield view when one is provided; the executor keeps
/// them in step as the invocation resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolutionFlags {
    pub hit_connected: bool,
    pub target_defeated: bool,
    pub was_critical: bool,
    pub first_hit_guarded: bool,
}

impl ResolutionFlags {
    fn from_battlefield(view: &BattlefieldView) -> Self {
        Self {
            hit_connected: view.last_hit_connected,
            target_defeated: view.last_target_defeated,
            was_critical: view.last_was_critical,
            first_hit_guarded: view.first_hit_guarded,
        }
    }
}

/// Read-only evaluation context over one (user, target) pair.
pub struct ConditionContext<'a> {
    pub user: &'a CombatantState,
    pub target: &'a CombatantState,
    pub battlefield: Option<&'a BattlefieldView>,
    pub flags: ResolutionFlags,
}

impl<'a> ConditionContext<'a> {
    pub fn new(user: &'a CombatantState, target: &'a CombatantState) -> Self {
        Self {
            user,
            target,
            battlefield: None,
            flags: ResolutionFlags::default(),
        }
    }

    pub fn with_battlefield(
        user: &'a CombatantState,
        target: &'a CombatantState,
        battlefield: Option<&'a BattlefieldView>,
    ) -> Self {
        let flags = battlefield
            .map(ResolutionFlags::from_battlefield)
            .unwrap_or_default();
        Self {
            user,
            target,
            battlefield,
            flags,
        }
    }

    /// Resolve a condition subject to a concrete combatant.
    ///
    /// `Ally` and `Enemy` both resolve to the in-context target; the subject
    /// tag documents the skill's intent, not a roster search.
    pub fn resolve(&self, subject: ConditionSubject) -> &CombatantState {
        match subject {
            ConditionSubject::User => self.user,
            ConditionSubject::Ally | ConditionSubject::Enemy => self.target,
        }
    }
}
