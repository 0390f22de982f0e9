//! Structured combat event stream.
//!
//! The engine never prints narration. Every observable moment of a skill
//! resolution is emitted as a [`CombatEvent`] through an injected
//! [`EventSink`], so the surrounding application decides what (if anything)
//! to render. The default [`NullSink`] keeps the core silent.

use std::cell::RefCell;

use crate::skill::{ResourceKind, SkillId};
use crate::state::{AfflictionKind, CombatantId, EvadeKind, ModifierStat};

/// One observable moment of a skill resolution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "camelCase"))]
pub enum CombatEvent {
    SkillUsed {
        skill: SkillId,
        caster: CombatantId,
    },
    HpSacrificed {
        caster: CombatantId,
        amount: i32,
    },
    AttackMissed {
        attacker: CombatantId,
        target: CombatantId,
    },
    /// The attacker's Blind affliction consumed the attack.
    AttackBlinded {
        attacker: CombatantId,
    },
    /// An evasion consumable negated the hit.
    AttackDodged {
        target: CombatantId,
        evade: EvadeKind,
    },
    CriticalHit {
        attacker: CombatantId,
        target: CombatantId,
    },
    AttackGuarded {
        target: CombatantId,
        /// Percentage removed from the physical component.
        reduction_percent: i32,
    },
    /// A melee physical hit was nulled by an incoming parry.
    AttackParried {
        target: CombatantId,
    },
    /// The magical component was negated by a consumable.
    MagicNegated {
        target: CombatantId,
    },
    DamageDealt {
        attacker: CombatantId,
        target: CombatantId,
        amount: i32,
    },
    /// A damage immunity zeroed the final damage of a landed hit.
    DamageBlocked {
        target: CombatantId,
    },
    BuffApplied {
        target: CombatantId,
        stat: ModifierStat,
    },
    DebuffApplied {
        target: CombatantId,
        stat: ModifierStat,
    },
    /// A debuff application no-oped against debuff immunity.
    DebuffResisted {
        target: CombatantId,
    },
    AfflictionInflicted {
        target: CombatantId,
        affliction: AfflictionKind,
        level: i32,
    },
    Cleansed {
        target: CombatantId,
    },
    Healed {
        target: CombatantId,
        amount: i32,
    },
    Resurrected {
        target: CombatantId,
        hp: i32,
    },
    ResourceGained {
        target: CombatantId,
        resource: ResourceKind,
        amount: i32,
    },
    ConferralGranted {
        target: CombatantId,
        potency: i32,
    },
    Defeated {
        target: CombatantId,
    },
}

/// Injected sink for combat events.
///
/// Implementations must not fail; the engine fires and forgets.
pub trait EventSink {
    fn emit(&self, event: CombatEvent);
}

/// Discards every event. The silent-by-default sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: CombatEvent) {}
}

/// Records every event in order; used by tests and replay capture.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<CombatEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events in emission order.
    pub fn take(&self) -> Vec<CombatEvent> {
        self.events.take()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Whether any recorded event satisfies the predicate.
    pub fn any(&self, predicate: impl Fn(&CombatEvent) -> bool) -> bool {
        self.events.borrow().iter().any(predicate)
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: CombatEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_preserves_emission_order() {
        let sink = RecordingSink::new();
        sink.emit(CombatEvent::Defeated {
            target: CombatantId(2),
        });
        sink.emit(CombatEvent::Cleansed {
            target: CombatantId(1),
        });

        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CombatEvent::Defeated { .. }));
        assert!(sink.is_empty());
    }
}
