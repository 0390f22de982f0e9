//! Injected environment capabilities.
//!
//! The engine is a pure library: randomness, effectiveness data, and event
//! output are all supplied by the caller through [`CombatEnv`]. One skill
//! execution borrows the bundle for its whole synchronous call graph.

pub mod effectiveness;
pub mod events;
pub mod rng;

pub use effectiveness::{Effectiveness, EffectivenessOracle, EffectivenessRule,
    NeutralEffectiveness, TableEffectiveness};
pub use events::{CombatEvent, EventSink, NullSink, RecordingSink};
pub use rng::{RandomSource, SeededRng, SequenceRng, compute_seed};

/// Capability bundle threaded through a skill resolution.
pub struct CombatEnv<'a> {
    pub rng: &'a mut dyn RandomSource,
    pub effectiveness: &'a dyn EffectivenessOracle,
    pub events: &'a dyn EventSink,
}

impl<'a> CombatEnv<'a> {
    pub fn new(
        rng: &'a mut dyn RandomSource,
        effectiveness: &'a dyn EffectivenessOracle,
        events: &'a dyn EventSink,
    ) -> Self {
        Self {
            rng,
            effectiveness,
            events,
        }
    }

    /// Draw the next percentage roll in `[0, 100)`.
    pub fn roll_percent(&mut self) -> f64 {
        self.rng.percent()
    }

    /// Emit a combat event through the injected sink.
    pub fn emit(&self, event: CombatEvent) {
        self.events.emit(event);
    }
}
