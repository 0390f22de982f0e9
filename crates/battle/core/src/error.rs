//! Execution errors.
//!
//! Almost everything in this crate is a total function over well-typed
//! state: unknown catalog kinds degrade to logged no-ops and numeric edge
//! cases clamp. The only hard error is a structurally invalid invocation.

use thiserror::Error;

/// Errors surfaced by skill execution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecuteError {
    /// The caller must supply an already-resolved, non-empty target list.
    #[error("skill execution requires at least one target")]
    NoTargets,
}
