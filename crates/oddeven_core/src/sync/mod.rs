//! # Synchronization Primitives for the Worker Pool
//!
//! No locks in the sort loop. Workers meet at two barriers per round:
//!
//! ```text
//! Worker i:   even phase ─┐                 ┌─ odd phase ─┐
//!                         ▼                 │             ▼
//!               barrier 1 (count down) ─────┘   barrier 2 (count down)
//!                                                         │
//!             converged? ── yes ──▶ exit                  │
//!                 │ no                                    │
//!                 ▼                                       │
//!        rearm barrier 1 + barrier 2 (count up) ◀─────────┘
//! ```

mod barrier;
mod gate;
mod termination;

pub use barrier::{BlockingBarrier, PhaseBarrier, SpinBarrier};
pub use gate::StartGate;
pub use termination::TerminationCounter;
