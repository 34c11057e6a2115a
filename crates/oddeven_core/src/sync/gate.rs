//! # Start Gate
//!
//! Holds spawned workers until the coordinator has created all of them.
//! If a spawn fails, the gate is aborted and the waiting workers return
//! without ever touching a barrier sized for the full pool.

use parking_lot::{Condvar, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Closed,
    Open,
    Aborted,
}

/// One-shot open/abort signal.
#[derive(Debug)]
pub struct StartGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl Default for StartGate {
    fn default() -> Self {
        Self::new()
    }
}

impl StartGate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Closed),
            changed: Condvar::new(),
        }
    }

    /// Lets every waiter through.
    pub fn open(&self) {
        self.settle(GateState::Open);
    }

    /// Sends every waiter home.
    pub fn abort(&self) {
        self.settle(GateState::Aborted);
    }

    /// Blocks until the gate is opened or aborted. Returns true if opened.
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        while *state == GateState::Closed {
            self.changed.wait(&mut state);
        }
        *state == GateState::Open
    }

    fn settle(&self, outcome: GateState) {
        let mut state = self.state.lock();
        if *state == GateState::Closed {
            *state = outcome;
        }
        self.changed.notify_all();
    }
}
