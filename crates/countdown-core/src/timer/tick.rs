//! Generation-counted schedule slots.
//!
//! A slot hands out a token each time it is armed. Disarming (or re-arming)
//! bumps the generation, so a callback still holding an older token finds
//! it stale and does nothing. The engine uses one slot for its periodic
//! tick and the alarm uses another for its auto-dismiss timeout.

use serde::{Deserialize, Serialize};

/// Proof that a scheduled callback belongs to the current arming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleToken {
    generation: u64,
}

impl ScheduleToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// An exclusively owned, arm/disarm-paired schedule handle.
#[derive(Debug, Default)]
pub struct ScheduleSlot {
    generation: u64,
    armed: bool,
}

impl ScheduleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot and return the token callbacks must present.
    ///
    /// Arming an armed slot invalidates the previous token first.
    pub fn arm(&mut self) -> ScheduleToken {
        self.generation = self.generation.wrapping_add(1);
        self.armed = true;
        ScheduleToken {
            generation: self.generation,
        }
    }

    /// Disarm the slot. Returns `false` if it was not armed.
    pub fn disarm(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.generation = self.generation.wrapping_add(1);
        self.armed = false;
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The token of the current arming, if any.
    pub fn token(&self) -> Option<ScheduleToken> {
        self.armed.then_some(ScheduleToken {
            generation: self.generation,
        })
    }

    pub fn is_current(&self, token: ScheduleToken) -> bool {
        self.armed && token.generation == self.generation
    }
}
