//! Per-owner fire record: shell id allocation and duplicate-shot rejection.

use std::collections::HashMap;

use tracing::debug;

use tankfire_core::types::{ShellId, TankId};

#[derive(Debug, Default)]
pub struct FireLedger {
    last_fire: HashMap<TankId, u64>,
    min_interval: u64,
    next_shell: u64,
}

impl FireLedger {
    pub fn new(min_interval: u64) -> Self {
        Self {
            last_fire: HashMap::new(),
            min_interval,
            next_shell: 0,
        }
    }

    /// Record a shot by `owner` at `tick` and hand out its shell id.
    ///
    /// `None` if the same owner already fired within the dedup window.
    pub fn try_fire(&mut self, owner: TankId, tick: u64) -> Option<ShellId> {
        if let Some(&last) = self.last_fire.get(&owner) {
            if tick.saturating_sub(last) < self.min_interval {
                debug!(tank = %owner, tick, last, "duplicate fire rejected");
                return None;
            }
        }
        self.last_fire.insert(owner, tick);
        self.next_shell += 1;
        Some(ShellId(self.next_shell))
    }

    pub fn last_fire(&self, owner: TankId) -> Option<u64> {
        self.last_fire.get(&owner).copied()
    }

    pub fn forget(&mut self, owner: TankId) {
        self.last_fire.remove(&owner);
    }

    pub fn shells_issued(&self) -> u64 {
        self.next_shell
    }
}
