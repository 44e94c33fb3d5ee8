//! Delayed actions, run at the start of the tick they fall due.

use tankfire_core::types::TankId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    Respawn(TankId),
}

impl ScheduledAction {
    pub fn tank(&self) -> TankId {
        match self {
            ScheduledAction::Respawn(tank) => *tank,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<(u64, ScheduledAction)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_tick: u64, action: ScheduledAction) {
        self.pending.push((due_tick, action));
    }

    /// Remove and return every action due at or before `tick`, in scheduling order.
    pub fn take_due(&mut self, tick: u64) -> Vec<ScheduledAction> {
        let mut due = Vec::new();
        self.pending.retain(|(at, action)| {
            if *at <= tick {
                due.push(*action);
                false
            } else {
                true
            }
        });
        due
    }

    /// Drop anything pending for `tank`.
    pub fn cancel_for(&mut self, tank: TankId) {
        self.pending.retain(|(_, action)| action.tank() != tank);
    }

    pub fn is_pending(&self, action: ScheduledAction) -> bool {
        self.pending.iter().any(|(_, a)| *a == action)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
