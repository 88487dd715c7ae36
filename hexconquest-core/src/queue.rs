//! Time-gated FIFO of resolved combat actions

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::state::{PlayerId, TerritoryId};

/// Minimal record of one attack, enough to replay it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatAction {
    pub attacker_id: TerritoryId,
    pub defender_id: TerritoryId,
    pub attacker_player: PlayerId,
    pub attacker_dice: u8,
    pub defender_dice: u8,
}

/// Action log entry: the attack plus the turn it happened on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedAction {
    pub turn: u32,
    pub action: CombatAction,
}

/// Paces combat actions for animation: at most one pop per `delay` seconds
#[derive(Clone, Debug, Default)]
pub struct CombatQueue {
    pending: VecDeque<CombatAction>,
    delay: f32,
    timer: f32,
    ready: bool,
}

impl CombatQueue {
    pub fn new(delay: f32) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn queue_action(&mut self, action: CombatAction) {
        self.pending.push_back(action);
        if self.pending.len() == 1 {
            self.arm();
        }
    }

    pub fn update(&mut self, dt: f32) {
        if self.pending.is_empty() {
            self.ready = false;
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.ready = true;
        }
    }

    /// Next action, only once the timer has run out
    pub fn pop_next_action(&mut self) -> Option<CombatAction> {
        if !self.ready {
            return None;
        }
        let action = self.pending.pop_front()?;
        if self.pending.is_empty() {
            self.ready = false;
        } else {
            self.arm();
        }
        Some(action)
    }

    fn arm(&mut self) {
        self.timer = self.delay;
        self.ready = self.delay <= 0.0;
    }

    pub fn has_pending_actions(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.ready && !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn processing_delay(&self) -> f32 {
        self.delay
    }

    pub fn set_processing_delay(&mut self, delay: f32) {
        self.delay = delay;
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.timer = 0.0;
        self.ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(id: TerritoryId) -> CombatAction {
        CombatAction {
            attacker_id: id,
            defender_id: id + 1,
            attacker_player: 0,
            attacker_dice: 3,
            defender_dice: 2,
        }
    }

    #[test]
    fn test_zero_delay_is_immediately_ready() {
        let mut queue = CombatQueue::new(0.0);
        queue.queue_action(action(0));
        queue.queue_action(action(1));
        assert_eq!(queue.pop_next_action(), Some(action(0)));
        assert_eq!(queue.pop_next_action(), Some(action(1)));
        assert_eq!(queue.pop_next_action(), None);
        assert!(!queue.has_pending_actions());
    }

    #[test]
    fn test_delay_gates_each_pop() {
        let mut queue = CombatQueue::new(0.5);
        queue.queue_action(action(0));
        queue.queue_action(action(1));
        assert_eq!(queue.pop_next_action(), None);

        queue.update(0.3);
        assert_eq!(queue.pop_next_action(), None);
        queue.update(0.3);
        assert_eq!(queue.pop_next_action(), Some(action(0)));

        // Timer re-armed for the second item
        assert_eq!(queue.pop_next_action(), None);
        queue.update(0.5);
        assert_eq!(queue.pop_next_action(), Some(action(1)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_update_on_empty_queue_does_not_prime() {
        let mut queue = CombatQueue::new(0.5);
        queue.update(10.0);
        assert!(!queue.is_ready());
        queue.queue_action(action(0));
        assert_eq!(queue.pop_next_action(), None);
    }

    #[test]
    fn test_clear() {
        let mut queue = CombatQueue::new(0.0);
        queue.queue_action(action(0));
        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.pop_next_action(), None);
    }
}
