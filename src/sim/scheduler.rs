//! Delayed pop scheduling for chain reactions and explosions
//!
//! A min-heap of timed pops keyed by fire time. Nothing blocks: the frame
//! driver calls `fire_due` with the current clock and every due entry is
//! re-validated against the live bubble set before it acts. A bubble that
//! died in the meantime turns its pending pop into a no-op.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use super::bubble::{Bubble, BubbleId, PopCause};

/// Handle for cancelling one scheduled pop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PopTicket(u64);

/// A pop waiting for its fire time
#[derive(Debug, Clone, Copy)]
pub struct ScheduledPop {
    pub target: BubbleId,
    pub cause: PopCause,
    pub fire_at_ms: f64,
    seq: u64,
}

impl PartialEq for ScheduledPop {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledPop {}

impl PartialOrd for ScheduledPop {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledPop {
    // Reversed so the BinaryHeap yields the earliest pop first, FIFO on ties
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at_ms
            .total_cmp(&self.fire_at_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Timer queue of pending pops
#[derive(Debug, Clone, Default)]
pub struct PopScheduler {
    queue: BinaryHeap<ScheduledPop>,
    cancelled: HashSet<u64>,
    next_seq: u64,
}

impl PopScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `target` to pop at `fire_at_ms`
    pub fn schedule(&mut self, target: BubbleId, cause: PopCause, fire_at_ms: f64) -> PopTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledPop {
            target,
            cause,
            fire_at_ms,
            seq,
        });
        PopTicket(seq)
    }

    /// Cancel a pending pop. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, ticket: PopTicket) -> bool {
        let pending = self.queue.iter().any(|p| p.seq == ticket.0);
        pending && self.cancelled.insert(ticket.0)
    }

    /// Number of pops still waiting (cancelled ones excluded)
    pub fn pending(&self) -> usize {
        self.queue.len() - self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Pending pops ordered by fire time
    pub fn pending_pops(&self) -> Vec<ScheduledPop> {
        let mut pops: Vec<ScheduledPop> = self
            .queue
            .iter()
            .filter(|p| !self.cancelled.contains(&p.seq))
            .copied()
            .collect();
        pops.sort_by(|a, b| b.cmp(a));
        pops
    }

    /// Drop everything (stage reset)
    pub fn clear(&mut self) {
        self.queue.clear();
        self.cancelled.clear();
    }

    /// Fire every pop due at `now_ms`.
    ///
    /// Returns the ids that actually transitioned to not-alive, in fire order.
    pub fn fire_due(&mut self, now_ms: f64, bubbles: &mut [Bubble]) -> Vec<(BubbleId, PopCause)> {
        let mut popped = Vec::new();
        while let Some(next) = self.queue.peek() {
            if next.fire_at_ms > now_ms {
                break;
            }
            let Some(due) = self.queue.pop() else {
                break;
            };
            if self.cancelled.remove(&due.seq) {
                continue;
            }
            let fired = bubbles
                .iter_mut()
                .find(|b| b.id == due.target)
                .is_some_and(|b| b.terminate(due.cause));
            if fired {
                log::trace!("Scheduled {:?} pop of #{}", due.cause, due.target);
                popped.push((due.target, due.cause));
            } else {
                log::trace!("Scheduled pop of #{} found it already gone", due.target);
            }
        }
        popped
    }
}
