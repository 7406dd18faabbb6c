//! Timer queue
//!
//! Backs `sleep` on hosts that own their clock (the headless terminal).
//!
//! Design:
//! - Min-heap of entries sorted by deadline, ties broken by schedule order
//! - Each timer completes a oneshot channel when it fires
//! - Time is whatever the owner says it is; `tick(now)` fires what is due

use futures::channel::oneshot;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Unique identifier for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Timer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Timer is active and waiting
    Pending,
    /// Timer has fired
    Fired,
    /// Timer was cancelled
    Cancelled,
}

/// A one-shot timer
#[derive(Debug)]
struct Timer {
    deadline: u64,
    state: TimerState,
    /// Completed when the timer fires
    notify: Option<oneshot::Sender<()>>,
}

impl Timer {
    fn fire(&mut self) {
        if self.state == TimerState::Pending {
            self.state = TimerState::Fired;
            if let Some(tx) = self.notify.take() {
                // The sleeper may have been dropped (cancelled by an interrupt)
                let _ = tx.send(());
            }
        }
    }
}

/// Entry in the timer heap (for ordering)
#[derive(Debug, PartialEq, Eq)]
struct TimerEntry {
    deadline: u64,
    id: TimerId,
}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (smallest deadline first)
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Timer queue - manages all active timers
#[derive(Debug)]
pub struct TimerQueue {
    heap: BinaryHeap<TimerEntry>,
    timers: HashMap<TimerId, Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            timers: HashMap::new(),
            next_id: 1,
        }
    }

    /// Schedule a one-shot timer `delay_ms` after `now`.
    ///
    /// The receiver completes when the timer fires; it reports
    /// `Canceled` if the timer is cancelled instead.
    pub fn schedule(&mut self, delay_ms: u64, now: u64) -> (TimerId, oneshot::Receiver<()>) {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let (tx, rx) = oneshot::channel();
        let deadline = now.saturating_add(delay_ms);
        self.heap.push(TimerEntry { deadline, id });
        self.timers.insert(
            id,
            Timer {
                deadline,
                state: TimerState::Pending,
                notify: Some(tx),
            },
        );

        (id, rx)
    }

    /// Cancel a timer.
    /// Returns false if the timer doesn't exist or already fired.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.get_mut(&id) {
            Some(timer) if timer.state == TimerState::Pending => {
                timer.state = TimerState::Cancelled;
                // Dropping the sender wakes the receiver with `Canceled`
                timer.notify = None;
                true
            }
            _ => false,
        }
    }

    /// Fire every timer whose deadline is at or before `now`.
    /// Returns the number of timers fired.
    pub fn tick(&mut self, now: u64) -> usize {
        let mut fired = 0;

        while let Some(entry) = self.heap.peek() {
            if entry.deadline > now {
                break;
            }
            let Some(entry) = self.heap.pop() else {
                break;
            };

            if let Some(timer) = self.timers.get_mut(&entry.id)
                && timer.state == TimerState::Pending
                && timer.deadline <= now
            {
                timer.fire();
                fired += 1;
            }
        }

        // Clean up fired/cancelled timers
        self.timers.retain(|_, t| t.state == TimerState::Pending);

        fired
    }

    /// Number of pending timers
    pub fn pending_count(&self) -> usize {
        self.timers
            .values()
            .filter(|t| t.state == TimerState::Pending)
            .count()
    }
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}
