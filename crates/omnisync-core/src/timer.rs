//! Host-driven timers
//!
//! Timers never fire on their own. The host passes the current instant to
//! [`TimerQueue::expire`], which reports the timers that are due. This keeps
//! every callback on the host's thread and makes time explicit in tests.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Lower bound for repeating intervals
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Identifies a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Timer {
    /// `None` when the deadline lies beyond what `Instant` can represent
    deadline: Option<Instant>,
    repeat: Option<Duration>,
}

impl Timer {
    fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }
}

/// Set of one-shot and repeating timers
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers: BTreeMap<TimerHandle, Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay` after `now`.
    ///
    /// A delay too large to represent leaves the timer armed but never due.
    pub fn schedule_once(&mut self, now: Instant, delay: Duration) -> TimerHandle {
        self.insert(Timer {
            deadline: now.checked_add(delay),
            repeat: None,
        })
    }

    /// Fire every `interval`, starting one interval after `now`.
    pub fn schedule_repeating(&mut self, now: Instant, interval: Duration) -> TimerHandle {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(Timer {
            deadline: now.checked_add(interval),
            repeat: Some(interval),
        })
    }

    fn insert(&mut self, timer: Timer) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.insert(handle, timer);
        handle
    }

    /// Cancel a timer. Cancelling an unknown or already fired handle is a no-op.
    ///
    /// Returns whether a timer was removed.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().filter_map(|t| t.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Collect the timers due at `now`, earliest deadline first.
    ///
    /// One-shot timers are removed. A repeating timer fires once even if
    /// several intervals elapsed, then moves to its next future deadline.
    pub fn expire(&mut self, now: Instant) -> Vec<TimerHandle> {
        let mut due: Vec<(Instant, TimerHandle)> = self
            .timers
            .iter()
            .filter(|(_, t)| t.is_due(now))
            .filter_map(|(h, t)| t.deadline.map(|deadline| (deadline, *h)))
            .collect();
        due.sort();

        for (_, handle) in &due {
            let Some(timer) = self.timers.get_mut(handle) else {
                continue;
            };
            match timer.repeat {
                Some(interval) => {
                    while let Some(deadline) = timer.deadline
                        && deadline <= now
                    {
                        timer.deadline = deadline.checked_add(interval);
                    }
                }
                None => {
                    self.timers.remove(handle);
                }
            }
        }

        due.into_iter().map(|(_, handle)| handle).collect()
    }
}
