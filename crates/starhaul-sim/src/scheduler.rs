//! Timer registry for delayed and repeating work inside the tick loop.
//!
//! Nothing waits on a thread. Timers are records polled once per tick via
//! `drain_due`; the engine dispatches the returned tasks in due order.
//! `cancel_all` on teardown guarantees nothing fires into a destroyed world.

use std::collections::BTreeMap;

use hecs::Entity;
use tracing::debug;

use starhaul_core::constants::MIN_TIMER_REPEAT_MS;
use starhaul_core::types::SlotKey;

/// Handle returned by `register`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work to do when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Apply one tick of beam damage for this shooter's slot.
    BeamTick { shooter: Entity, slot: SlotKey },
}

/// One firing returned by `drain_due`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Firing {
    pub id: TimerId,
    /// Scheduled time of this firing, not the drain time.
    pub due_at_ms: f64,
    pub task: TimerTask,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    due_at_ms: f64,
    repeat_ms: Option<f64>,
    task: TimerTask,
}

#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: BTreeMap<TimerId, Timer>,
    next_id: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` at `due_at_ms`, re-arming every `repeat_ms` if given.
    pub fn register(&mut self, due_at_ms: f64, repeat_ms: Option<f64>, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(
            id,
            Timer {
                due_at_ms,
                repeat_ms: repeat_ms.map(|r| r.max(MIN_TIMER_REPEAT_MS)),
                task,
            },
        );
        id
    }

    /// Remove a timer. Unknown ids are ignored.
    pub fn unregister(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    /// Collect every firing due at or before `now_ms`, ordered by due time.
    ///
    /// A repeating timer that fell several intervals behind fires once per
    /// missed interval, each carrying its own due time. One-shot timers are
    /// removed as they fire.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<Firing> {
        let mut fired = Vec::new();
        let mut finished = Vec::new();

        for (&id, timer) in self.timers.iter_mut() {
            while timer.due_at_ms <= now_ms {
                fired.push(Firing {
                    id,
                    due_at_ms: timer.due_at_ms,
                    task: timer.task,
                });
                match timer.repeat_ms {
                    Some(repeat) => timer.due_at_ms += repeat,
                    None => {
                        finished.push(id);
                        break;
                    }
                }
            }
        }
        for id in finished {
            self.timers.remove(&id);
        }

        fired.sort_by(|a, b| a.due_at_ms.total_cmp(&b.due_at_ms).then(a.id.cmp(&b.id)));
        fired
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        if count > 0 {
            debug!(count, "timers cancelled");
        }
        count
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
