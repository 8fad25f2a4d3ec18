use std::time::{
    Duration,
    Instant,
};

/// Queue of timed one-shot effects. Every entry carries a scope so that
/// navigating away from a screen can drop the transitions scheduled for it,
/// instead of letting a stale callback mutate a since-hidden panel.
#[derive(Debug)]
pub struct TimerQueue<S, E> {
    entries: Vec<Entry<S, E>>,
}

#[derive(Debug)]
struct Entry<S, E> {
    scope: S,
    deadline: Instant,
    effect: E,
}

impl<S: PartialEq + Copy, E> TimerQueue<S, E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn schedule(&mut self, scope: S, delay: Duration, effect: E) {
        self.schedule_at(scope, Instant::now() + delay, effect);
    }

    pub fn schedule_at(&mut self, scope: S, deadline: Instant, effect: E) {
        self.entries.push(Entry {
            scope,
            deadline,
            effect,
        });
    }

    /// Drops every pending entry belonging to `scope`.
    pub fn cancel_scope(&mut self, scope: S) {
        self.entries.retain(|entry| entry.scope != scope);
    }

    /// Earliest pending deadline, if any. The event loop sleeps until this.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// Removes and returns every effect due at `now`, in deadline order.
    pub fn pop_due(&mut self, now: Instant) -> Vec<E> {
        let mut due: Vec<Entry<S, E>> = Vec::new();
        let mut remaining: Vec<Entry<S, E>> = Vec::new();
        for entry in self.entries.drain(..) {
            if entry.deadline <= now {
                due.push(entry);
            } else {
                remaining.push(entry);
            }
        }
        self.entries = remaining;
        due.sort_by_key(|entry| entry.deadline);
        due.into_iter().map(|entry| entry.effect).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<S: PartialEq + Copy, E> Default for TimerQueue<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pop_due__returns_only_elapsed_entries_in_deadline_order() {
        // given
        let base = Instant::now();
        let mut queue: TimerQueue<u8, &str> = TimerQueue::new();
        queue.schedule_at(0, base + Duration::from_millis(300), "late");
        queue.schedule_at(0, base + Duration::from_millis(100), "first");
        queue.schedule_at(0, base + Duration::from_millis(200), "second");

        // when
        let due = queue.pop_due(base + Duration::from_millis(250));

        // then
        assert_eq!(due, vec!["first", "second"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.next_deadline(),
            Some(base + Duration::from_millis(300))
        );
    }

    #[test]
    fn cancel_scope__drops_entries_for_that_scope_only() {
        // given
        let base = Instant::now();
        let mut queue: TimerQueue<u8, &str> = TimerQueue::new();
        queue.schedule_at(1, base, "keep");
        queue.schedule_at(2, base, "drop");
        queue.schedule_at(2, base + Duration::from_secs(1), "drop too");

        // when
        queue.cancel_scope(2);

        // then
        assert_eq!(queue.pop_due(base + Duration::from_secs(2)), vec!["keep"]);
    }

    #[test]
    fn next_deadline__is_none_when_empty() {
        let queue: TimerQueue<u8, ()> = TimerQueue::new();
        assert_eq!(queue.next_deadline(), None);
    }

    proptest! {
        #[test]
        fn pop_due__yields_nondecreasing_deadlines(offsets in prop::collection::vec(0u64..5_000, 1..32)) {
            let base = Instant::now();
            let mut queue: TimerQueue<u8, u64> = TimerQueue::new();
            for &offset in &offsets {
                queue.schedule_at(0, base + Duration::from_millis(offset), offset);
            }

            let due = queue.pop_due(base + Duration::from_millis(5_000));

            prop_assert_eq!(due.len(), offsets.len());
            for pair in due.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
