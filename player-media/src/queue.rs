// player-media/src/queue.rs
//
// C1: bounded frame/packet queue (spec §4.1). A thread-safe FIFO with a
// high-water-mark wait and an explicit open/closed flag. Used for both
// packet queues (demuxer -> decoder) and frame queues (decoder -> presenter).
//
// The N/5 high-water mark (see spec GLOSSARY) keeps buffered data small
// relative to capacity so a seek or a stalled consumer doesn't leave
// producers far ahead — `push` blocks once the queue is more than a fifth
// full, not once it is completely full.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

/// Outcome of `push` once the queue has been closed.
#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted,
    Rejected,
}

struct Inner<T> {
    data: VecDeque<T>,
}

pub struct Queue<T> {
    inner:      Mutex<Inner<T>>,
    producer_cv: Condvar,
    capacity:   usize,
    running:    AtomicBool,
}

impl<T> Queue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner { data: VecDeque::new() }),
            producer_cv: Condvar::new(),
            capacity: capacity.max(1),
            running: AtomicBool::new(false),
        }
    }

    fn high_water_mark(&self) -> usize {
        self.capacity / 5
    }

    /// Flip the running flag on and wake any producer waiting to push.
    pub fn open(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.producer_cv.notify_all();
    }

    /// Flip the running flag off; every blocked/future `push` rejects and
    /// every `pop` on an empty queue keeps returning `None` (it already did).
    pub fn close(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.producer_cv.notify_all();
    }

    pub fn is_open(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Blocks while `size() > capacity/5` and the queue is open. Returns
    /// `Rejected` without inserting if the queue was (or became) closed.
    pub fn push(&self, x: T) -> PushOutcome {
        let mut guard = self.inner.lock();
        loop {
            if !self.is_open() {
                return PushOutcome::Rejected;
            }
            if guard.data.len() <= self.high_water_mark() {
                break;
            }
            self.producer_cv.wait(&mut guard);
        }
        if !self.is_open() {
            return PushOutcome::Rejected;
        }
        guard.data.push_back(x);
        PushOutcome::Accepted
    }

    /// Non-blocking pop of the front element, if any.
    pub fn pop(&self) -> Option<T> {
        let mut guard = self.inner.lock();
        let x = guard.data.pop_front();
        if x.is_some() {
            self.producer_cv.notify_one();
        }
        x
    }

    pub fn len(&self) -> usize {
        self.inner.lock().data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every buffered entry. Legal in any state; seeks rely on it.
    pub fn clear(&self) {
        let mut guard = self.inner.lock();
        guard.data.clear();
        self.producer_cv.notify_all();
    }
}

impl<T: Clone> Queue<T> {
    /// Non-mutating look at the front (oldest, next-to-be-consumed) element.
    pub fn peek(&self) -> Option<T> {
        self.inner.lock().data.front().cloned()
    }

    /// Non-mutating look at the back (newest) element.
    pub fn peek_latest(&self) -> Option<T> {
        self.inner.lock().data.back().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn closed_queue_rejects_push_and_pops_empty() {
        let q: Queue<i32> = Queue::new(20);
        q.open();
        q.close();
        assert_eq!(q.push(1), PushOutcome::Rejected);
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn push_then_pop_preserves_order() {
        let q: Queue<i32> = Queue::new(20);
        q.open();
        for i in 0..3 {
            assert_eq!(q.push(i), PushOutcome::Accepted);
        }
        assert_eq!(q.pop(), Some(0));
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn peek_and_peek_latest_do_not_mutate() {
        let q: Queue<i32> = Queue::new(20);
        q.open();
        q.push(1);
        q.push(2);
        q.push(3);
        assert_eq!(q.peek(), Some(1));
        assert_eq!(q.peek_latest(), Some(3));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn clear_is_legal_in_any_state() {
        let q: Queue<i32> = Queue::new(20);
        q.push(1); // queue not open yet — push blocks, but clear works regardless
        // (push above would block forever on a closed queue with data under HWM;
        // here the queue has never been opened so `is_open` is false and push
        // rejects immediately without inserting)
        q.clear();
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn push_blocks_above_high_water_mark_until_drained() {
        // capacity 10 -> high water mark 2. The check is against the size
        // *before* insertion, so pushes 0 and 1 proceed immediately (size
        // 0 and 1, both <= 2) and the push that brings size from 2 to 3
        // also proceeds (size check sees 2 <= 2). Only the next push, whose
        // pre-insert size is 3 (> 2), actually blocks.
        let q: Arc<Queue<i32>> = Arc::new(Queue::new(10));
        q.open();
        for i in 0..3 {
            assert_eq!(q.push(i), PushOutcome::Accepted);
        }
        assert_eq!(q.len(), 3);
        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.push(99));
        thread::sleep(Duration::from_millis(50));
        assert!(!handle.is_finished());
        assert_eq!(q.pop(), Some(0)); // drain below the mark, wakes producer
        let outcome = handle.join().unwrap();
        assert_eq!(outcome, PushOutcome::Accepted);
    }

    #[test]
    fn close_wakes_blocked_producer_with_rejection() {
        let q: Arc<Queue<i32>> = Arc::new(Queue::new(10));
        q.open();
        for i in 0..3 {
            q.push(i);
        }
        let q2 = Arc::clone(&q);
        let handle = thread::spawn(move || q2.push(42));
        thread::sleep(Duration::from_millis(50));
        q.close();
        assert_eq!(handle.join().unwrap(), PushOutcome::Rejected);
    }
}
