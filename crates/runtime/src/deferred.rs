use crate::frame::Frame;

#[derive(Debug)]
struct Entry<T> {
    seq: u64,
    due_ms: f64,
    task: T,
}

/// Fire-and-forget continuations for a single-threaded event loop.
///
/// Tasks are never run inline: they become due on a later animation frame
/// (`schedule_next_frame`) or once the frame clock reaches a deadline
/// (`schedule_after`). Draining yields due tasks ordered by
/// `(due_ms, insertion order)`.
#[derive(Debug)]
pub struct DeferredQueue<T> {
    next_seq: u64,
    now_ms: f64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            now_ms: 0.0,
            entries: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs `task` on the next drained frame.
    pub fn schedule_next_frame(&mut self, task: T) {
        self.push(self.now_ms, task)
    }

    /// Runs `task` on the first frame at or after `now + delay_ms`.
    pub fn schedule_after(&mut self, delay_ms: f64, task: T) {
        self.push(self.now_ms + delay_ms.max(0.0), task)
    }

    /// Drops pending tasks matching `pred`; returns how many were dropped.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.task));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Advances the clock to `frame` and removes every due task.
    ///
    /// Tasks scheduled while the caller processes the result land on a later
    /// frame.
    pub fn drain_due(&mut self, frame: Frame) -> Vec<T> {
        self.now_ms = self.now_ms.max(frame.now_ms());
        let now = self.now_ms;

        let mut due: Vec<Entry<T>> = Vec::new();
        let mut keep: Vec<Entry<T>> = Vec::with_capacity(self.entries.len());
        for e in self.entries.drain(..) {
            if e.due_ms <= now {
                due.push(e);
            } else {
                keep.push(e);
            }
        }
        self.entries = keep;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then_with(|| a.seq.cmp(&b.seq)));
        due.into_iter().map(|e| e.task).collect()
    }

    fn push(&mut self, due_ms: f64, task: T) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.entries.push(Entry { seq, due_ms, task });
    }
}
