//! Retirement Ring Buffer (RRB) — per-core FIFO of the most recently retired
//! operations, in program order.
//!
//! Structurally grounded on this codebase's reorder buffer
//! (`core/pipeline/rob.rs`: a `Vec`-backed circular buffer with `head`/
//! `tail`/`count`); the admission/eviction policy is grounded on the
//! original's `fill_buffer.c`, renamed here from "fill buffer" to
//! "retirement ring buffer".

use tracing::trace;

use crate::common::Op;

/// Fixed-capacity FIFO of retired ops, owned copies only — the RRB never
/// aliases pipeline-owned storage.
#[derive(Debug)]
pub struct RetirementRingBuffer {
    entries: Vec<Op>,
    capacity: usize,
    head: usize,
    tail: usize,
    count: usize,
    /// Diagnostic label for this core's buffer.
    name: String,
}

/// Outcome of [`RetirementRingBuffer::push`]: whether an entry was evicted to
/// make room. An H2P op evicted from the RRB must reach the on/off-path
/// recorder before `head` advances — the caller inspects the returned
/// evicted entry synchronously, so no partially-evicted state is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The push was dropped because the buffer is frozen (BWE is walking).
    DroppedFrozen,
    /// The op was appended with no eviction.
    Appended,
    /// The op was appended after evicting the entry at `head`.
    AppendedAfterEviction,
}

impl RetirementRingBuffer {
    /// Creates a new, empty RRB of the given capacity and diagnostic name.
    #[must_use]
    pub fn new(capacity: usize, name: impl Into<String>) -> Self {
        let capacity = capacity.max(1);
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, Op::placeholder);
        Self {
            entries,
            capacity,
            head: 0,
            tail: 0,
            count: 0,
            name: name.into(),
        }
    }

    /// Diagnostic label for this buffer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacity of the ring.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently stored.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the buffer holds no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Clears all entries and resets indices.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    /// Pushes `op`, evicting the head entry first if the buffer is full.
    ///
    /// If `frozen` is true (the Backward-Walk Engine is `Walking`), the push
    /// is dropped entirely and `(PushOutcome::DroppedFrozen, None, [])` is
    /// returned.
    ///
    /// On eviction, the returned `Vec<Op>` is the buffer's remaining
    /// contents (oldest-first, evicted entry already excluded) captured
    /// *before* `head` advances and *before* `op` is stored — the on/off-path
    /// recorder walks exactly this pre-eviction state, not whatever the
    /// buffer looks like once `op` has already landed in it.
    pub fn push(&mut self, op: Op, frozen: bool) -> (PushOutcome, Option<Op>, Vec<Op>) {
        if frozen {
            trace!(op_num = op.op_num, "RRB push dropped: engine is walking");
            return (PushOutcome::DroppedFrozen, None, Vec::new());
        }

        let (outcome, evicted, remaining) = if self.count == self.capacity {
            let evicted = self.entries[self.head].clone();
            let remaining: Vec<Op> = (1..self.count)
                .map(|i| self.entries[(self.head + i) % self.capacity].clone())
                .collect();
            self.head = (self.head + 1) % self.capacity;
            self.count -= 1;
            (PushOutcome::AppendedAfterEviction, Some(evicted), remaining)
        } else {
            (PushOutcome::Appended, None, Vec::new())
        };

        self.entries[self.tail] = op;
        self.tail = (self.tail + 1) % self.capacity;
        self.count += 1;
        (outcome, evicted, remaining)
    }

    /// Returns a snapshot of the buffer's contents, oldest-first, suitable
    /// for the Backward-Walk Engine to clone when it arms.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Op> {
        self.iter().cloned().collect()
    }

    /// Iterates entries oldest-first without cloning.
    pub fn iter(&self) -> impl Iterator<Item = &Op> {
        let head = self.head;
        let count = self.count;
        let capacity = self.capacity;
        (0..count).map(move |i| &self.entries[(head + i) % capacity])
    }
}
