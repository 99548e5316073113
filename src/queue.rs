use std::collections::VecDeque;

/// FIFO backlog of pending requests.
///
/// Entries are appended at the back and taken from the front. Handlers may
/// prune entries that have not been issued yet with [`WorkQueue::remove_matching`];
/// the queue never deduplicates on its own.
#[derive(Debug)]
pub struct WorkQueue<T> {
    entries: VecDeque<T>,
}

impl<T> WorkQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        WorkQueue {
            entries: VecDeque::new(),
        }
    }

    /// Append an entry to the back of the queue
    pub fn enqueue(&mut self, entry: T) {
        self.entries.push_back(entry);
    }

    /// Remove and return the front entry, or `None` when the queue is empty
    pub fn pop_next(&mut self) -> Option<T> {
        self.entries.pop_front()
    }

    /// Remove every queued entry matching `predicate`.
    ///
    /// Returns how many entries were removed. The remaining entries keep
    /// their relative order.
    pub fn remove_matching<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(entry));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the queued entries front to back
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
