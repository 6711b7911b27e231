use crate::operation::OperationDescriptor;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, trace};

/// Lifecycle of an [`OperationQueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueState {
    /// Empty, nothing queued since the last flush
    #[default]
    Clean,
    /// Holds operations that have not been handed to a round yet
    Pending,
    /// Holds operations that were already handed to a round and not flushed
    Submitted,
}

/// Ordered accumulator of operations for the next round.
///
/// Insertion order is the order results come back in. All mutation goes
/// through `&mut self`, so a queue cannot change while a [`Batch`] taken from
/// it is being dispatched.
#[derive(Debug, Default)]
pub struct OperationQueue {
    operations: Vec<OperationDescriptor>,
    state: QueueState,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation and mark the queue dirty
    pub fn enqueue(&mut self, descriptor: OperationDescriptor) {
        trace!(operation = %descriptor, position = self.operations.len(), "Queued operation");
        self.operations.push(descriptor);
        // Operations already sent stay in the queue until flushed, so the
        // next round would resend them: keep the Submitted marker.
        if self.state == QueueState::Clean {
            self.state = QueueState::Pending;
        }
    }

    pub fn extend<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = OperationDescriptor>,
    {
        for descriptor in descriptors {
            self.enqueue(descriptor);
        }
    }

    /// Read the current contents without changing the lifecycle
    pub fn snapshot(&self) -> Batch {
        Batch {
            operations: self.operations.iter().cloned().collect(),
            stale: self.state == QueueState::Submitted,
        }
    }

    /// Take a snapshot for a round and remember that these contents went out.
    ///
    /// A later `begin_round` without an intervening [`flush`](Self::flush)
    /// yields a batch flagged as stale.
    pub fn begin_round(&mut self) -> Batch {
        let batch = self.snapshot();
        if self.state == QueueState::Pending {
            self.state = QueueState::Submitted;
        }
        batch
    }

    /// Clear all operations. Flushing a clean queue is a no-op.
    pub fn flush(&mut self) {
        if self.state != QueueState::Clean {
            debug!(dropped = self.operations.len(), "Flushing operation queue");
        }
        self.operations.clear();
        self.state = QueueState::Clean;
    }

    pub fn is_dirty(&self) -> bool {
        self.state != QueueState::Clean
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OperationDescriptor> {
        self.operations.iter()
    }
}

/// Immutable, cheaply clonable view of a queue's operations for one round
#[derive(Debug, Clone, Default)]
pub struct Batch {
    operations: Arc<[OperationDescriptor]>,
    stale: bool,
}

impl Batch {
    pub fn new(operations: Vec<OperationDescriptor>) -> Self {
        Self {
            operations: operations.into(),
            stale: false,
        }
    }

    /// True when the source queue had already been submitted without a flush
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }
}

impl Deref for Batch {
    type Target = [OperationDescriptor];

    fn deref(&self) -> &Self::Target {
        &self.operations
    }
}

impl From<Vec<OperationDescriptor>> for Batch {
    fn from(operations: Vec<OperationDescriptor>) -> Self {
        Batch::new(operations)
    }
}
