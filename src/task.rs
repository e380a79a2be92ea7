//! Background I/O plumbing. Jobs run on the rayon pool; their results come back
//! over a channel and are only applied when the UI thread polls for them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub type TaskId = u64;

/// A set of in-flight jobs producing `T`.
///
/// Cancelling a job does not interrupt it; its result is dropped instead of
/// being delivered.
pub struct TaskSet<T> {
    sender: Sender<(TaskId, T)>,
    receiver: Receiver<(TaskId, T)>,
    pending: HashMap<TaskId, CancelToken>,
    next_id: TaskId,
}

impl<T: Send + 'static> TaskSet<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            pending: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn spawn<F>(&mut self, job: F) -> TaskId
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;

        let token = CancelToken::default();
        self.pending.insert(id, token.clone());

        let sender = self.sender.clone();
        rayon::spawn(move || {
            let output = job();
            if token.is_cancelled() {
                log::debug!("Discarding result of cancelled task {id}");
                return;
            }
            // The receiver is gone once the owning view is torn down.
            let _ = sender.send((id, output));
        });
        id
    }

    /// Returns the next finished, non-cancelled result without blocking.
    pub fn try_next(&mut self) -> Option<(TaskId, T)> {
        loop {
            match self.receiver.try_recv() {
                Ok((id, output)) => match self.pending.remove(&id) {
                    Some(token) if !token.is_cancelled() => return Some((id, output)),
                    _ => continue,
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    pub fn cancel(&mut self, id: TaskId) {
        if let Some(token) = self.pending.remove(&id) {
            token.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, token) in self.pending.drain() {
            token.cancel();
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Blocks until a result arrives or `timeout` passes.
    #[cfg(test)]
    pub fn wait_next(&mut self, timeout: std::time::Duration) -> Option<(TaskId, T)> {
        let deadline = std::time::Instant::now() + timeout;
        while std::time::Instant::now() < deadline {
            if let Some(done) = self.try_next() {
                return Some(done);
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        None
    }
}
