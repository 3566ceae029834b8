use std::sync::{Mutex, PoisonError};

use crate::http::connection::ConnectionSettings;
use crate::log::Logger;
use crate::server::worker::{Assignment, WorkerHandle, WorkerState};

/// Fixed-size set of workers with round-robin assignment.
///
/// The next-worker index is the only state shared between threads; it lives
/// behind a mutex and is advanced once per assignment, so assignment order
/// is linearizable even under concurrent accepts.
pub struct Pool {
    workers: Vec<WorkerHandle>,
    next_index: Mutex<usize>,
    logger: Logger,
}

impl Pool {
    /// Starts `size` worker threads.
    pub fn new(size: usize, settings: ConnectionSettings, logger: Logger) -> anyhow::Result<Self> {
        if size == 0 {
            anyhow::bail!("pool needs at least one worker");
        }

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let worker_logger = logger.scoped(format!("{}:Worker({})", logger.component(), id));
            workers.push(WorkerHandle::spawn(id, settings, worker_logger)?);
        }

        logger.info(format!("Started {} workers", size));

        Ok(Self {
            workers,
            next_index: Mutex::new(0),
            logger,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn workers(&self) -> &[WorkerHandle] {
        &self.workers
    }

    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.workers.iter().map(WorkerHandle::state).collect()
    }

    /// Returns the current index and advances it, wrapping at pool size.
    pub fn next_worker_index(&self) -> usize {
        let mut next = self
            .next_index
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let index = *next;
        *next = (index + 1) % self.workers.len();
        index
    }

    /// Hands the connection to the next worker in turn and returns its index.
    pub(crate) fn assign(&self, assignment: Assignment) -> usize {
        let index = self.next_worker_index();
        self.logger.verbose(format!(
            "Assigning connection from {} to worker {}",
            assignment.peer, index
        ));
        self.workers[index].new_connection(assignment);
        index
    }

    /// Stops accepting work and joins every worker thread.
    ///
    /// Blocking: each join waits for the worker's current connection to end.
    pub fn shutdown(self) {
        self.logger.info("Shutting down worker pool");
        for worker in self.workers {
            worker.join();
        }
    }
}
