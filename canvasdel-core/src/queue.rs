// canvasdel-core/src/queue.rs
use crate::notifier::Notifier;
use crate::store::CanvasStore;
use crate::tree::WidgetTree;
use crate::workflow::{DeleteCommand, DeletionWorkflow, WorkflowState};
use crossbeam::channel::{Receiver, Sender, bounded, unbounded};
use std::thread::{self, JoinHandle};

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("failed to start deletion worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("deletion worker is no longer running")]
    Closed,
    #[error("deletion worker panicked")]
    WorkerPanicked,
}

enum Job {
    Run {
        command: DeleteCommand,
        reply: Sender<WorkflowState>,
    },
    Snapshot(Sender<WidgetTree>),
    Shutdown,
}

/// Single writer for the canvas tree.
///
/// One worker thread owns the store and runs commands strictly one after
/// another, so a workflow never observes another one half way through.
pub struct DeletionQueue<S: CanvasStore + 'static> {
    jobs: Sender<Job>,
    worker: Option<JoinHandle<S>>,
}

impl<S: CanvasStore + 'static> DeletionQueue<S> {
    pub fn spawn<N: Notifier + 'static>(store: S, notifier: N) -> Result<Self, QueueError> {
        let (jobs, inbox) = unbounded();
        let worker = thread::Builder::new()
            .name("canvasdel-worker".to_string())
            .spawn(move || drain(store, notifier, inbox))?;

        Ok(Self {
            jobs,
            worker: Some(worker),
        })
    }

    /// Queue a command; the receiver yields its terminal state
    pub fn submit(&self, command: DeleteCommand) -> Result<Receiver<WorkflowState>, QueueError> {
        let (reply, outcome) = bounded(1);
        self.jobs
            .send(Job::Run { command, reply })
            .map_err(|_| QueueError::Closed)?;
        Ok(outcome)
    }

    /// Queue a command and wait for it to finish
    pub fn run(&self, command: DeleteCommand) -> Result<WorkflowState, QueueError> {
        self.submit(command)?
            .recv()
            .map_err(|_| QueueError::Closed)
    }

    /// Copy of the tree as of every command queued before this call
    pub fn snapshot(&self) -> Result<WidgetTree, QueueError> {
        let (reply, tree) = bounded(1);
        self.jobs
            .send(Job::Snapshot(reply))
            .map_err(|_| QueueError::Closed)?;
        tree.recv().map_err(|_| QueueError::Closed)
    }

    /// Finish queued commands, stop the worker and hand the store back
    pub fn shutdown(mut self) -> Result<S, QueueError> {
        let worker = self.worker.take().ok_or(QueueError::Closed)?;
        // A worker that already exited is reported by join below
        let _ = self.jobs.send(Job::Shutdown);
        worker.join().map_err(|_| QueueError::WorkerPanicked)
    }
}

impl<S: CanvasStore + 'static> Drop for DeletionQueue<S> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = self.jobs.send(Job::Shutdown);
            if worker.join().is_err() {
                tracing::error!("deletion worker panicked");
            }
        }
    }
}

fn drain<S: CanvasStore, N: Notifier>(mut store: S, notifier: N, inbox: Receiver<Job>) -> S {
    tracing::debug!("deletion worker started");
    for job in inbox.iter() {
        match job {
            Job::Run { command, reply } => {
                let state = DeletionWorkflow::new(&mut store, &notifier).run(command);
                // The submitter may have stopped waiting
                let _ = reply.send(state);
            }
            Job::Snapshot(reply) => {
                let _ = reply.send(store.widgets().clone());
            }
            Job::Shutdown => break,
        }
    }
    tracing::debug!("deletion worker stopped");
    store
}
